use serde::Deserialize;

/// Entity property stored on a project
#[derive(Debug, Clone, Deserialize)]
pub struct JiraProperty {
    pub key: String,
    #[serde(default)]
    pub value: serde_json::Value,
}
