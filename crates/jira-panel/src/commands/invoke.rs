use anyhow::{anyhow, Context, Result};
use panel_core::{IssueGateway, Resolver, OPERATIONS};
use serde_json::Value;

/// Dispatch a named operation the way the panel frontend does and print the
/// JSON response. The configured project fills in a missing `projectKey`.
pub fn handle_invoke(
    client: &dyn IssueGateway,
    project: Option<&str>,
    operation: &str,
    payload: Option<&str>,
) -> Result<()> {
    if !OPERATIONS.contains(&operation) {
        return Err(anyhow!(
            "Unknown operation: {} (expected one of: {})",
            operation,
            OPERATIONS.join(", ")
        ));
    }

    let mut payload: Value = match payload {
        Some(raw) => serde_json::from_str(raw).context("Payload is not valid JSON")?,
        None => Value::Object(Default::default()),
    };
    if let (Some(project), Value::Object(map)) = (project, &mut payload) {
        if !["projectKey", "projectId", "project"]
            .iter()
            .any(|key| map.contains_key(*key))
        {
            map.insert("projectKey".to_string(), Value::String(project.to_string()));
        }
    }

    let response = Resolver::new(client).invoke(operation, payload);
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}
