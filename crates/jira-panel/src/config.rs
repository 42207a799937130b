use anyhow::{anyhow, Context, Result};
use directories::{BaseDirs, ProjectDirs};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use panel_core::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const APP_DIR: &str = "jira-panel";
const LOCAL_FILE: &str = ".jira-panel.toml";
const ENV_PREFIX: &str = "JIRA_PANEL_";

/// Connection and panel settings, merged from files, environment and flags
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Jira site URL
    pub url: Option<String>,
    /// Account email for Basic auth
    pub email: Option<String>,
    /// API token for Basic auth
    pub token: Option<String>,
    /// Project key the panel is shown for
    pub project: Option<String>,
    /// Root issues per page
    pub page_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            url: None,
            email: None,
            token: None,
            project: None,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Validated connection settings
#[derive(Debug)]
pub struct Connection<'a> {
    pub url: &'a str,
    pub email: &'a str,
    pub token: &'a str,
}

impl Config {
    pub fn load(config_path: Option<PathBuf>) -> Result<Self> {
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));

        let explicit_path = config_path.as_deref();
        if let Some(path) = explicit_path {
            if !path.exists() {
                return Err(anyhow!("Config file not found: {}", path.display()));
            }
        }

        for path in config_paths(explicit_path) {
            if path.exists() {
                figment = figment.merge(Toml::file(path));
            }
        }

        figment = figment.merge(Env::prefixed(ENV_PREFIX).only(&[
            "url",
            "email",
            "token",
            "project",
            "page_size",
        ]));

        let config: Config = figment
            .extract()
            .map_err(|e| anyhow!("Failed to load config: {}", e))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the flags would not have accepted either
    fn validate(&self) -> Result<()> {
        if !(1..=MAX_PAGE_SIZE).contains(&self.page_size) {
            return Err(anyhow!(
                "Invalid page_size {}: must be between 1 and {}",
                self.page_size,
                MAX_PAGE_SIZE
            ));
        }
        Ok(())
    }

    pub fn merge_with_cli(
        &mut self,
        url: Option<String>,
        email: Option<String>,
        token: Option<String>,
        project: Option<String>,
        page_size: Option<u32>,
    ) {
        if url.is_some() {
            self.url = url;
        }
        if email.is_some() {
            self.email = email;
        }
        if token.is_some() {
            self.token = token;
        }
        if project.is_some() {
            self.project = project;
        }
        if let Some(size) = page_size {
            self.page_size = size as usize;
        }
    }

    /// Check that everything needed to talk to Jira is present
    pub fn connection(&self) -> Result<Connection<'_>> {
        let url = self.url.as_deref().ok_or_else(|| {
            anyhow!("Jira URL not configured. Set via --url, JIRA_PANEL_URL env var, or config file")
        })?;
        let email = self.email.as_deref().ok_or_else(|| {
            anyhow!(
                "Jira email not configured. Set via --email, JIRA_PANEL_EMAIL env var, or config file"
            )
        })?;
        let token = self.token.as_deref().ok_or_else(|| {
            anyhow!(
                "Jira token not configured. Set via --token, JIRA_PANEL_TOKEN env var, or config file"
            )
        })?;
        Ok(Connection { url, email, token })
    }

    pub fn require_project(&self) -> Result<&str> {
        self.project.as_deref().ok_or_else(|| {
            anyhow!(
                "Project not configured. Set via --project, JIRA_PANEL_PROJECT env var, or config file"
            )
        })
    }

    /// Copy safe to print: the token is masked
    pub fn redacted(&self) -> Config {
        Config {
            token: self.token.as_ref().map(|_| "********".to_string()),
            ..self.clone()
        }
    }

    /// Write the configuration as TOML, refusing to clobber an existing file
    /// unless `force` is set
    pub fn save(&self, path: &Path, force: bool) -> Result<()> {
        if path.exists() && !force {
            return Err(anyhow!(
                "Config file already exists: {} (use --force to overwrite)",
                path.display()
            ));
        }
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, contents)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }
}

/// Where `config init` writes and `config path` points
pub fn user_config_path() -> Option<PathBuf> {
    get_project_config_path().or_else(get_xdg_config_path)
}

fn config_paths(explicit: Option<&Path>) -> Vec<PathBuf> {
    let mut paths = Vec::new();

    if let Some(path) = explicit {
        paths.push(path.to_path_buf());
        return paths;
    }

    if let Some(path) = get_project_config_path() {
        push_unique(&mut paths, path);
    }
    if let Some(path) = get_xdg_config_path() {
        push_unique(&mut paths, path);
    }
    if let Some(path) = get_local_config_path() {
        push_unique(&mut paths, path);
    }

    paths
}

fn push_unique(paths: &mut Vec<PathBuf>, path: PathBuf) {
    if !paths.contains(&path) {
        paths.push(path);
    }
}

fn get_project_config_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", APP_DIR).map(|d| d.config_dir().join("config.toml"))
}

fn get_xdg_config_path() -> Option<PathBuf> {
    if let Some(dir) = std::env::var_os("XDG_CONFIG_HOME") {
        return Some(PathBuf::from(dir).join(APP_DIR).join("config.toml"));
    }

    BaseDirs::new().map(|dirs| {
        dirs.home_dir()
            .join(".config")
            .join(APP_DIR)
            .join("config.toml")
    })
}

fn get_local_config_path() -> Option<PathBuf> {
    std::env::current_dir().ok().map(|dir| dir.join(LOCAL_FILE))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn temp_file(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("jira-panel-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir.join(name)
    }

    #[test]
    #[serial]
    fn explicit_file_and_env_are_layered() {
        let path = temp_file("layered.toml");
        std::fs::write(
            &path,
            "url = \"https://file.atlassian.net\"\nemail = \"a@b.c\"\nproject = \"ABC\"\n",
        )
        .unwrap();
        std::env::set_var("JIRA_PANEL_PROJECT", "XYZ");

        let config = Config::load(Some(path)).unwrap();
        std::env::remove_var("JIRA_PANEL_PROJECT");

        assert_eq!(config.url.as_deref(), Some("https://file.atlassian.net"));
        assert_eq!(config.project.as_deref(), Some("XYZ"));
        assert_eq!(config.page_size, DEFAULT_PAGE_SIZE);
    }

    #[test]
    #[serial]
    fn page_size_out_of_range_is_rejected() {
        let path = temp_file("page-size.toml");
        std::fs::write(&path, "page_size = 1000\n").unwrap();

        let err = Config::load(Some(path.clone())).unwrap_err();
        assert_eq!(err.to_string(), "Invalid page_size 1000: must be between 1 and 100");

        std::env::set_var("JIRA_PANEL_PAGE_SIZE", "0");
        let result = Config::load(Some(path));
        std::env::remove_var("JIRA_PANEL_PAGE_SIZE");
        assert!(result.unwrap_err().to_string().contains("page_size 0"));
    }

    #[test]
    #[serial]
    fn page_size_from_env_is_used() {
        let path = temp_file("empty.toml");
        std::fs::write(&path, "").unwrap();
        std::env::set_var("JIRA_PANEL_PAGE_SIZE", "20");

        let config = Config::load(Some(path));
        std::env::remove_var("JIRA_PANEL_PAGE_SIZE");

        assert_eq!(config.unwrap().page_size, 20);
    }

    #[test]
    #[serial]
    fn missing_explicit_file_is_an_error() {
        let err = Config::load(Some(PathBuf::from("/nonexistent/jira-panel.toml"))).unwrap_err();
        assert!(err.to_string().contains("Config file not found"));
    }

    #[test]
    fn cli_flags_win() {
        let mut config = Config {
            url: Some("https://a".into()),
            ..Config::default()
        };
        config.merge_with_cli(Some("https://b".into()), None, None, Some("ABC".into()), Some(20));

        assert_eq!(config.url.as_deref(), Some("https://b"));
        assert_eq!(config.project.as_deref(), Some("ABC"));
        assert_eq!(config.page_size, 20);
    }

    #[test]
    fn connection_names_the_missing_key() {
        let config = Config {
            url: Some("https://a".into()),
            ..Config::default()
        };
        let err = config.connection().unwrap_err();
        assert!(err.to_string().starts_with("Jira email not configured"));

        let err = Config::default().connection().unwrap_err();
        assert!(err.to_string().starts_with("Jira URL not configured"));
    }

    #[test]
    fn redacted_masks_token() {
        let config = Config {
            token: Some("secret".into()),
            ..Config::default()
        };
        assert_eq!(config.redacted().token.as_deref(), Some("********"));
    }

    #[test]
    fn save_refuses_to_overwrite() {
        let path = temp_file("saved.toml");
        let _ = std::fs::remove_file(&path);
        let config = Config {
            project: Some("ABC".into()),
            ..Config::default()
        };

        config.save(&path, false).unwrap();
        assert!(config.save(&path, false).is_err());
        config.save(&path, true).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("project = \"ABC\""));
        assert!(written.contains("page_size = 5"));
    }
}
