use crate::cli::{ConfigCommands, OutputFormat};
use crate::config::{user_config_path, Config};
use anyhow::{anyhow, Result};
use colored::Colorize;

/// Config commands work offline and never need valid credentials
pub fn handle_config(config: &Config, action: &ConfigCommands, format: OutputFormat) -> Result<()> {
    match action {
        ConfigCommands::Show => {
            let shown = config.redacted();
            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&shown)?),
                OutputFormat::Text => {
                    let unset = || "(not set)".dimmed().to_string();
                    println!("{}: {}", "url".dimmed(), shown.url.unwrap_or_else(unset));
                    println!("{}: {}", "email".dimmed(), shown.email.unwrap_or_else(unset));
                    println!("{}: {}", "token".dimmed(), shown.token.unwrap_or_else(unset));
                    println!("{}: {}", "project".dimmed(), shown.project.unwrap_or_else(unset));
                    println!("{}: {}", "page_size".dimmed(), shown.page_size);
                }
            }
            Ok(())
        }
        ConfigCommands::Path => {
            let path = user_config_path()
                .ok_or_else(|| anyhow!("Could not determine the config directory"))?;
            println!("{}", path.display());
            Ok(())
        }
        ConfigCommands::Init { force } => {
            let path = user_config_path()
                .ok_or_else(|| anyhow!("Could not determine the config directory"))?;
            config.save(&path, *force)?;
            match format {
                OutputFormat::Json => {
                    let json = serde_json::json!({ "success": true, "path": path });
                    println!("{}", serde_json::to_string_pretty(&json)?);
                }
                OutputFormat::Text => println!("Wrote {}", path.display()),
            }
            Ok(())
        }
    }
}
