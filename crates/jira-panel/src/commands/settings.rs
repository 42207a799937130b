use crate::cli::{OutputFormat, SettingsCommands};
use anyhow::{Context, Result};
use colored::Colorize;
use panel_core::{is_page_visible, set_page_visible, IssueGateway};

pub fn handle_settings(
    client: &dyn IssueGateway,
    project: &str,
    action: &SettingsCommands,
    format: OutputFormat,
) -> Result<()> {
    let visible = match action {
        SettingsCommands::Show => is_page_visible(client, project)
            .with_context(|| format!("Failed to read settings of '{}'", project))?,
        SettingsCommands::ShowPage | SettingsCommands::HidePage => {
            let visible = matches!(action, SettingsCommands::ShowPage);
            set_page_visible(client, project, visible)
                .with_context(|| format!("Failed to save settings of '{}'", project))?;
            visible
        }
    };

    match format {
        OutputFormat::Json => {
            let json = serde_json::json!({ "project": project, "pageVisible": visible });
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
        OutputFormat::Text => {
            let state = if visible {
                "visible".green()
            } else {
                "hidden".yellow()
            };
            println!("Project page for {} is {}", project.cyan().bold(), state);
        }
    }
    Ok(())
}
