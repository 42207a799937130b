mod cli;
mod commands;
mod config;
mod output;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use config::Config;
use jira_backend::JiraClient;
use output::output_error;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let cli = Cli::parse();
    output::init_color(cli.color);
    init_logging(cli.verbose);

    if let Err(e) = run(&cli) {
        output_error(&e, cli.format);
        return ExitCode::from(1);
    }

    ExitCode::SUCCESS
}

/// Log to stderr. `RUST_LOG` wins over `-v`; the default is warnings only.
fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn run(cli: &Cli) -> Result<()> {
    if let Commands::Completions { shell } = &cli.command {
        Cli::generate_completions(*shell);
        return Ok(());
    }

    let mut config = Config::load(cli.config.clone())?;
    config.merge_with_cli(
        cli.url.clone(),
        cli.email.clone(),
        cli.token.clone(),
        cli.project.clone(),
        cli.page_size,
    );

    // Config commands work without credentials
    if let Commands::Config { action } = &cli.command {
        return commands::config::handle_config(&config, action, cli.format);
    }

    let connection = config.connection()?;
    let client = JiraClient::new(connection.url, connection.email, connection.token);
    tracing::debug!(url = client.base_url(), "connecting to Jira");

    match &cli.command {
        Commands::Issues { cursor } => commands::issues::handle_issues(
            &client,
            config.require_project()?,
            cursor,
            config.page_size,
            cli.format,
        ),
        Commands::Browse => commands::browse::handle_browse(
            &client,
            config.require_project()?,
            config.page_size,
            cli.format,
        ),
        Commands::Issue { action } => commands::issue::handle_issue(
            &client,
            config.project.as_deref(),
            client.base_url(),
            action,
            cli.format,
        ),
        Commands::Project { action } => commands::project::handle_project(
            &client,
            config.require_project()?,
            action,
            cli.format,
        ),
        Commands::Settings { action } => commands::settings::handle_settings(
            &client,
            config.require_project()?,
            action,
            cli.format,
        ),
        Commands::Invoke { operation, payload } => commands::invoke::handle_invoke(
            &client,
            config.project.as_deref(),
            operation,
            payload.as_deref(),
        ),
        Commands::Config { .. } | Commands::Completions { .. } => Ok(()),
    }
}
