use clap::{ArgAction, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "jira-panel",
    version,
    about = "Browse and manage a Jira project's issues as a paginated tree"
)]
pub struct Cli {
    /// Output format
    #[arg(long, short = 'o', value_enum, global = true, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// When to colorize output
    #[arg(long, value_enum, global = true, default_value_t = ColorChoice::Auto)]
    pub color: ColorChoice,

    /// Path to a TOML config file
    #[arg(long, env = "JIRA_PANEL_CONFIG", global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Jira site URL, e.g. https://example.atlassian.net (overrides config file)
    #[arg(long, global = true)]
    pub url: Option<String>,

    /// Account email used with the API token (overrides config file)
    #[arg(long, global = true)]
    pub email: Option<String>,

    /// API token (overrides config file)
    #[arg(long, global = true)]
    pub token: Option<String>,

    /// Project key, e.g. ABC (overrides config file)
    #[arg(long, short = 'p', global = true)]
    pub project: Option<String>,

    /// Root issues per page (overrides config file)
    #[arg(long, global = true, value_parser = clap::value_parser!(u32).range(1..=100))]
    pub page_size: Option<u32>,

    /// More log output on stderr (-v info, -vv debug)
    #[arg(long, short = 'v', action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(ValueEnum, Clone, Debug, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(ValueEnum, Clone, Debug, Copy, Default)]
pub enum ColorChoice {
    /// Colorize output if stdout is a terminal
    #[default]
    Auto,
    /// Always colorize output
    Always,
    /// Never colorize output
    Never,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show one page of the project's issue tree
    #[command(visible_alias = "ls")]
    Issues {
        /// Page cursor returned by a previous call (empty for the first page)
        #[arg(long, default_value = "")]
        cursor: String,
    },
    /// Interactive panel: page through, expand, and edit issues
    Browse,
    /// Issue operations
    #[command(visible_alias = "i")]
    Issue {
        #[command(subcommand)]
        action: IssueCommands,
    },
    /// Project metadata
    #[command(visible_alias = "p")]
    Project {
        #[command(subcommand)]
        action: ProjectCommands,
    },
    /// Project page visibility
    Settings {
        #[command(subcommand)]
        action: SettingsCommands,
    },
    /// Call a backend operation by name with a JSON payload
    Invoke {
        /// Operation name, e.g. getListIssues
        operation: String,

        /// JSON payload (defaults to {})
        payload: Option<String>,
    },
    /// Configuration file management
    #[command(visible_alias = "cfg")]
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum IssueCommands {
    /// Show a single issue
    #[command(visible_alias = "g")]
    Get {
        /// Issue key (e.g., ABC-7)
        key: String,
    },
    /// Create an issue in the project
    #[command(visible_alias = "c", visible_alias = "new")]
    Create {
        /// Issue summary
        #[arg(long, short = 's')]
        summary: String,

        /// Issue type ID (see `project issue-types`)
        #[arg(long = "type", short = 't')]
        issue_type: String,

        /// Issue description
        #[arg(long, short = 'd')]
        description: Option<String>,
    },
    /// Update an issue's fields and status
    #[command(visible_alias = "u")]
    Update {
        /// Issue key
        key: String,

        /// New summary
        #[arg(long, short = 's')]
        summary: Option<String>,

        /// New description
        #[arg(long, short = 'd')]
        description: Option<String>,

        /// New issue type ID
        #[arg(long = "type", short = 't')]
        issue_type: Option<String>,

        /// Target status ID, applied through the workflow
        #[arg(long)]
        status: Option<String>,

        /// Assignee account ID, or "none" to unassign
        #[arg(long, short = 'a')]
        assignee: Option<String>,
    },
    /// Delete an issue
    #[command(visible_alias = "rm")]
    Delete {
        /// Issue key
        key: String,
    },
    /// List the transitions available for an issue
    Transitions {
        /// Issue key
        key: String,
    },
    /// Move an issue to a status
    #[command(visible_alias = "mv")]
    Move {
        /// Issue key
        key: String,

        /// Target status ID
        status: String,
    },
    /// Open an issue in the browser
    Open {
        /// Issue key
        key: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum ProjectCommands {
    /// Issue types that can be created in the project
    IssueTypes,
    /// Statuses used in the project
    Statuses {
        /// Only statuses of this issue type
        #[arg(long = "type", short = 't')]
        issue_type: Option<String>,
    },
    /// Users that can be assigned issues
    Users {
        /// Only users assignable to this issue
        #[arg(long)]
        issue: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum SettingsCommands {
    /// Show whether the project page is visible
    Show,
    /// Make the project page visible
    ShowPage,
    /// Hide the project page
    HidePage,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show the effective configuration (token redacted)
    Show,
    /// Print the path of the user config file
    Path,
    /// Write a config file from the current flags and environment
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

impl Cli {
    /// Generate shell completions and write to stdout
    pub fn generate_completions(shell: Shell) {
        let mut cmd = Cli::command();
        clap_complete::generate(shell, &mut cmd, "jira-panel", &mut std::io::stdout());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn verbosity_counts() {
        let cli = Cli::try_parse_from(["jira-panel", "-vv", "issues"]).unwrap();
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli =
            Cli::try_parse_from(["jira-panel", "issues", "-p", "ABC", "--page-size", "10"]).unwrap();
        assert_eq!(cli.project.as_deref(), Some("ABC"));
        assert_eq!(cli.page_size, Some(10));
    }

    #[test]
    fn page_size_must_be_positive() {
        assert!(Cli::try_parse_from(["jira-panel", "--page-size", "0", "issues"]).is_err());
    }

    #[test]
    fn update_accepts_unassign() {
        let cli = Cli::try_parse_from([
            "jira-panel", "issue", "update", "ABC-7", "--assignee", "none",
        ])
        .unwrap();
        match cli.command {
            Commands::Issue {
                action: IssueCommands::Update { key, assignee, .. },
            } => {
                assert_eq!(key, "ABC-7");
                assert_eq!(assignee.as_deref(), Some("none"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
