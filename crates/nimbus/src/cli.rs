//! Command line definition.

use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use nimbus_api::LogDirection;

#[derive(Debug, Parser)]
#[command(
    name = "nimbus",
    version,
    about = "Manage Nimbus cloud resources from the command line",
    propagate_version = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Output format. `interactive` opens a full-screen session and
    /// falls back to `text` when stdout is not a terminal.
    #[arg(
        short = 'o',
        long,
        global = true,
        env = "NIMBUS_OUTPUT",
        value_enum,
        default_value_t = OutputFormat::Interactive
    )]
    pub output: OutputFormat,

    /// Skip confirmation prompts for mutating commands.
    #[arg(short = 'y', long, global = true)]
    pub confirm: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short = 'v', long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "kebab-case")]
pub enum OutputFormat {
    Interactive,
    Text,
    Json,
    JsonCompact,
    Yaml,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Log in through the dashboard device flow
    Login,

    /// List services, databases, and key value stores
    #[command(alias = "ls")]
    List(ListArgs),

    /// Restart a service or database by ID
    Restart {
        /// Resource ID (srv- or dpg- prefixed)
        resource_id: String,
    },

    /// Manage one-off jobs
    Jobs {
        #[command(subcommand)]
        command: JobsCommand,
    },

    /// View or tail resource logs
    Logs(LogsArgs),

    /// Select or show the active workspace
    Workspace {
        #[command(subcommand)]
        command: WorkspaceCommand,
    },

    /// Inspect the CLI configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },

    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Debug, Args)]
pub struct ListArgs {
    /// Restrict to these environment IDs (repeatable)
    #[arg(long = "environment-ids", alias = "env")]
    pub environment_ids: Vec<String>,

    /// Include preview environment resources
    #[arg(long)]
    pub include_previews: bool,
}

#[derive(Debug, Subcommand)]
pub enum JobsCommand {
    /// Cancel a running job
    Cancel {
        /// Service the job belongs to
        service_id: String,
        /// Job ID
        job_id: String,
    },
}

#[derive(Debug, Args)]
pub struct LogsArgs {
    /// Resource to read logs for. Omit in interactive mode to pick
    /// from the resource list.
    pub resource_id: Option<String>,

    /// Follow the live stream after printing history
    #[arg(long)]
    pub tail: bool,

    /// Full-text filter (repeatable)
    #[arg(long)]
    pub text: Vec<String>,

    /// Filter by level, e.g. info or error (repeatable)
    #[arg(long)]
    pub level: Vec<String>,

    /// Maximum number of history lines
    #[arg(long, default_value_t = 100)]
    pub limit: u32,

    /// Start of the time range (RFC 3339)
    #[arg(long)]
    pub start: Option<DateTime<Utc>>,

    /// End of the time range (RFC 3339)
    #[arg(long)]
    pub end: Option<DateTime<Utc>>,

    /// Look back this far from now (e.g. 30m, 2h); overrides --start
    #[arg(long, value_parser = parse_duration)]
    pub since: Option<std::time::Duration>,

    /// Which end of the range to read from
    #[arg(long, value_enum, default_value_t = Direction::Backward)]
    pub direction: Direction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "kebab-case")]
pub enum Direction {
    Backward,
    Forward,
}

impl From<Direction> for LogDirection {
    fn from(direction: Direction) -> Self {
        match direction {
            Direction::Backward => Self::Backward,
            Direction::Forward => Self::Forward,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum WorkspaceCommand {
    /// Choose the workspace used for queries
    Set {
        /// Workspace ID; omit in interactive mode to pick from a list
        #[arg(long)]
        id: Option<String>,
    },
    /// Print the active workspace
    Show,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the resolved configuration (the API key is redacted)
    Show,
    /// Print the configuration file path
    Path,
}

fn parse_duration(s: &str) -> Result<std::time::Duration, humantime::DurationError> {
    humantime::parse_duration(s)
}
