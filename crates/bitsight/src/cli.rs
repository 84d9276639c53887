use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "bitsight")]
#[command(version)]
#[command(about = "Collect BitSight security ratings data as host events")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Collect one endpoint and emit its records as events
    Collect(CollectArgs),

    /// Run every enabled configured input once
    Run,

    /// List the endpoint catalog
    Endpoints,

    /// Validate configuration and connectivity
    Validate {
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show or edit settings
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Fire an alert action with a payload file
    Alert {
        /// Action name: email, pagerduty or script
        action: String,
        /// Path to the alert payload JSON
        payload: String,
    },

    /// Print version information
    Version,
}

#[derive(Args, Debug, Clone)]
pub struct CollectArgs {
    /// Logical endpoint name (see `bitsight endpoints`)
    #[arg(short, long)]
    pub endpoint: String,

    /// Restrict to one company instead of the whole portfolio
    #[arg(long)]
    pub company_guid: Option<String>,

    /// Restrict to one user instead of all users
    #[arg(long)]
    pub user_guid: Option<String>,

    /// Observation for finding-level endpoints
    #[arg(long)]
    pub observation_id: Option<String>,

    /// Comma-separated risk vectors for findings endpoints
    #[arg(long)]
    pub risk_vectors: Option<String>,

    /// History depth in days
    #[arg(long)]
    pub days_back: Option<u32>,

    /// Index recorded on each event
    #[arg(long, default_value = "main")]
    pub index: String,

    /// Append events to this JSONL file instead of stdout
    #[arg(short, long)]
    pub output: Option<String>,
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print settings with secrets masked
    Show,
    /// Update one setting
    Set {
        section: String,
        key: String,
        value: String,
    },
}
