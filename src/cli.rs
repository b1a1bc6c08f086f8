use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "jira-wizard")]
#[command(about = "Create and edit Jira integration profiles")]
#[command(version)]
pub struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn output(&self) -> OutputOptions {
        OutputOptions { json: self.json }
    }
}

/// How command results are printed
#[derive(Debug, Clone, Copy, Default)]
pub struct OutputOptions {
    pub json: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Manage integration profiles
    Profile {
        #[command(subcommand)]
        action: ProfileAction,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
pub enum ProfileAction {
    /// List saved profiles
    Ls,

    /// Show one profile
    Show {
        /// Profile name (case-insensitive)
        name: String,
    },

    /// Create a profile, validating credentials and project against Jira
    Create {
        /// Profile name
        #[arg(long)]
        name: String,

        #[command(flatten)]
        fields: ProfileFields,
    },

    /// Edit a saved profile; omitted flags keep their current values
    Edit {
        /// Name of the profile to edit
        profile: String,

        /// Rename the profile
        #[arg(long)]
        name: Option<String>,

        #[command(flatten)]
        fields: ProfileFields,
    },

    /// List the projects visible to a set of credentials
    Projects {
        #[command(flatten)]
        credentials: CredentialArgs,
    },
}

/// Jira connection flags
#[derive(Args, Debug, Clone, Default)]
pub struct CredentialArgs {
    /// Jira server URL (default: config default_server)
    #[arg(long)]
    pub server: Option<String>,

    /// Account email (default: config default_email)
    #[arg(long)]
    pub email: Option<String>,

    /// API token (default: JIRA_API_TOKEN or config auth.api_token)
    #[arg(long)]
    pub token: Option<String>,
}

/// Profile flags shared by create and edit
#[derive(Args, Debug, Clone, Default)]
pub struct ProfileFields {
    #[command(flatten)]
    pub credentials: CredentialArgs,

    /// JQL restricting the issues of the profile
    #[arg(long)]
    pub query: Option<String>,

    /// Project key
    #[arg(long)]
    pub project: Option<String>,

    /// Workflow state where lead time starts
    #[arg(long)]
    pub lead_time_start: Option<String>,

    /// Workflow state where lead time ends
    #[arg(long)]
    pub lead_time_end: Option<String>,

    /// Workflow state where cycle time starts
    #[arg(long)]
    pub cycle_time_start: Option<String>,

    /// Workflow state where cycle time ends
    #[arg(long)]
    pub cycle_time_end: Option<String>,
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration
    Show,
    /// Set a configuration value
    Set {
        /// Configuration key (default_server, default_email, auth.api_token,
        /// name_check_debounce_ms, remote_timeout)
        key: String,
        /// Value to set
        value: String,
    },
    /// Get a configuration value
    Get {
        /// Configuration key
        key: String,
    },
}
