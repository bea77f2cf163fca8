//! CLI argument parsing.
use chrono::NaiveDate;
use clap::{Args as ClapArgs, Parser, Subcommand};

/// Assemble release notes from tracker tickets and upstream bug pages.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    #[arg(long, global = true)]
    /// Path to the configuration file. Defaults to relnotes.toml when it
    /// exists.
    pub config: Option<String>,

    #[arg(long, global = true)]
    /// Directory for the document store. Overrides `data_dir` from the
    /// configuration file.
    pub data_dir: Option<String>,

    #[arg(long, default_value_t = false, global = true)]
    /// Enable debug logging.
    pub debug: bool,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create, edit, inspect and delete releases.
    #[command(subcommand)]
    Release(ReleaseCommand),

    /// Manage tracker and LLM credentials.
    #[command(subcommand)]
    Settings(SettingsCommand),

    /// Generate the release notes document for a release and store it.
    Generate {
        /// Release id.
        id: String,

        #[arg(long)]
        /// Write the Markdown to this file instead of stdout.
        output: Option<String>,
    },

    /// Serve the JSON API.
    Serve {
        #[arg(long)]
        /// Address to listen on. Defaults to `server.host` from the
        /// configuration file.
        host: Option<String>,

        #[arg(long)]
        /// Port to listen on. Defaults to `server.port` from the
        /// configuration file.
        port: Option<u16>,
    },
}

#[derive(Subcommand, Debug)]
pub enum ReleaseCommand {
    /// Create a new release.
    Create {
        #[arg(long)]
        /// Project name, e.g. PSMDB.
        project: String,

        #[arg(long)]
        /// Release version, e.g. 8.0.4-2.
        version: String,

        #[command(flatten)]
        details: ReleaseDetails,
    },

    /// Edit an existing release. Only the given fields change.
    Update {
        /// Release id.
        id: String,

        #[arg(long)]
        project: Option<String>,

        #[arg(long)]
        version: Option<String>,

        #[command(flatten)]
        details: ReleaseDetails,

        #[arg(long, default_value_t = false, conflicts_with = "codename")]
        /// Remove the codename.
        clear_codename: bool,

        #[arg(long, default_value_t = false, conflicts_with = "date")]
        /// Remove the planned release date.
        clear_date: bool,
    },

    /// Print a release as JSON.
    Get {
        /// Release id.
        id: String,

        #[arg(long, default_value_t = false)]
        /// Print only the last generated Markdown document.
        markdown: bool,
    },

    /// List releases, newest first.
    List,

    /// Delete a release.
    Delete {
        /// Release id.
        id: String,
    },
}

/// Release fields shared by `create` and `update`.
#[derive(ClapArgs, Debug, Default)]
pub struct ReleaseDetails {
    #[arg(long)]
    /// Release codename shown in the document title.
    pub codename: Option<String>,

    #[arg(long)]
    /// Planned release date (YYYY-MM-DD).
    pub date: Option<NaiveDate>,

    #[arg(long, conflicts_with = "highlights_file")]
    /// Release highlights, inserted verbatim.
    pub highlights: Option<String>,

    #[arg(long)]
    /// Read release highlights from a file.
    pub highlights_file: Option<String>,

    #[arg(long)]
    /// Ticket keys separated by commas or whitespace.
    pub tickets: Option<String>,

    #[arg(long)]
    /// Upstream release-notes URLs separated by commas or whitespace.
    pub upstream_release_urls: Option<String>,

    #[arg(long)]
    /// Upstream bug page URLs separated by commas or whitespace.
    pub upstream_bug_urls: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum SettingsCommand {
    /// Update stored settings. Omitted fields keep their current value.
    Set {
        #[arg(long)]
        /// Tracker base URL, e.g. https://example.atlassian.net.
        tracker_url: Option<String>,

        #[arg(long)]
        /// Account email used for tracker authentication.
        tracker_email: Option<String>,

        #[arg(long)]
        /// Tracker API token. Falls back to RELNOTES_TRACKER_TOKEN env var.
        tracker_token: Option<String>,

        #[arg(long)]
        /// LLM API key. Falls back to RELNOTES_LLM_TOKEN env var.
        llm_token: Option<String>,
    },

    /// Print stored settings with tokens masked.
    Show,
}
