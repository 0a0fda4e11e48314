use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use editorial::editorial_config::{EditorialConfig, LogFormat};
use editorial::learning::ImprovementCategory;
use editorial::review::{DecisionStatus, Priority, ReviewStatus, RiskLevel, SortKey};

mod cmd;

#[derive(Parser)]
#[command(name = "editorial")]
#[command(version, about = "Editorial quality gate with adaptive auto-approval")]
pub struct Cli {
    /// Debug logging for the editorial crate
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Project directory containing .editorial/ (defaults to the current directory)
    #[arg(long, global = true)]
    pub project_dir: Option<PathBuf>,

    /// Where review items, policy and learning state are stored
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Log line format: text or json
    #[arg(long, global = true)]
    pub log_format: Option<LogFormat>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Content file plus the metadata the gate needs.
#[derive(Args, Clone)]
pub struct ContentArgs {
    /// HTML file to evaluate
    pub file: PathBuf,

    /// Content title (defaults to the file name)
    #[arg(long)]
    pub title: Option<String>,

    #[arg(long)]
    pub topic: String,

    #[arg(long, default_value = "default")]
    pub campaign: String,

    #[arg(long, default_value = "default")]
    pub site: String,

    /// Upstream generation run item this content came from
    #[arg(long)]
    pub run_item: Option<String>,

    /// Never auto-approve, even when every threshold is met
    #[arg(long)]
    pub force_manual: bool,

    /// Print machine-readable JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create .editorial/ with a default editorial.toml
    Init,
    /// Run the quality gate on a content file
    Gate {
        #[command(flatten)]
        content: ContentArgs,

        /// Evaluate without creating a review item
        #[arg(long)]
        skip_review: bool,

        /// Exit with an error when the content has hard issues
        #[arg(long)]
        enforce: bool,
    },
    /// Score a content file against the hard thresholds, without side effects
    Check {
        file: PathBuf,

        #[arg(long)]
        topic: String,

        #[arg(long)]
        json: bool,
    },
    /// Gate, decide and route a content file
    Submit {
        #[command(flatten)]
        content: ContentArgs,
    },
    /// Submit every file matching a glob pattern
    Batch {
        /// Glob pattern, e.g. "drafts/**/*.html"
        pattern: String,

        #[arg(long)]
        topic: String,

        #[arg(long, default_value = "default")]
        campaign: String,

        #[arg(long, default_value = "default")]
        site: String,

        #[arg(long)]
        json: bool,
    },
    /// Work the human review queue
    Queue {
        #[command(subcommand)]
        command: QueueCommands,
    },
    /// Inspect and feed the adaptive learning state
    Learning {
        #[command(subcommand)]
        command: LearningCommands,
    },
    /// View or validate configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand, Clone)]
pub enum QueueCommands {
    /// List review items
    List {
        #[arg(long)]
        status: Vec<ReviewStatus>,

        #[arg(long)]
        priority: Vec<Priority>,

        #[arg(long)]
        risk: Vec<RiskLevel>,

        #[arg(long)]
        campaign: Option<String>,

        #[arg(long)]
        site: Option<String>,

        #[arg(long)]
        assignee: Option<String>,

        #[arg(long)]
        unassigned: bool,

        /// Only items the decision engine flagged
        #[arg(long)]
        flagged: bool,

        #[arg(long, default_value = "priority")]
        sort: SortKey,

        #[arg(long)]
        json: bool,
    },
    /// Show one item (ID or unique ID prefix)
    Show {
        id: String,

        /// Include the content body
        #[arg(long)]
        content: bool,

        #[arg(long)]
        json: bool,
    },
    /// Aggregate queue statistics
    Stats {
        #[arg(long)]
        json: bool,
    },
    Assign {
        id: String,
        reviewer: String,

        #[arg(long)]
        name: Option<String>,
    },
    Unassign {
        id: String,
    },
    /// Move an item to in_review, assigning the reviewer if needed
    Start {
        id: String,
        reviewer: String,
    },
    /// Record a decision (prompts interactively when --status is omitted)
    Decide {
        id: String,

        #[arg(long)]
        status: Option<DecisionStatus>,

        #[arg(long)]
        reviewer: String,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        notes: Option<String>,

        /// Rejection reason
        #[arg(long)]
        reason: Option<String>,

        /// Change request message
        #[arg(long)]
        message: Option<String>,
    },
    /// Toggle a checklist entry
    Checklist {
        id: String,
        item: String,

        #[arg(long, default_value = "cli")]
        by: String,
    },
    RequestChanges {
        id: String,

        #[arg(long)]
        reviewer: String,

        #[arg(long)]
        message: String,
    },
    /// Mark a change request resolved
    Resolve {
        id: String,
        change_id: String,
    },
    /// Send a changes_requested item back to pending_review
    Resubmit {
        id: String,
    },
    /// Auto-approve an item if it was eligible at creation
    Auto {
        id: String,
    },
    /// Stamp an approved item as published
    Publish {
        id: String,
    },
    Delete {
        id: String,
    },
}

#[derive(Subcommand, Clone)]
pub enum LearningCommands {
    /// Aggregate learning report
    Stats {
        #[arg(long)]
        json: bool,
    },
    /// Generation guidance for one topic
    Topic {
        topic: String,

        #[arg(long)]
        json: bool,
    },
    /// Most frequent content-improvement signals
    Signals {
        #[arg(long, default_value = "10")]
        limit: usize,
    },
    /// Prompt addendum built from recurring signals
    Prompt,
    /// Record a content-improvement signal by hand
    RecordSignal {
        #[arg(long)]
        category: ImprovementCategory,

        #[arg(long)]
        signal: String,

        #[arg(long)]
        suggest: Option<String>,
    },
}

#[derive(Subcommand, Clone)]
pub enum ConfigCommands {
    Show,
    Validate,
    Init,
}

fn init_tracing(config: &EditorialConfig) {
    let filter = EnvFilter::try_new(config.log_filter())
        .unwrap_or_else(|_| EnvFilter::new("editorial=info"));
    let registry = tracing_subscriber::registry().with(filter);
    match config.log_format() {
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init(),
        LogFormat::Text => registry
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .init(),
    }
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let project_dir = match cli.project_dir.clone() {
        Some(dir) => dir,
        None => std::env::current_dir().context("Failed to get current directory")?,
    };
    let config = EditorialConfig::with_cli_args(
        project_dir,
        cli.data_dir.clone(),
        cli.verbose,
        cli.log_format,
    )?;
    init_tracing(&config);
    tracing::debug!(data_dir = %config.data_dir().display(), "configuration loaded");

    match &cli.command {
        Commands::Init => cmd::cmd_init(&config)?,
        Commands::Gate {
            content,
            skip_review,
            enforce,
        } => cmd::cmd_gate(&config, content, *skip_review, *enforce)?,
        Commands::Check { file, topic, json } => cmd::cmd_check(&config, file, topic, *json)?,
        Commands::Submit { content } => cmd::cmd_submit(&config, content)?,
        Commands::Batch {
            pattern,
            topic,
            campaign,
            site,
            json,
        } => cmd::cmd_batch(&config, pattern, topic, campaign, site, *json)?,
        Commands::Queue { command } => cmd::cmd_queue(&config, command.clone())?,
        Commands::Learning { command } => cmd::cmd_learning(&config, command.clone())?,
        Commands::Config { command } => cmd::cmd_config(&config, command.clone())?,
    }

    Ok(())
}
