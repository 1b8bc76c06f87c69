//! CLI argument definitions using clap derive

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::cli::commands::{
    actions::ActionsArgs, checkin::CheckinArgs, completions::CompletionsArgs,
    config::ConfigCommands, delete::DeleteArgs, edit::EditArgs, init::InitArgs, list::ListArgs,
    new::NewArgs, search::SearchArgs, show::ShowArgs, status::StatusArgs, watch::WatchArgs,
};

#[derive(Parser)]
#[command(name = "okr")]
#[command(author, version, about = "Objectives and key results, tracked locally or in a shared database")]
#[command(long_about = "Manage a hierarchy of global and area OKRs. Data lives in a local store under .okr/, or in a shared SQLite database when `remote_database` is configured; failed shared writes are saved locally instead.")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOpts,
}

#[derive(clap::Args, Clone, Debug)]
pub struct GlobalOpts {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "auto")]
    pub format: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Enable verbose output (debug logging on stderr)
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Workspace root (default: auto-detect by finding .okr/)
    #[arg(long, global = true, env = "OKR_WORKSPACE")]
    pub workspace: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new OKR workspace
    Init(InitArgs),

    /// List OKRs as a table or tree
    List(ListArgs),

    /// Show one OKR in full
    Show(ShowArgs),

    /// Create a global OKR, or an area OKR with --parent
    New(NewArgs),

    /// Change an OKR's definition
    Edit(EditArgs),

    /// Record progress, status and notes for an OKR
    Checkin(CheckinArgs),

    /// Delete an OKR together with everything below it
    Delete(DeleteArgs),

    /// Find OKRs by objective, key result, area or owner
    Search(SearchArgs),

    /// Show the executive dashboard
    Status(StatusArgs),

    /// List actions across all OKRs
    Actions(ActionsArgs),

    /// Follow changes made to the shared database by other clients
    Watch(WatchArgs),

    /// View and modify configuration
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Automatically detect based on context (yaml for show, tsv for list)
    #[default]
    Auto,
    /// YAML format (full fidelity)
    Yaml,
    /// Tab-separated values (for piping)
    Tsv,
    /// JSON format (for programming)
    Json,
    /// CSV format (for spreadsheets)
    Csv,
    /// Markdown tables
    Md,
    /// Just IDs, one per line
    Id,
}
