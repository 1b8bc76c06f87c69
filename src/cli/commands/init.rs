//! `okr init` command - Initialize a new OKR workspace

use console::style;
use miette::{IntoDiagnostic, Result};

use crate::cli::commands::config::set_value;
use crate::core::workspace::{Workspace, WorkspaceError};
use crate::core::Config;
use crate::store::{FileKeyValueStore, LocalStore, OkrStore, RemoteStore};

#[derive(clap::Args, Debug)]
pub struct InitArgs {
    /// Directory to initialize (default: current directory)
    #[arg(default_value = ".")]
    pub path: std::path::PathBuf,

    /// Force initialization even if .okr/ already exists
    #[arg(long)]
    pub force: bool,

    /// Start with no OKRs instead of the example dataset
    #[arg(long)]
    pub empty: bool,

    /// Shared SQLite database to use as the authoritative store
    #[arg(long, value_name = "PATH")]
    pub remote: Option<String>,
}

pub fn run(args: InitArgs) -> Result<()> {
    let path = if args.path.as_os_str() == "." {
        std::env::current_dir().into_diagnostic()?
    } else {
        args.path.clone()
    };

    if !path.exists() {
        std::fs::create_dir_all(&path).into_diagnostic()?;
        println!(
            "{} Created directory {}",
            style("✓").green(),
            style(path.display()).cyan()
        );
    }

    let workspace = if args.force {
        Workspace::init_force(&path)
    } else {
        Workspace::init(&path)
    };

    let workspace = match workspace {
        Ok(workspace) => workspace,
        Err(WorkspaceError::AlreadyExists(path)) => {
            println!(
                "{} OKR workspace already exists at {}",
                style("!").yellow(),
                style(path.display()).cyan()
            );
            println!();
            println!("Use {} to reinitialize", style("okr init --force").yellow());
            return Ok(());
        }
        Err(e) => return Err(miette::miette!("{}", e)),
    };

    println!(
        "{} Initialized OKR workspace at {}",
        style("✓").green(),
        style(workspace.root().display()).cyan()
    );

    if let Some(remote) = args.remote.as_deref() {
        set_value(&workspace.config_path(), "remote_database", remote)?;
    }

    let config = Config::load_for(Some(&workspace));
    let count = prepare_local_store(&workspace, &config, args.empty)?;
    println!(
        "{} Local store ready with {} OKR(s)",
        style("✓").green(),
        style(count).cyan()
    );

    if let Some(path) = config.remote_database_path(&workspace) {
        RemoteStore::open(&path).map_err(|e| miette::miette!("{}", e))?;
        println!(
            "{} Shared database ready at {}",
            style("✓").green(),
            style(path.display()).cyan()
        );
    }

    println!();
    println!("Next steps:");
    println!("  {} Create a global OKR", style("okr new --objective \"...\"").yellow());
    println!("  {} Show the hierarchy", style("okr list --tree").yellow());
    println!("  {} Show the dashboard", style("okr status").yellow());
    Ok(())
}

/// Materialize the local blob now so the first data command does not seed
/// behind the user's back
fn prepare_local_store(workspace: &Workspace, config: &Config, empty: bool) -> Result<usize> {
    let kv = FileKeyValueStore::open(workspace.store_dir()).map_err(|e| miette::miette!("{}", e))?;
    let store = LocalStore::new(kv, config.storage_key());
    let mut store = if empty { store.without_seed() } else { store };
    let okrs = store.read_all().map_err(|e| miette::miette!("{}", e))?;
    Ok(okrs.len())
}
