//! `okr config` command - Configuration management
//!
//! Values come from the global file, the workspace file and `OKR_*`
//! environment variables, later sources winning.

use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};
use serde_yml::{Mapping, Value};
use std::fs;
use std::path::{Path, PathBuf};

use crate::cli::helpers::discover_workspace;
use crate::cli::GlobalOpts;
use crate::core::config::CONFIG_KEYS;
use crate::core::Config;

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show current configuration values
    Show(ShowArgs),

    /// Set a configuration value
    Set(SetArgs),

    /// Unset (remove) a configuration value
    Unset(UnsetArgs),

    /// Show paths to configuration files
    Path,

    /// List all available configuration keys
    Keys,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Show only this key's value
    pub key: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct SetArgs {
    /// Configuration key (see `okr config keys`)
    pub key: String,

    /// Value to set
    pub value: String,

    /// Set in global (user) config instead of workspace config
    #[arg(long, short = 'g')]
    pub global: bool,
}

#[derive(clap::Args, Debug)]
pub struct UnsetArgs {
    /// Configuration key to remove
    pub key: String,

    /// Remove from global (user) config instead of workspace config
    #[arg(long, short = 'g')]
    pub global: bool,
}

/// Run a config subcommand
pub fn run(cmd: ConfigCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        ConfigCommands::Show(args) => run_show(args, global),
        ConfigCommands::Set(args) => run_set(args, global),
        ConfigCommands::Unset(args) => run_unset(args, global),
        ConfigCommands::Path => run_path(global),
        ConfigCommands::Keys => run_keys(),
    }
}

fn run_show(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let workspace = discover_workspace(global).ok();
    let config = Config::load_for(workspace.as_ref());

    if let Some(key) = &args.key {
        check_key(key)?;
        return match config.get(key) {
            Some(v) => {
                println!("{}", v);
                Ok(())
            }
            None => Err(miette::miette!("Key '{}' is not set", key)),
        };
    }

    println!("{}", style("Effective Configuration").bold().underlined());
    println!();
    for (key, _) in CONFIG_KEYS {
        match config.get(key) {
            Some(v) => println!("  {}: {}", style(key).cyan(), style(v).yellow()),
            None => println!("  {}: {}", style(key).cyan(), style("(not set)").dim()),
        }
    }

    println!();
    println!("{}", style("Config Sources (in priority order):").dim());
    println!("  1. Environment variables (OKR_OWNER, OKR_STORAGE_KEY, OKR_REMOTE_DATABASE, OKR_FORMAT)");
    println!("  2. Workspace config (.okr/config.yaml)");
    println!("  3. Global config (~/.config/okr/config.yaml)");
    Ok(())
}

fn run_set(args: SetArgs, global: &GlobalOpts) -> Result<()> {
    check_key(&args.key)?;
    let path = target_path(args.global, global)?;
    set_value(&path, &args.key, &args.value)?;

    println!(
        "{} Set {} {} {} in {} config",
        style("✓").green(),
        style(&args.key).cyan(),
        style("→").dim(),
        style(&args.value).yellow(),
        scope(args.global)
    );
    Ok(())
}

fn run_unset(args: UnsetArgs, global: &GlobalOpts) -> Result<()> {
    check_key(&args.key)?;
    let path = target_path(args.global, global)?;
    if !path.exists() {
        return Err(miette::miette!(
            "Config file does not exist: {}",
            path.display()
        ));
    }

    let mut map = read_mapping(&path)?;
    if map.remove(Value::String(args.key.clone())).is_none() {
        return Err(miette::miette!("Key '{}' not found in config", args.key));
    }
    write_mapping(&path, &map)?;

    println!(
        "{} Removed {} from {} config",
        style("✓").green(),
        style(&args.key).cyan(),
        scope(args.global)
    );
    Ok(())
}

fn run_path(global: &GlobalOpts) -> Result<()> {
    println!("{}", style("Configuration file paths:").bold());
    println!();

    let global_path = global_config_path()?;
    println!("  {} {}", style("Global:").cyan(), global_path.display());
    print_exists(&global_path);

    println!();
    match discover_workspace(global) {
        Ok(workspace) => {
            let path = workspace.config_path();
            println!("  {} {}", style("Workspace:").cyan(), path.display());
            print_exists(&path);
        }
        Err(_) => println!(
            "  {} {}",
            style("Workspace:").cyan(),
            style("(not in an OKR workspace)").dim()
        ),
    }
    Ok(())
}

fn run_keys() -> Result<()> {
    println!("{}", style("Available configuration keys:").bold());
    println!();
    for (key, description) in CONFIG_KEYS {
        println!("  {:<20} {}", style(key).cyan(), style(description).dim());
    }
    println!();
    println!(
        "{}",
        style("Use 'okr config set <key> <value>' to set a value.").dim()
    );
    Ok(())
}

/// Write one key into a config file, keeping whatever else it holds
pub fn set_value(path: &Path, key: &str, value: &str) -> Result<()> {
    let mut map = if path.exists() {
        read_mapping(path)?
    } else {
        Mapping::new()
    };
    map.insert(
        Value::String(key.to_string()),
        Value::String(value.to_string()),
    );

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).into_diagnostic()?;
    }
    write_mapping(path, &map)
}

fn read_mapping(path: &Path) -> Result<Mapping> {
    let content = fs::read_to_string(path).into_diagnostic()?;
    match serde_yml::from_str::<Value>(&content) {
        Ok(Value::Mapping(map)) => Ok(map),
        // Empty or comment-only files parse as null
        Ok(Value::Null) => Ok(Mapping::new()),
        Ok(_) => Err(miette::miette!(
            "{} does not contain a mapping",
            path.display()
        )),
        Err(e) => Err(miette::miette!("Failed to parse {}: {}", path.display(), e)),
    }
}

fn write_mapping(path: &Path, map: &Mapping) -> Result<()> {
    let yaml = serde_yml::to_string(map).into_diagnostic()?;
    fs::write(path, yaml).into_diagnostic()
}

fn check_key(key: &str) -> Result<()> {
    if Config::is_valid_key(key) {
        Ok(())
    } else {
        Err(miette::miette!(
            help = "run `okr config keys` to list valid keys",
            "Unknown configuration key '{}'",
            key
        ))
    }
}

fn target_path(use_global: bool, global: &GlobalOpts) -> Result<PathBuf> {
    if use_global {
        global_config_path()
    } else {
        Ok(discover_workspace(global)?.config_path())
    }
}

fn global_config_path() -> Result<PathBuf> {
    Config::global_config_path()
        .ok_or_else(|| miette::miette!("Could not determine global config directory"))
}

fn scope(global: bool) -> &'static str {
    if global {
        "global"
    } else {
        "workspace"
    }
}

fn print_exists(path: &Path) {
    if path.exists() {
        println!("         {}", style("(exists)").green());
    } else {
        println!("         {}", style("(not created)").dim());
    }
}
