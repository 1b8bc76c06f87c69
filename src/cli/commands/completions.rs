//! Shell completion generation
//!
//! Generates shell completion scripts for bash, zsh, fish, and PowerShell.
//!
//! # Usage
//!
//! ```bash
//! # Bash - add to ~/.bashrc
//! source <(okr completions bash)
//!
//! # Zsh - add to ~/.zshrc
//! source <(okr completions zsh)
//!
//! # Fish - add to ~/.config/fish/completions/okr.fish
//! okr completions fish > ~/.config/fish/completions/okr.fish
//!
//! # PowerShell - add to $PROFILE
//! okr completions powershell >> $PROFILE
//! ```

use clap::CommandFactory;
use clap_complete::{generate, Shell};
use miette::Result;
use std::io;

use crate::cli::Cli;

#[derive(clap::Args, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

pub fn run(args: CompletionsArgs) -> Result<()> {
    let mut cmd = Cli::command();
    generate(args.shell, &mut cmd, "okr", &mut io::stdout());
    Ok(())
}
