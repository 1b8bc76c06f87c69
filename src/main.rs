use clap::Parser;
use miette::Result;
use std::env;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use okr::cli::commands;
use okr::cli::{Cli, Commands};

fn main() -> Result<()> {
    // Reset SIGPIPE to default behavior (terminate silently) for proper Unix piping.
    // Without this, piping to `head`, `grep -q`, etc. causes a panic on broken pipe.
    #[cfg(unix)]
    {
        unsafe {
            libc::signal(libc::SIGPIPE, libc::SIG_DFL);
        }
    }
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .tab_width(4)
                .build(),
        )
    }))?;

    let cli = Cli::parse();
    let global = cli.global;
    init_tracing(global.verbose);

    match cli.command {
        Commands::Init(args) => commands::init::run(args),
        Commands::List(args) => commands::list::run(args, &global),
        Commands::Show(args) => commands::show::run(args, &global),
        Commands::New(args) => commands::new::run(args, &global),
        Commands::Edit(args) => commands::edit::run(args, &global),
        Commands::Checkin(args) => commands::checkin::run(args, &global),
        Commands::Delete(args) => commands::delete::run(args, &global),
        Commands::Search(args) => commands::search::run(args, &global),
        Commands::Status(args) => commands::status::run(args, &global),
        Commands::Actions(args) => commands::actions::run(args, &global),
        Commands::Watch(args) => commands::watch::run(args, &global),
        Commands::Config(cmd) => commands::config::run(cmd, &global),
        Commands::Completions(args) => commands::completions::run(args),
    }
}

/// Logs go to stderr; `OKR_LOG` overrides the filter, `OKR_LOG_FORMAT=json`
/// switches to structured output
fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env("OKR_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if verbose { "okr=debug,warn" } else { "okr=warn" })
    });

    let format = env::var("OKR_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}
