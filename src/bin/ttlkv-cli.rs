//! TTLKV CLI
//!
//! Interactive menu over the process-wide store.

use clap::Parser;
use std::io;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};
use ttlkv::{instance, Shell, ShellConfig};

/// TTLKV CLI - Interactive Key-Value Menu
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Start with an empty store instead of the demo entries
    #[arg(long)]
    no_seed: bool,

    /// Only print the menu once, at startup
    #[arg(long)]
    quiet_menu: bool,

    /// Print store counters on exit
    #[arg(long)]
    stats: bool,
}

/// Filter used when `RUST_LOG` is unset or blank
const DEFAULT_LOG_FILTER: &str = "ttlkv=warn";

/// Build the log filter from a `RUST_LOG` value, falling back to the default
fn log_filter(rust_log: Option<&str>) -> anyhow::Result<EnvFilter> {
    match rust_log.map(str::trim) {
        Some(directives) if !directives.is_empty() => Ok(EnvFilter::try_new(directives)?),
        _ => Ok(EnvFilter::new(DEFAULT_LOG_FILTER)),
    }
}

fn main() -> anyhow::Result<()> {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();

    // Logs go to stderr so they never interleave with the menu on stdout
    fmt()
        .with_writer(io::stderr)
        .with_env_filter(log_filter(rust_log.as_deref())?)
        .init();

    let args = Args::parse();
    let store = instance().clone();

    let config = ShellConfig::default()
        .with_seed(!args.no_seed)
        .with_menu(!args.quiet_menu);

    if args.quiet_menu {
        for choice in ttlkv::shell::MenuChoice::ALL {
            println!("{}. {}", choice.number(), choice.label());
        }
    }

    info!(seed = config.seed_demo, "Starting interactive shell");

    let mut shell = Shell::new(store.clone(), io::stdin().lock(), io::stdout().lock(), config);
    shell.run()?;

    if args.stats {
        eprintln!("{}", store.metrics().summary());
    }

    Ok(())
}
