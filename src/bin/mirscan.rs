//! Command-line interface for the `mirscan` crate.
//!
//! Subcommands are implemented in separate files (modules) under `src/bin/mirscan/`:
//! - `scan_cmd.rs`
//!
//! Logging goes to stderr through `env_logger`; per-module `RUST_LOG` directives still apply on top of `-v`/`-q`.
//!
use clap::{Parser, Subcommand};
use anyhow::Result;

#[derive(Debug, Parser)]
#[command(name="mirscan", version=env!("CARGO_PKG_VERSION"), about="microRNA target scanning (Rust)", disable_help_subcommand=true)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    /// Only log errors.
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Scan every microRNA against every UTR and report the target sites.
    Scan(scan_cmd::ScanCmd),
}

#[path = "mirscan/scan_cmd.rs"] mod scan_cmd;

fn level(verbose: u8, quiet: bool) -> log::LevelFilter {
    if quiet {
        return log::LevelFilter::Error;
    }
    match verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    env_logger::Builder::from_default_env()
        .filter_level(level(cli.verbose, cli.quiet))
        .init();
    match cli.command {
        Command::Scan(cmd) => scan_cmd::run(cmd),
    }
}
