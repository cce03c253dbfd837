//! # organizer CLI entry point
//!
//! Parses command-line arguments, installs the tracing subscriber and
//! dispatches to subcommand handlers.

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use organizer_cli::identity::{run_identity, IdentityArgs};
use organizer_cli::leaf::{run_leaf, LeafArgs};
use organizer_cli::load_config;
use organizer_cli::signing::{run_sign, SignArgs};
use organizer_cli::tree::{run_tree, TreeArgs};
use organizer_cli::verify::{run_verify, VerifyArgs};
use organizer_crypto::PairOrdering;

/// Payout organizer tooling for approvers and batch builders.
#[derive(Parser, Debug)]
#[command(name = "organizer", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    json: bool,

    /// Path to a YAML engine configuration. Falls back to ORGANIZER_* variables.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Derive or generate an approver identity.
    Identity(IdentityArgs),

    /// Encode a payout into its commitment leaf.
    Leaf(LeafArgs),

    /// Build a commitment tree over a payout list.
    Tree(TreeArgs),

    /// Sign a commitment root for an organization.
    Sign(SignArgs),

    /// Check an inclusion proof against a root.
    Verify(VerifyArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.json);

    match run(&cli) {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(2)
        }
    }
}

fn init_tracing(verbose: u8, json: bool) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn run(cli: &Cli) -> Result<u8> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let code = match &cli.command {
        Commands::Identity(args) => run_identity(args, &mut out)?,
        Commands::Leaf(args) => run_leaf(args, &mut out)?,
        Commands::Tree(args) => run_tree(args, ordering(cli, args.ordering)?, &mut out)?,
        Commands::Sign(args) => {
            let config = load_config(cli.config.as_deref())?;
            run_sign(args, &config.signing_domain(), &mut out)?
        }
        Commands::Verify(args) => run_verify(args, ordering(cli, args.ordering)?, &mut out)?,
    };
    out.flush()?;
    Ok(code)
}

/// An explicit `--ordering` wins, then `--config`, then
/// `ORGANIZER_PAIR_ORDERING`. Tree commands need no signing domain, so a
/// missing verifying context is not an error here.
fn ordering(cli: &Cli, explicit: Option<PairOrdering>) -> Result<PairOrdering> {
    if let Some(ordering) = explicit {
        return Ok(ordering);
    }
    if let Some(path) = cli.config.as_deref() {
        return Ok(load_config(Some(path))?.pair_ordering);
    }
    match std::env::var("ORGANIZER_PAIR_ORDERING") {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e: String| anyhow::anyhow!("invalid ORGANIZER_PAIR_ORDERING: {e}")),
        Err(_) => Ok(PairOrdering::default()),
    }
}
