//! CLI argument parsing and command dispatch.

pub mod args;
pub mod commands;

use anyhow::Result;
use args::{Cli, Commands};
use clap::Parser;
use colored::Colorize;
use piccolo_core::ChainError;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::output::OutputFormat;

/// Exit status when the requested chain, candidate or certificate does not exist.
pub const EXIT_NOT_FOUND: u8 = 2;

/// Run the CLI application.
pub async fn run() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose);
    if cli.no_color {
        colored::control::set_override(false);
    }

    // Load configuration, then let flags override it
    let mut config = Config::load(cli.config.as_deref())?;
    if cli.grade_order.is_some() {
        config.grade_order = cli.grade_order;
    }

    let output_format = cli
        .output
        .or(config.output_format)
        .unwrap_or(OutputFormat::Pretty);

    let ctx = commands::Context {
        facts: cli.facts.or_else(|| config.facts.clone()),
        trust_context: cli
            .trust_context
            .or_else(|| config.default_trust_context.clone()),
        config,
        output_format,
    };

    match cli.command {
        Commands::Graph(args) => commands::graph::execute(ctx, args).await,
        Commands::Chain(args) => commands::chain::execute(ctx, args).await,
        Commands::Cert(args) => commands::cert::execute(ctx, args).await,
        Commands::Ancestors(args) => commands::expand::ancestors(ctx, args).await,
        Commands::Descendants(args) => commands::expand::descendants(ctx, args).await,
        Commands::Grades(args) => commands::grades::execute(ctx, args).await,
        Commands::Chains(args) => commands::chains::execute(ctx, args).await,
        Commands::Answer(args) => commands::answer::execute(ctx, args).await,
    }
}

/// Print `err` for the user and pick the exit status.
///
/// Missing facts get a short "not found" line; store internals are never
/// shown beyond the error chain.
pub fn report(err: &anyhow::Error) -> ExitCode {
    let chain_error = err.chain().find_map(|e| e.downcast_ref::<ChainError>());
    match chain_error {
        Some(ChainError::NotFound { resource }) => {
            eprintln!("{} {resource}", "Not found:".red().bold());
            ExitCode::from(EXIT_NOT_FOUND)
        }
        _ => {
            eprintln!("{} {err:#}", "Error:".red().bold());
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "piccolo=debug" } else { "piccolo=info" };
    // A subscriber may already be installed when embedded; keep it.
    let _ = tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .try_init();
}
