//! `piccolo ancestors` / `piccolo descendants` - Follow issuance links.

use anyhow::Result;
use colored::Colorize;
use piccolo_core::FactStore;
use piccolo_graph::Relative;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use super::Context;
use crate::cli::args::CertArgs;
use crate::facts::resolve_cert;
use crate::output::{or_dash, print_structured, short};

#[derive(Tabled)]
struct RelativeRow {
    #[tabled(rename = "Hops")]
    distance: u32,
    #[tabled(rename = "Certificate")]
    hash: String,
    #[tabled(rename = "Subject")]
    subject: String,
}

#[derive(Serialize)]
struct Expansion<'a> {
    cert: &'a str,
    relatives: &'a [Relative],
}

#[derive(Clone, Copy)]
enum Direction {
    Ancestors,
    Descendants,
}

pub async fn ancestors(ctx: Context, args: CertArgs) -> Result<()> {
    execute(ctx, args, Direction::Ancestors).await
}

pub async fn descendants(ctx: Context, args: CertArgs) -> Result<()> {
    execute(ctx, args, Direction::Descendants).await
}

async fn execute(ctx: Context, args: CertArgs, direction: Direction) -> Result<()> {
    let command = match direction {
        Direction::Ancestors => "ancestors",
        Direction::Descendants => "descendants",
    };
    ctx.reject_dot(command)?;

    let store = ctx.store().await?;
    let hash = resolve_cert(&store, &args.hash)?;
    let expander = ctx.config.expander(&store)?;
    let relatives = match direction {
        Direction::Ancestors => expander.ancestors(&hash)?,
        Direction::Descendants => expander.descendants(&hash)?,
    };

    let expansion = Expansion {
        cert: &hash,
        relatives: &relatives,
    };
    if print_structured(ctx.output_format, &expansion)? {
        return Ok(());
    }

    let title = match direction {
        Direction::Ancestors => "Ancestors of",
        Direction::Descendants => "Descendants of",
    };
    println!("{} {}", title.bold(), hash.cyan().bold());
    if relatives.is_empty() {
        println!("  {}", "none".dimmed());
        return Ok(());
    }

    let mut rows = Vec::with_capacity(relatives.len());
    for r in &relatives {
        rows.push(RelativeRow {
            distance: r.distance,
            hash: short(&r.cert).to_string(),
            subject: or_dash(store.subject_name(&r.cert)?.as_deref()),
        });
    }
    println!("{}", Table::new(&rows).with(Style::rounded()));
    Ok(())
}
