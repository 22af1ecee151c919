//! `piccolo graph` - Assemble the certificate graph of a chain.

use anyhow::Result;
use colored::Colorize;
use piccolo_graph::{ChainExplorer, ChainView, Tag};
use std::collections::BTreeSet;
use tabled::{settings::Style, Table, Tabled};

use super::Context;
use crate::cli::args::ChainArgs;
use crate::facts::resolve_chain;
use crate::output::{or_dash, print_structured, short, OutputFormat};

#[derive(Tabled)]
struct NodeRow {
    #[tabled(rename = "Certificate")]
    hash: String,
    #[tabled(rename = "Subject")]
    subject: String,
    #[tabled(rename = "Tags")]
    tags: String,
}

#[derive(Tabled)]
struct EdgeRow {
    #[tabled(rename = "Issuer")]
    issuer: String,
    #[tabled(rename = "Subject")]
    subject: String,
    #[tabled(rename = "Tags")]
    tags: String,
}

pub async fn execute(ctx: Context, args: ChainArgs) -> Result<()> {
    let store = ctx.store().await?;
    let config = ctx.config.graph_config()?;
    let chain = resolve_chain(&store, &args.chain)?;

    let explorer = ChainExplorer::new(&store, &config);
    let view = explorer.explore(&chain, args.candidate, ctx.trust_context.as_deref())?;

    match ctx.output_format {
        OutputFormat::Dot => print!("{}", view.layout.to_dot()),
        format => {
            if !print_structured(format, &view)? {
                print_view_pretty(&view);
            }
        }
    }

    Ok(())
}

fn join_tags(tags: &BTreeSet<Tag>) -> String {
    tags.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

fn print_view_pretty(view: &ChainView) {
    println!("{} {}", "Chain:".bold(), view.chain_hash.cyan().bold());
    match view.candidate {
        Some(n) => println!("  {} {}", "Candidate:".bold(), n),
        None => println!("  {} {}", "Candidate:".bold(), "none built".dimmed()),
    }
    if let Some(context) = &view.trust_context {
        println!("  {} {}", "Trust context:".bold(), context);
    }

    let nodes: Vec<NodeRow> = view
        .graph
        .nodes
        .iter()
        .map(|n| NodeRow {
            hash: short(&n.hash).to_string(),
            subject: or_dash(n.label.as_deref()),
            tags: join_tags(&n.tags),
        })
        .collect();
    println!();
    println!("{}", "Certificates:".bold().underline());
    println!("{}", Table::new(&nodes).with(Style::rounded()));

    if !view.graph.edges.is_empty() {
        let edges: Vec<EdgeRow> = view
            .graph
            .edges
            .iter()
            .map(|e| EdgeRow {
                issuer: short(&e.issuer).to_string(),
                subject: short(&e.subject).to_string(),
                tags: join_tags(&e.tags),
            })
            .collect();
        println!();
        println!("{}", "Issuance:".bold().underline());
        println!("{}", Table::new(&edges).with(Style::rounded()));
    }

    if !view.alternates.is_empty() {
        println!();
        println!("{}", "Alternates:".bold());
        for alt in &view.alternates {
            let grade = alt
                .grade
                .map_or_else(|| "ungraded".dimmed().to_string(), |g| g.to_string());
            println!("  {} {}  {}", "#".dimmed(), alt.candidate, grade);
        }
    }

    if !view.graph.warnings.is_empty() {
        println!();
        for warning in &view.graph.warnings {
            println!("{} {}", "warning:".yellow().bold(), warning);
        }
    }
}
