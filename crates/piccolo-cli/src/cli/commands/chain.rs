//! `piccolo chain` - Show one built candidate of a chain.

use anyhow::Result;
use colored::Colorize;
use piccolo_graph::{ChainDetail, ChainExplorer};
use tabled::{settings::Style, Table, Tabled};

use super::Context;
use crate::cli::args::ChainArgs;
use crate::facts::resolve_chain;
use crate::output::{or_dash, print_structured, short};

#[derive(Tabled)]
struct CertRow {
    #[tabled(rename = "#")]
    position: u32,
    #[tabled(rename = "Certificate")]
    hash: String,
    #[tabled(rename = "Subject")]
    subject: String,
    #[tabled(rename = "Sent at")]
    position_in_msg: String,
}

#[derive(Tabled)]
pub(super) struct SightingRow {
    #[tabled(rename = "Campaign")]
    pub campaign: String,
    #[tabled(rename = "IP")]
    pub ip: String,
    #[tabled(rename = "Name")]
    pub name: String,
    #[tabled(rename = "Seen")]
    pub timestamp: String,
    #[tabled(rename = "Answer")]
    pub description: String,
    #[tabled(rename = "Valid")]
    pub valid: String,
}

impl From<&piccolo_graph::Sighting> for SightingRow {
    fn from(s: &piccolo_graph::Sighting) -> Self {
        Self {
            campaign: s.campaign.clone(),
            ip: s.ip.clone(),
            name: s.name.clone(),
            timestamp: s.timestamp.clone(),
            description: s.description.clone(),
            valid: if s.valid_at_timestamp {
                "yes".green().to_string()
            } else {
                "no".red().to_string()
            },
        }
    }
}

pub async fn execute(ctx: Context, args: ChainArgs) -> Result<()> {
    ctx.reject_dot("chain")?;
    let store = ctx.store().await?;
    let config = ctx.config.graph_config()?;
    let chain = resolve_chain(&store, &args.chain)?;

    let explorer = ChainExplorer::new(&store, &config);
    let detail = explorer.chain_detail(&chain, args.candidate, ctx.trust_context.as_deref())?;

    if !print_structured(ctx.output_format, &detail)? {
        print_detail_pretty(&detail);
    }
    Ok(())
}

fn yes_no(value: bool) -> colored::ColoredString {
    if value {
        "yes".green()
    } else {
        "no".red()
    }
}

fn print_detail_pretty(detail: &ChainDetail) {
    println!(
        "{} {} {}",
        "Chain:".bold(),
        detail.chain_hash.cyan().bold(),
        format!("(candidate {})", detail.candidate).dimmed()
    );
    println!("  {} {}", "Complete:".bold(), yes_no(detail.complete));
    println!("  {} {}", "Ordered:".bold(), yes_no(detail.ordered));
    println!(
        "  {} {} ({} transitively valid)",
        "Length:".bold(),
        detail.chain_length,
        detail.transitively_valid_count
    );
    println!(
        "  {} {} to {}",
        "Validity:".bold(),
        detail.not_before,
        detail.not_after
    );
    if let Some(context) = &detail.trust_context {
        let grade = detail
            .grade
            .map_or_else(|| "ungraded".dimmed().to_string(), |g| g.to_string());
        println!("  {} {} ({})", "Grade:".bold(), grade, context);
    }

    let certs: Vec<CertRow> = detail
        .certs
        .iter()
        .map(|c| CertRow {
            position: c.position_in_chain,
            hash: short(&c.cert_hash).to_string(),
            subject: or_dash(c.subject.as_deref()),
            position_in_msg: c
                .position_in_msg
                .map_or_else(|| "-".to_string(), |p| p.to_string()),
        })
        .collect();
    println!();
    println!("{}", "Path:".bold().underline());
    println!("{}", Table::new(&certs).with(Style::rounded()));

    if !detail.unused.is_empty() {
        println!();
        println!("{}", "Unused certificates:".bold());
        for u in &detail.unused {
            println!(
                "  {} {} {}",
                format!("[{}]", u.position_in_msg).dimmed(),
                short(&u.cert_hash),
                or_dash(u.subject.as_deref())
            );
        }
    }

    if !detail.sightings.is_empty() {
        let rows: Vec<SightingRow> = detail.sightings.iter().map(SightingRow::from).collect();
        println!();
        println!("{}", "Seen in:".bold().underline());
        println!("{}", Table::new(&rows).with(Style::rounded()));
    }

    if !detail.alternates.is_empty() {
        println!();
        println!("{}", "Alternates:".bold());
        for alt in &detail.alternates {
            let grade = alt
                .grade
                .map_or_else(|| "ungraded".dimmed().to_string(), |g| g.to_string());
            println!("  {} {}  {}", "#".dimmed(), alt.candidate, grade);
        }
    }
}
