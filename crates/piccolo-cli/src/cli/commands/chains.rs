//! `piccolo chains` - Find built chains by server address or subject.

use anyhow::Result;
use colored::Colorize;
use piccolo_graph::{find_chains, ChainQuery, ChainSummary};
use tabled::{settings::Style, Table, Tabled};

use super::Context;
use crate::cli::args::ChainsArgs;
use crate::output::{or_dash, print_structured, short};

#[derive(Tabled)]
struct ChainRow {
    #[tabled(rename = "Chain")]
    chain_hash: String,
    #[tabled(rename = "#")]
    candidate: u32,
    #[tabled(rename = "Subject")]
    subject: String,
    #[tabled(rename = "Length")]
    chain_length: u32,
    #[tabled(rename = "Complete")]
    complete: String,
    #[tabled(rename = "Ordered")]
    ordered: String,
    #[tabled(rename = "Not after")]
    not_after: String,
}

impl From<&ChainSummary> for ChainRow {
    fn from(c: &ChainSummary) -> Self {
        Self {
            chain_hash: short(&c.chain_hash).to_string(),
            candidate: c.candidate,
            subject: or_dash(c.subject.as_deref()),
            chain_length: c.chain_length,
            complete: yes_no(c.complete),
            ordered: yes_no(c.ordered),
            not_after: c.not_after.clone(),
        }
    }
}

fn yes_no(value: bool) -> String {
    if value {
        "yes".green().to_string()
    } else {
        "no".red().to_string()
    }
}

pub async fn execute(ctx: Context, args: ChainsArgs) -> Result<()> {
    ctx.reject_dot("chains")?;
    let candidate = args.candidate;
    let query = chain_query(args)?;

    let store = ctx.store().await?;
    let found = find_chains(&store, &query, candidate)?;
    if print_structured(ctx.output_format, &found)? {
        return Ok(());
    }

    println!(
        "{} {} {}",
        "Chains:".bold(),
        query.to_string().cyan().bold(),
        format!("(candidate {}, {} found)", candidate, found.len()).dimmed()
    );
    let rows: Vec<ChainRow> = found.iter().map(ChainRow::from).collect();
    println!("{}", Table::new(&rows).with(Style::rounded()));
    Ok(())
}

fn chain_query(args: ChainsArgs) -> Result<ChainQuery> {
    match (args.ip, args.subject) {
        (Some(ip), _) => Ok(ChainQuery::Ip(ip)),
        (None, Some(subject)) => Ok(ChainQuery::SubjectInChain(subject)),
        (None, None) => anyhow::bail!("--ip or --subject required"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(ip: Option<&str>, subject: Option<&str>) -> ChainsArgs {
        ChainsArgs {
            ip: ip.map(String::from),
            subject: subject.map(String::from),
            candidate: 0,
        }
    }

    #[test]
    fn ip_or_subject_selects_the_query() {
        assert_eq!(
            chain_query(args(Some("192.0.2.7"), None)).unwrap(),
            ChainQuery::Ip("192.0.2.7".into())
        );
        assert_eq!(
            chain_query(args(None, Some("CN=root"))).unwrap(),
            ChainQuery::SubjectInChain("CN=root".into())
        );
    }

    #[test]
    fn missing_filter_is_refused() {
        let err = chain_query(args(None, None)).unwrap_err();
        assert!(err.to_string().contains("--ip or --subject"));
    }
}
