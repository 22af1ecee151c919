//! `piccolo grades` - Rank the built candidates of a chain.

use anyhow::Result;
use colored::Colorize;
use piccolo_core::{CandidateNumber, GradeOrder};
use piccolo_graph::{Alternate, ChainExplorer};
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use super::Context;
use crate::cli::args::GradesArgs;
use crate::facts::resolve_chain;
use crate::output::print_structured;

#[derive(Serialize)]
struct Ranking {
    chain_hash: String,
    trust_context: String,
    grade_order: GradeOrder,
    best: CandidateNumber,
    ranked: Vec<Alternate>,
}

#[derive(Tabled)]
struct RankRow {
    #[tabled(rename = "Rank")]
    rank: usize,
    #[tabled(rename = "Candidate")]
    candidate: CandidateNumber,
    #[tabled(rename = "Grade")]
    grade: String,
}

pub async fn execute(ctx: Context, args: GradesArgs) -> Result<()> {
    ctx.reject_dot("grades")?;
    let trust_context = ctx.require_trust_context()?;
    let store = ctx.store().await?;
    let config = ctx.config.graph_config()?;
    let chain = resolve_chain(&store, &args.chain)?;

    let grader = ChainExplorer::new(&store, &config).grader();
    let best = grader.best_candidate(&chain, trust_context)?;
    let mut ranked = vec![Alternate {
        candidate: best,
        grade: grader.grade(&chain, best, trust_context)?,
    }];
    ranked.extend(grader.alternates(&chain, best, trust_context)?);

    let ranking = Ranking {
        chain_hash: chain,
        trust_context: trust_context.to_string(),
        grade_order: grader.order(),
        best,
        ranked,
    };
    if print_structured(ctx.output_format, &ranking)? {
        return Ok(());
    }

    println!(
        "{} {} {}",
        "Chain:".bold(),
        ranking.chain_hash.cyan().bold(),
        format!("({}, {})", ranking.trust_context, ranking.grade_order).dimmed()
    );
    let rows: Vec<RankRow> = (1..)
        .zip(&ranking.ranked)
        .map(|(rank, alt)| RankRow {
            rank,
            candidate: alt.candidate,
            grade: alt
                .grade
                .map_or_else(|| "ungraded".to_string(), |g| g.to_string()),
        })
        .collect();
    println!("{}", Table::new(&rows).with(Style::rounded()));
    println!("{} {}", "Best candidate:".bold(), ranking.best.to_string().green().bold());
    Ok(())
}
