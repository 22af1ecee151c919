//! `piccolo answer` - Show what a server answered during a campaign.

use anyhow::Result;
use colored::Colorize;
use piccolo_core::parse_campaign;
use piccolo_graph::detail::answer_detail;
use piccolo_graph::AnswerDetail;

use super::Context;
use crate::cli::args::AnswerArgs;
use crate::output::print_structured;

pub async fn execute(ctx: Context, args: AnswerArgs) -> Result<()> {
    ctx.reject_dot("answer")?;
    let campaign = parse_campaign(&args.campaign)
        .ok_or_else(|| anyhow::anyhow!("invalid campaign id: {}", args.campaign))?;

    let store = ctx.store().await?;
    let answers = answer_detail(&store, campaign, &args.ip)?;

    if !print_structured(ctx.output_format, &answers)? {
        for (i, answer) in answers.iter().enumerate() {
            if i > 0 {
                println!();
            }
            print_answer_pretty(answer);
        }
    }
    Ok(())
}

fn print_answer_pretty(answer: &AnswerDetail) {
    println!(
        "{} {} {}",
        "Answer from".bold(),
        format!("{}:{}", answer.ip, answer.port).cyan().bold(),
        format!("(campaign {})", answer.campaign).dimmed()
    );
    if !answer.name.is_empty() {
        println!("  {} {}", "Name:".bold(), answer.name);
    }
    println!("  {} {}", "Seen:".bold(), answer.timestamp);
    println!("  {} {}", "Answer:".bold(), answer.description);
    match &answer.chain_hash {
        Some(chain) => println!("  {} {}", "Chain:".bold(), chain),
        None => println!("  {} {}", "Chain:".bold(), "none sent".dimmed()),
    }
}
