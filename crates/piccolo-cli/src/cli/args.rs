//! Command-line argument definitions using clap.

use clap::{Args, Parser, Subcommand};
use piccolo_core::{CandidateNumber, GradeOrder};
use std::path::PathBuf;

use crate::output::OutputFormat;

/// Explore TLS certificate chains recorded by probing campaigns
///
/// Rebuilds the graph of certificates a server sent and the chains a path
/// builder found, marks trust anchors and ranks candidates by grade.
#[derive(Parser, Debug)]
#[command(name = "piccolo")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Fact snapshot (JSON) to read
    #[arg(short, long, env = "PICCOLO_FACTS", global = true)]
    pub facts: Option<PathBuf>,

    /// Configuration file (defaults to the platform config directory)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Which grade is better: lower-is-better or higher-is-better
    #[arg(long, global = true)]
    pub grade_order: Option<GradeOrder>,

    /// Trust context for anchors and grades
    #[arg(long = "context", global = true)]
    pub trust_context: Option<String>,

    /// Output format
    #[arg(short, long, global = true, value_enum)]
    pub output: Option<OutputFormat>,

    /// Increase verbosity
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Assemble the certificate graph of a chain
    Graph(ChainArgs),

    /// Show one built candidate of a chain in detail
    Chain(ChainArgs),

    /// Show a certificate and everything linked to it, or find certificates
    Cert(CertLookupArgs),

    /// List every certificate that issued a certificate
    Ancestors(CertArgs),

    /// List every certificate issued by a certificate
    Descendants(CertArgs),

    /// Rank the built candidates of a chain
    Grades(GradesArgs),

    /// Find built chains by server address or by a subject on their path
    Chains(ChainsArgs),

    /// Show what a server answered during a campaign
    Answer(AnswerArgs),
}

#[derive(Args, Debug)]
pub struct ChainArgs {
    /// Chain hash or unique prefix
    pub chain: String,

    /// Built candidate to select (default: best graded, else 0)
    #[arg(short = 'n', long)]
    pub candidate: Option<CandidateNumber>,
}

#[derive(Args, Debug)]
pub struct CertArgs {
    /// Certificate hash or unique prefix
    pub hash: String,
}

#[derive(Args, Debug)]
pub struct CertLookupArgs {
    /// Certificate hash or unique prefix
    #[arg(required_unless_present_any = ["subject", "subject_hash", "name"])]
    pub hash: Option<String>,

    /// Find certificates by exact subject name
    #[arg(long, conflicts_with_all = ["hash", "subject_hash", "name"])]
    pub subject: Option<String>,

    /// Find certificates by subject name hash
    #[arg(long, conflicts_with_all = ["hash", "name"])]
    pub subject_hash: Option<String>,

    /// Find certificates valid for a name (CN or subjectAltName)
    #[arg(long, conflicts_with = "hash")]
    pub name: Option<String>,

    /// Only match names of this type, e.g. CN or DNS
    #[arg(long, requires = "name")]
    pub name_type: Option<String>,
}

#[derive(Args, Debug)]
pub struct ChainsArgs {
    /// Chains sent by this server address
    #[arg(long, required_unless_present = "subject", conflicts_with = "subject")]
    pub ip: Option<String>,

    /// Chains whose path holds a certificate with this subject name
    #[arg(long)]
    pub subject: Option<String>,

    /// Built candidate to list for each chain
    #[arg(short = 'n', long, default_value_t = 0)]
    pub candidate: CandidateNumber,
}

#[derive(Args, Debug)]
pub struct AnswerArgs {
    /// Campaign id, raw (2014051301) or as shown (2014-05-13/01)
    pub campaign: String,

    /// Server address
    pub ip: String,
}

#[derive(Args, Debug)]
pub struct GradesArgs {
    /// Chain hash or unique prefix
    pub chain: String,
}
