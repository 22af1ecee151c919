//! Trust contexts, anchor sets and externally computed grades.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use super::{CandidateNumber, CertHash, ChainHash};

/// Name of a trust-anchor scope, e.g. a specific trust store.
pub type TrustContext = String;

/// Certificates acting as trust anchors within one context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrustAnchorSet {
    /// Trust context
    pub context: TrustContext,
    /// Anchor certificate hashes
    pub certs: Vec<CertHash>,
}

/// Score of one candidate under one trust context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grade {
    /// Chain identifier
    pub chain_hash: ChainHash,
    /// Candidate number
    pub candidate: CandidateNumber,
    /// Trust context the grade applies to
    pub trust_context: TrustContext,
    /// Numeric score; its direction is given by [`GradeOrder`]
    pub grade: i64,
}

/// Which direction of the numeric grade is better.
///
/// Grades come from an external process whose convention is not fixed,
/// so the direction is always supplied by configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GradeOrder {
    /// Smallest grade wins
    LowerIsBetter,
    /// Largest grade wins
    HigherIsBetter,
}

impl GradeOrder {
    /// Compare two grades; `Ordering::Less` means `a` is better than `b`.
    #[must_use]
    pub fn compare(self, a: i64, b: i64) -> Ordering {
        match self {
            Self::LowerIsBetter => a.cmp(&b),
            Self::HigherIsBetter => b.cmp(&a),
        }
    }
}

impl FromStr for GradeOrder {
    type Err = crate::ChainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "lower-is-better" | "lower" | "asc" => Ok(Self::LowerIsBetter),
            "higher-is-better" | "higher" | "desc" => Ok(Self::HigherIsBetter),
            _ => Err(crate::ChainError::Config(format!(
                "unknown grade order: {s} (expected lower-is-better or higher-is-better)"
            ))),
        }
    }
}

impl fmt::Display for GradeOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LowerIsBetter => write!(f, "lower-is-better"),
            Self::HigherIsBetter => write!(f, "higher-is-better"),
        }
    }
}
