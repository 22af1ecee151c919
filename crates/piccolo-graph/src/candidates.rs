//! Built candidates of one chain hash, indexed by candidate number.

use piccolo_core::{BuiltChain, CandidateNumber, FactStore, Result};
use tracing::warn;

use crate::graph::Inconsistency;

/// Candidates of a chain hash stored as an array indexed by candidate number.
#[derive(Debug, Clone, Default)]
pub struct CandidateSet {
    chains: Vec<BuiltChain>,
}

impl CandidateSet {
    /// Fetch all candidates of `chain_hash`.
    ///
    /// Gaps in the numbering are reported, not rejected; lookups still
    /// find every candidate that exists.
    pub fn load<S: FactStore + ?Sized>(
        store: &S,
        chain_hash: &str,
    ) -> Result<(Self, Vec<Inconsistency>)> {
        let mut chains = store.built_chains(chain_hash)?;
        chains.sort_by_key(|c| c.candidate);
        chains.dedup_by_key(|c| c.candidate);

        let mut warnings = Vec::new();
        for (expected, chain) in (0..).zip(&chains) {
            if chain.candidate != expected {
                warn!(
                    chain = %chain_hash,
                    expected,
                    found = chain.candidate,
                    "candidate numbering has a gap"
                );
                warnings.push(Inconsistency::SparseCandidates {
                    chain: chain_hash.to_string(),
                    expected,
                    found: chain.candidate,
                });
                break;
            }
        }

        Ok((Self { chains }, warnings))
    }

    /// Candidate by number.
    #[must_use]
    pub fn get(&self, candidate: CandidateNumber) -> Option<&BuiltChain> {
        usize::try_from(candidate)
            .ok()
            .and_then(|idx| self.chains.get(idx))
            .filter(|c| c.candidate == candidate)
            .or_else(|| self.chains.iter().find(|c| c.candidate == candidate))
    }

    /// Whether `candidate` exists.
    #[must_use]
    pub fn contains(&self, candidate: CandidateNumber) -> bool {
        self.get(candidate).is_some()
    }

    /// Lowest candidate number, 0 when numbering is dense.
    #[must_use]
    pub fn first(&self) -> Option<CandidateNumber> {
        self.chains.first().map(|c| c.candidate)
    }

    /// Candidate numbers in ascending order.
    pub fn numbers(&self) -> impl Iterator<Item = CandidateNumber> + '_ {
        self.chains.iter().map(|c| c.candidate)
    }

    /// All candidates in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = &BuiltChain> {
        self.chains.iter()
    }

    /// Number of candidates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.chains.len()
    }

    /// Whether the chain has no candidates.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chains.is_empty()
    }
}
