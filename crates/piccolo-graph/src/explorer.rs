//! Request-level control flow over one fact store.
//!
//! A caller names a chain hash, optionally a candidate and a trust context.
//! The explorer resolves the candidate, assembles the graph, marks anchors
//! and projects a layout. Every call is a pure read, so one explorer can
//! serve any number of threads.

use piccolo_core::{CandidateNumber, ChainError, ChainHash, FactStore, Result, TrustContext};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::anchors::mark_anchors;
use crate::assembly::assemble;
use crate::candidates::CandidateSet;
use crate::config::GraphConfig;
use crate::detail::{self, CertificateDetail, ChainDetail};
use crate::expansion::{Expander, Relative};
use crate::graph::Graph;
use crate::grading::{Alternate, ChainGrader};
use crate::render::{project, LayoutSpec};

/// Result of exploring one chain hash.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainView {
    pub chain_hash: ChainHash,
    /// Context used for anchors and grades
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trust_context: Option<TrustContext>,
    /// Resolved candidate, `None` when the chain has no built candidates
    pub candidate: Option<CandidateNumber>,
    pub graph: Graph,
    pub layout: LayoutSpec,
    /// Other candidates, best first
    pub alternates: Vec<Alternate>,
}

/// Entry point tying expansion, assembly, anchors, grading and projection together.
#[derive(Debug)]
pub struct ChainExplorer<'a, S: ?Sized> {
    store: &'a S,
    config: &'a GraphConfig,
}

impl<'a, S: FactStore + ?Sized> ChainExplorer<'a, S> {
    pub const fn new(store: &'a S, config: &'a GraphConfig) -> Self {
        Self { store, config }
    }

    pub const fn config(&self) -> &GraphConfig {
        self.config
    }

    pub const fn grader(&self) -> ChainGrader<'a, S> {
        ChainGrader::new(self.store, self.config.grade_order)
    }

    pub const fn expander(&self) -> Expander<'a, S> {
        Expander::new(self.store, self.config)
    }

    /// The requested trust context, else the configured default.
    pub fn trust_context<'c>(&'c self, requested: Option<&'c str>) -> Option<&'c str> {
        requested.or(self.config.default_trust_context.as_deref())
    }

    /// Candidate to show when the caller did not pick one.
    ///
    /// With a trust context this is the best graded candidate, without one
    /// the first candidate. An explicit candidate is returned unchanged.
    pub fn resolve_candidate(
        &self,
        chain_hash: &str,
        candidate: Option<CandidateNumber>,
        trust_context: Option<&str>,
    ) -> Result<Option<CandidateNumber>> {
        if candidate.is_some() {
            return Ok(candidate);
        }
        let (candidates, _) = CandidateSet::load(self.store, chain_hash)?;
        if candidates.is_empty() {
            debug!(chain = %chain_hash, "chain has no built candidates");
            return Ok(None);
        }
        match trust_context {
            Some(context) => self.grader().best_candidate(chain_hash, context).map(Some),
            None => Ok(candidates.first()),
        }
    }

    /// Build the full view of `chain_hash`.
    #[instrument(level = "debug", skip(self))]
    pub fn explore(
        &self,
        chain_hash: &str,
        candidate: Option<CandidateNumber>,
        trust_context: Option<&str>,
    ) -> Result<ChainView> {
        let trust_context = self.trust_context(trust_context);
        let candidate = self.resolve_candidate(chain_hash, candidate, trust_context)?;

        let mut graph = assemble(self.store, chain_hash, candidate)?;
        if let Some(context) = trust_context {
            graph = mark_anchors(self.store, graph, context)?;
        }
        let layout = project(&graph);

        let grader = self.grader();
        let alternates = match (candidate, trust_context) {
            (Some(n), Some(context)) => grader.alternates(chain_hash, n, context)?,
            (Some(n), None) => grader.ungraded_alternates(chain_hash, n)?,
            (None, _) => Vec::new(),
        };

        Ok(ChainView {
            chain_hash: chain_hash.to_string(),
            trust_context: trust_context.map(str::to_string),
            candidate,
            graph,
            layout,
            alternates,
        })
    }

    /// Detail of one candidate, resolved like [`Self::explore`].
    pub fn chain_detail(
        &self,
        chain_hash: &str,
        candidate: Option<CandidateNumber>,
        trust_context: Option<&str>,
    ) -> Result<ChainDetail> {
        let trust_context = self.trust_context(trust_context);
        let candidate = self
            .resolve_candidate(chain_hash, candidate, trust_context)?
            .ok_or_else(|| ChainError::not_found(format!("candidates of chain {chain_hash}")))?;
        detail::chain_detail(
            self.store,
            &self.grader(),
            chain_hash,
            candidate,
            trust_context,
        )
    }

    pub fn certificate_detail(&self, hash: &str) -> Result<CertificateDetail> {
        detail::certificate_detail(self.store, &self.expander(), hash)
    }

    pub fn ancestors(&self, cert: &str) -> Result<Vec<Relative>> {
        self.expander().ancestors(cert)
    }

    pub fn descendants(&self, cert: &str) -> Result<Vec<Relative>> {
        self.expander().descendants(cert)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Tag;
    use crate::testutil::{scenario_a, Facts};
    use piccolo_core::{GradeOrder, MemoryStore};

    fn graded() -> MemoryStore {
        Facts::new()
            .certs(&["leaf", "inter", "root", "cross"])
            .link("inter", "leaf")
            .link("root", "inter")
            .link("cross", "inter")
            .sent("xyz", &["leaf", "inter"])
            .built("xyz", 0, &["leaf", "inter", "root"], true)
            .built("xyz", 1, &["leaf", "inter", "cross"], true)
            .grade("xyz", 0, "trusted", 20)
            .grade("xyz", 1, "trusted", 10)
            .anchor("trusted", "cross")
            .store()
    }

    #[test]
    fn explore_selects_best_candidate() {
        let store = graded();
        let config = GraphConfig::new(GradeOrder::LowerIsBetter);
        let explorer = ChainExplorer::new(&store, &config);
        let view = explorer.explore("xyz", None, Some("trusted")).unwrap();

        assert_eq!(view.candidate, Some(1));
        assert!(view.graph.node("cross").unwrap().has(Tag::Built));
        assert!(view.graph.node("cross").unwrap().has(Tag::Anchor));
        assert_eq!(view.layout.source_rank, vec!["cross".to_string()]);
        assert_eq!(
            view.alternates,
            vec![Alternate {
                candidate: 0,
                grade: Some(20),
            }]
        );
    }

    #[test]
    fn default_context_comes_from_config() {
        let store = graded();
        let config =
            GraphConfig::new(GradeOrder::HigherIsBetter).default_trust_context("trusted");
        let explorer = ChainExplorer::new(&store, &config);
        let view = explorer.explore("xyz", None, None).unwrap();

        assert_eq!(view.trust_context.as_deref(), Some("trusted"));
        assert_eq!(view.candidate, Some(0));
    }

    #[test]
    fn without_context_first_candidate_and_no_anchors() {
        let store = graded();
        let config = GraphConfig::new(GradeOrder::LowerIsBetter);
        let explorer = ChainExplorer::new(&store, &config);
        let view = explorer.explore("xyz", None, None).unwrap();

        assert_eq!(view.candidate, Some(0));
        assert_eq!(view.graph.tagged(Tag::Anchor).count(), 0);
        assert_eq!(
            view.alternates,
            vec![Alternate {
                candidate: 1,
                grade: None,
            }]
        );
    }

    #[test]
    fn explicit_candidate_wins() {
        let store = scenario_a();
        let config = GraphConfig::new(GradeOrder::LowerIsBetter);
        let explorer = ChainExplorer::new(&store, &config);
        let view = explorer.explore("abc123", Some(0), None).unwrap();
        assert!(view.graph.edge("root", "intermediate").unwrap().has(Tag::Highlighted));
        assert!(explorer.explore("abc123", Some(3), None).unwrap_err().is_not_found());
    }

    #[test]
    fn sent_only_chain_has_no_candidate() {
        let store = Facts::new().certs(&["leaf"]).sent("s", &["leaf"]).store();
        let config = GraphConfig::new(GradeOrder::LowerIsBetter);
        let explorer = ChainExplorer::new(&store, &config);

        let view = explorer.explore("s", None, Some("trusted")).unwrap();
        assert_eq!(view.candidate, None);
        assert!(view.alternates.is_empty());
        assert!(explorer.chain_detail("s", None, None).unwrap_err().is_not_found());
    }

    #[test]
    fn unknown_chain_is_not_found() {
        let store = scenario_a();
        let config = GraphConfig::new(GradeOrder::LowerIsBetter);
        let explorer = ChainExplorer::new(&store, &config);
        assert!(explorer.explore("none", None, None).unwrap_err().is_not_found());
    }

    #[test]
    fn chain_detail_resolves_like_explore() {
        let store = graded();
        let config = GraphConfig::new(GradeOrder::LowerIsBetter);
        let explorer = ChainExplorer::new(&store, &config);
        let detail = explorer.chain_detail("xyz", None, Some("trusted")).unwrap();
        assert_eq!(detail.candidate, 1);
        assert_eq!(detail.grade, Some(10));
    }

    #[test]
    fn direct_walk_config_drives_expansion() {
        let store = graded();
        let config = GraphConfig::new(GradeOrder::LowerIsBetter).direct_walk(1);
        let explorer = ChainExplorer::new(&store, &config);
        let ancestors = explorer.ancestors("leaf").unwrap();
        assert_eq!(
            ancestors,
            vec![Relative {
                cert: "inter".into(),
                distance: 1,
            }]
        );
    }

    #[test]
    fn concurrent_requests_agree() {
        let store = graded();
        let config = GraphConfig::new(GradeOrder::LowerIsBetter);
        let explorer = ChainExplorer::new(&store, &config);
        let expected = explorer.explore("xyz", None, Some("trusted")).unwrap();

        std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|_| scope.spawn(|| explorer.explore("xyz", None, Some("trusted")).unwrap()))
                .collect();
            for handle in handles {
                assert_eq!(handle.join().unwrap(), expected);
            }
        });
    }

    #[test]
    fn view_serializes_to_json() {
        let store = scenario_a();
        let config = GraphConfig::new(GradeOrder::LowerIsBetter);
        let explorer = ChainExplorer::new(&store, &config);
        let view = explorer.explore("abc123", None, None).unwrap();

        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["candidate"], 0);
        assert_eq!(json["graph"]["nodes"].as_array().unwrap().len(), 3);
        assert!(json.get("trust_context").is_none());
    }
}
