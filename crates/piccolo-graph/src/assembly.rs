//! Graph assembly: merge sent and built certificates of one chain hash.
//!
//! Steps run in order, since edges depend on the final node set:
//!
//! 1. nodes = sent chain ∪ every built candidate
//! 2. tag `sent` and, for the selected candidate, `built`
//! 3. edges = direct links whose both ends are nodes
//! 4. the selected candidate's path edges are tagged `highlighted`,
//!    added when no direct link backs them
//!
//! Facts that contradict each other are skipped and reported in
//! [`Graph::warnings`] rather than failing the whole assembly.

use piccolo_core::{CandidateNumber, CertHash, ChainError, FactStore, Result};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, warn};

use crate::candidates::CandidateSet;
use crate::graph::{Edge, Graph, Inconsistency, Node, Tag};

struct Builder<'a, S: ?Sized> {
    store: &'a S,
    chain_hash: &'a str,
    nodes: BTreeMap<CertHash, Node>,
    rejected: BTreeSet<CertHash>,
    edges: BTreeMap<(CertHash, CertHash), BTreeSet<Tag>>,
    warnings: Vec<Inconsistency>,
}

impl<'a, S: FactStore + ?Sized> Builder<'a, S> {
    fn new(store: &'a S, chain_hash: &'a str, warnings: Vec<Inconsistency>) -> Self {
        Self {
            store,
            chain_hash,
            nodes: BTreeMap::new(),
            rejected: BTreeSet::new(),
            edges: BTreeMap::new(),
            warnings,
        }
    }

    /// Add `cert` as a node, checking it against the certificate set once.
    fn admit(&mut self, cert: &str, tag: Option<Tag>) -> Result<()> {
        if let Some(node) = self.nodes.get_mut(cert) {
            node.tags.extend(tag);
            return Ok(());
        }
        if self.rejected.contains(cert) {
            return Ok(());
        }

        let Some(certificate) = self.store.certificate(cert)? else {
            warn!(chain = %self.chain_hash, cert, "skipping unknown certificate");
            self.rejected.insert(cert.to_string());
            self.warnings.push(Inconsistency::UnknownCertificate {
                chain: self.chain_hash.to_string(),
                cert: cert.to_string(),
            });
            return Ok(());
        };

        let label = self.store.name(&certificate.subject_hash)?;
        self.nodes.insert(
            cert.to_string(),
            Node {
                hash: cert.to_string(),
                label,
                tags: tag.into_iter().collect(),
            },
        );
        Ok(())
    }

    fn add_direct_edges(&mut self) -> Result<()> {
        let subjects: Vec<CertHash> = self.nodes.keys().cloned().collect();
        for subject in subjects {
            for link in self.store.direct_issuers(&subject)? {
                if self.nodes.contains_key(&link.issuer_hash) {
                    self.edges
                        .entry((link.issuer_hash, subject.clone()))
                        .or_default()
                        .insert(Tag::Direct);
                }
            }
        }
        Ok(())
    }

    fn highlight_path(&mut self, candidate: CandidateNumber, path: &[(&str, &str)]) {
        for &(issuer, subject) in path {
            if !(self.nodes.contains_key(issuer) && self.nodes.contains_key(subject)) {
                warn!(
                    chain = %self.chain_hash,
                    candidate,
                    issuer,
                    subject,
                    "skipping unresolvable path edge"
                );
                self.warnings.push(Inconsistency::UnresolvedPathEdge {
                    candidate,
                    issuer: issuer.to_string(),
                    subject: subject.to_string(),
                });
                continue;
            }
            self.edges
                .entry((issuer.to_string(), subject.to_string()))
                .or_default()
                .insert(Tag::Highlighted);
        }
    }

    fn finish(self, candidate: Option<CandidateNumber>) -> Graph {
        Graph {
            chain_hash: self.chain_hash.to_string(),
            candidate,
            nodes: self.nodes.into_values().collect(),
            edges: self
                .edges
                .into_iter()
                .map(|((issuer, subject), tags)| Edge {
                    issuer,
                    subject,
                    tags,
                })
                .collect(),
            warnings: self.warnings,
        }
    }
}

/// Assemble the certificate graph of `chain_hash`.
///
/// With `candidate`, that candidate's certificates are tagged `built` and
/// its validation path is highlighted. Fails with `NotFound` when the chain
/// has neither a sent chain nor built candidates, or when the requested
/// candidate does not exist.
pub fn assemble<S: FactStore + ?Sized>(
    store: &S,
    chain_hash: &str,
    candidate: Option<CandidateNumber>,
) -> Result<Graph> {
    let sent = store.sent_chain(chain_hash)?;
    let (candidates, warnings) = CandidateSet::load(store, chain_hash)?;
    if sent.is_none() && candidates.is_empty() {
        return Err(ChainError::not_found(format!("chain {chain_hash}")));
    }

    let selected = match candidate {
        Some(n) => Some(candidates.get(n).ok_or_else(|| {
            ChainError::not_found(format!("candidate {n} of chain {chain_hash}"))
        })?),
        None => None,
    };

    let mut builder = Builder::new(store, chain_hash, warnings);

    if let Some(sent) = &sent {
        for cert in &sent.certs {
            builder.admit(cert, Some(Tag::Sent))?;
        }
    }
    for chain in candidates.iter() {
        for link in &chain.links {
            builder.admit(&link.cert_hash, None)?;
        }
    }
    if let Some(chain) = selected {
        for link in &chain.links {
            builder.admit(&link.cert_hash, Some(Tag::Built))?;
        }
    }

    builder.add_direct_edges()?;

    if let Some(chain) = selected {
        builder.highlight_path(chain.candidate, &chain.path_edges());
    }

    let graph = builder.finish(candidate);
    debug!(
        chain = %chain_hash,
        candidate,
        nodes = graph.nodes.len(),
        edges = graph.edges.len(),
        warnings = graph.warnings.len(),
        "assembled chain graph"
    );
    Ok(graph)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{scenario_a, Facts};
    use piccolo_core::MemoryStore;

    #[test]
    fn scenario_a_inferred_root_edge_is_highlighted() {
        let store = scenario_a();
        let graph = assemble(&store, "abc123", Some(0)).unwrap();

        assert_eq!(graph.nodes.len(), 3);
        assert!(graph.warnings.is_empty());

        let direct = graph.edge("intermediate", "leaf").unwrap();
        assert!(direct.has(Tag::Direct));
        assert!(direct.has(Tag::Highlighted));

        let inferred = graph.edge("root", "intermediate").unwrap();
        assert!(inferred.has(Tag::Highlighted));
        assert!(inferred.is_inferred());
        assert_eq!(graph.edges.len(), 2);
    }

    #[test]
    fn provenance_tags_are_non_exclusive() {
        let store = scenario_a();
        let graph = assemble(&store, "abc123", Some(0)).unwrap();

        let leaf = graph.node("leaf").unwrap();
        assert!(leaf.has(Tag::Sent) && leaf.has(Tag::Built));
        let root = graph.node("root").unwrap();
        assert!(!root.has(Tag::Sent) && root.has(Tag::Built));
        assert_eq!(leaf.label.as_deref(), Some("CN=leaf"));
    }

    #[test]
    fn without_candidate_nothing_is_built_or_highlighted() {
        let store = scenario_a();
        let graph = assemble(&store, "abc123", None).unwrap();

        assert_eq!(graph.nodes.len(), 3);
        assert_eq!(graph.tagged(Tag::Built).count(), 0);
        assert_eq!(graph.edges.len(), 1);
        assert!(graph.edge("root", "intermediate").is_none());
    }

    #[test]
    fn scenario_c_unknown_chain_is_not_found() {
        let store = scenario_a();
        let err = assemble(&store, "none", None).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn missing_candidate_is_not_found() {
        let store = scenario_a();
        let err = assemble(&store, "abc123", Some(5)).unwrap_err();
        assert!(err.is_not_found());
    }

    fn two_candidates() -> MemoryStore {
        Facts::new()
            .certs(&["leaf", "inter", "root", "cross", "oldroot"])
            .link("inter", "leaf")
            .link("root", "inter")
            .link("cross", "inter")
            .link("oldroot", "cross")
            .sent("chain", &["leaf", "inter", "cross"])
            .built("chain", 0, &["leaf", "inter", "root"], true)
            .built("chain", 1, &["leaf", "inter", "cross", "oldroot"], true)
            .store()
    }

    #[test]
    fn nodes_include_every_candidate() {
        let store = two_candidates();
        let graph = assemble(&store, "chain", Some(0)).unwrap();
        let nodes: Vec<&str> = graph.node_hashes().collect();
        assert_eq!(nodes, vec!["cross", "inter", "leaf", "oldroot", "root"]);
        assert!(!graph.node("oldroot").unwrap().has(Tag::Built));
        assert!(graph.node("root").unwrap().has(Tag::Built));
        assert!(!graph.edge("oldroot", "cross").unwrap().has(Tag::Highlighted));
    }

    #[test]
    fn node_set_is_superset_of_each_candidate() {
        let store = two_candidates();
        let full = assemble(&store, "chain", None).unwrap();
        for chain in store.built_chains("chain").unwrap() {
            for link in &chain.links {
                assert!(full.contains(&link.cert_hash));
            }
        }
    }

    #[test]
    fn assembly_is_idempotent() {
        let store = two_candidates();
        let first = assemble(&store, "chain", Some(1)).unwrap();
        let second = assemble(&store, "chain", Some(1)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn edges_are_deduplicated() {
        let store = Facts::new()
            .certs(&["leaf", "ca"])
            .link("ca", "leaf")
            .link("ca", "leaf")
            .sent("dup", &["leaf", "ca", "leaf"])
            .built("dup", 0, &["leaf", "ca"], false)
            .store();
        let graph = assemble(&store, "dup", Some(0)).unwrap();
        assert_eq!(graph.nodes.len(), 2);
        assert_eq!(graph.edges.len(), 1);
        let edge = &graph.edges[0];
        assert!(edge.has(Tag::Direct) && edge.has(Tag::Highlighted));
    }

    #[test]
    fn direct_links_outside_node_set_are_ignored() {
        let store = Facts::new()
            .certs(&["leaf", "ca", "elsewhere"])
            .link("ca", "leaf")
            .link("elsewhere", "leaf")
            .sent("s", &["leaf", "ca"])
            .store();
        let graph = assemble(&store, "s", None).unwrap();
        assert_eq!(graph.edges.len(), 1);
        assert!(!graph.contains("elsewhere"));
    }

    #[test]
    fn unknown_certificates_are_skipped_with_warnings() {
        let store = Facts::new()
            .certs(&["leaf", "inter"])
            .link("inter", "leaf")
            .sent("gc", &["leaf", "inter"])
            .built("gc", 0, &["leaf", "inter", "collected"], true)
            .store();
        let graph = assemble(&store, "gc", Some(0)).unwrap();

        assert_eq!(graph.nodes.len(), 2);
        assert!(graph.edge("inter", "leaf").unwrap().has(Tag::Highlighted));
        assert_eq!(
            graph.warnings,
            vec![
                Inconsistency::UnknownCertificate {
                    chain: "gc".into(),
                    cert: "collected".into(),
                },
                Inconsistency::UnresolvedPathEdge {
                    candidate: 0,
                    issuer: "collected".into(),
                    subject: "inter".into(),
                },
            ]
        );
    }

    #[test]
    fn sent_only_chain_assembles() {
        let store = Facts::new()
            .certs(&["leaf"])
            .sent("lonely", &["leaf"])
            .store();
        let graph = assemble(&store, "lonely", None).unwrap();
        assert_eq!(graph.nodes.len(), 1);
        assert!(graph.node("leaf").unwrap().has(Tag::Sent));
        assert!(graph.edges.is_empty());
    }
}
