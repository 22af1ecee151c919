//! Assembled certificate graph and its provenance tags.

use piccolo_core::{CandidateNumber, CertHash, ChainHash};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use thiserror::Error;

/// Non-exclusive provenance tag carried by nodes and edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tag {
    /// Node was in the chain as sent by the server
    Sent,
    /// Node is part of the selected built candidate
    Built,
    /// Node is a trust anchor in the requested context
    Anchor,
    /// Edge is backed by an observed direct link
    Direct,
    /// Edge lies on the selected candidate's validation path
    Highlighted,
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Sent => "sent",
            Self::Built => "built",
            Self::Anchor => "anchor",
            Self::Direct => "direct",
            Self::Highlighted => "highlighted",
        })
    }
}

/// A certificate in the graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    /// Certificate hash
    pub hash: CertHash,
    /// Subject display name, when known
    pub label: Option<String>,
    /// Provenance tags
    pub tags: BTreeSet<Tag>,
}

impl Node {
    /// Whether the node carries `tag`.
    #[must_use]
    pub fn has(&self, tag: Tag) -> bool {
        self.tags.contains(&tag)
    }
}

/// An issuance edge, issuer to subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    /// Issuing certificate
    pub issuer: CertHash,
    /// Issued certificate
    pub subject: CertHash,
    /// Provenance tags
    pub tags: BTreeSet<Tag>,
}

impl Edge {
    /// Whether the edge carries `tag`.
    #[must_use]
    pub fn has(&self, tag: Tag) -> bool {
        self.tags.contains(&tag)
    }

    /// Asserted only by a built path, with no direct link behind it.
    #[must_use]
    pub fn is_inferred(&self) -> bool {
        !self.has(Tag::Direct)
    }
}

/// Facts that disagree with each other, skipped during assembly.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Inconsistency {
    /// A chain references a certificate missing from the certificate set
    #[error("chain {chain} references unknown certificate {cert}")]
    UnknownCertificate {
        /// Chain hash
        chain: ChainHash,
        /// Missing certificate
        cert: CertHash,
    },

    /// A path edge has an endpoint that is not a graph node
    #[error("path edge {issuer} -> {subject} of candidate {candidate} cannot be resolved")]
    UnresolvedPathEdge {
        /// Candidate the edge belongs to
        candidate: CandidateNumber,
        /// Issuer end
        issuer: CertHash,
        /// Subject end
        subject: CertHash,
    },

    /// Candidate numbers of a chain have a gap
    #[error("candidates of chain {chain} are not dense: expected {expected}, found {found}")]
    SparseCandidates {
        /// Chain hash
        chain: ChainHash,
        /// Candidate number expected at this index
        expected: CandidateNumber,
        /// Candidate number actually present
        found: CandidateNumber,
    },
}

/// Deduplicated certificate graph for one chain hash.
///
/// Nodes are sorted by hash and edges by `(issuer, subject)`, so equal
/// inputs always produce equal graphs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Graph {
    /// Chain the graph was assembled for
    pub chain_hash: ChainHash,
    /// Selected candidate, if any
    pub candidate: Option<CandidateNumber>,
    /// Certificates
    pub nodes: Vec<Node>,
    /// Issuance edges
    pub edges: Vec<Edge>,
    /// Inconsistencies skipped while assembling
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<Inconsistency>,
}

impl Graph {
    /// Node by certificate hash.
    #[must_use]
    pub fn node(&self, hash: &str) -> Option<&Node> {
        self.nodes
            .binary_search_by(|n| n.hash.as_str().cmp(hash))
            .ok()
            .map(|idx| &self.nodes[idx])
    }

    /// Whether `hash` is a node.
    #[must_use]
    pub fn contains(&self, hash: &str) -> bool {
        self.node(hash).is_some()
    }

    /// Edge by endpoints.
    #[must_use]
    pub fn edge(&self, issuer: &str, subject: &str) -> Option<&Edge> {
        self.edges
            .binary_search_by(|e| (e.issuer.as_str(), e.subject.as_str()).cmp(&(issuer, subject)))
            .ok()
            .map(|idx| &self.edges[idx])
    }

    /// Node hashes, sorted.
    pub fn node_hashes(&self) -> impl Iterator<Item = &str> {
        self.nodes.iter().map(|n| n.hash.as_str())
    }

    /// Nodes carrying `tag`.
    pub fn tagged(&self, tag: Tag) -> impl Iterator<Item = &Node> {
        self.nodes.iter().filter(move |n| n.has(tag))
    }
}
