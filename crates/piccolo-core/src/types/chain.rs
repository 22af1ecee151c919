//! Sent chains and path-built candidate chains.

use serde::{Deserialize, Serialize};

use super::CertHash;

/// Identifier of one observed "as sent" certificate sequence.
pub type ChainHash = String;

/// Dense, zero-based index of a built candidate for one chain hash.
pub type CandidateNumber = u32;

/// Certificates in the order the server transmitted them. Position 0 is the leaf.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentChain {
    /// Chain identifier
    pub chain_hash: ChainHash,
    /// Certificate hashes in message order
    pub certs: Vec<CertHash>,
}

impl SentChain {
    /// Position of `cert` in the message, if it was sent.
    #[must_use]
    pub fn position_of(&self, cert: &str) -> Option<usize> {
        self.certs.iter().position(|c| c == cert)
    }
}

/// One certificate of a built candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuiltLink {
    /// Certificate hash
    pub cert_hash: CertHash,
    /// Position in the original message; `None` when the builder pulled it
    /// from elsewhere (e.g. a trust store)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position_in_msg: Option<u32>,
    /// Position in the validation path, 1 = leaf, increasing toward the root
    pub position_in_chain: u32,
}

/// One externally computed validation path for a chain hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuiltChain {
    /// Chain identifier
    pub chain_hash: ChainHash,
    /// Candidate number
    pub candidate: CandidateNumber,
    /// Number of certificates in the path
    pub chain_length: u32,
    /// Path reaches a trust anchor
    pub complete: bool,
    /// Message order matched path order
    pub ordered: bool,
    /// How many certificates were transitively valid
    #[serde(default)]
    pub transitively_valid_count: u32,
    /// Intersection of the path's validity intervals (epoch seconds)
    #[serde(default)]
    pub not_before: i64,
    /// Intersection of the path's validity intervals (epoch seconds)
    #[serde(default)]
    pub not_after: i64,
    /// Certificates of the path, in any order
    pub links: Vec<BuiltLink>,
}

impl BuiltChain {
    /// Links sorted by position in the validation path, leaf first.
    #[must_use]
    pub fn path(&self) -> Vec<&BuiltLink> {
        let mut path: Vec<&BuiltLink> = self.links.iter().collect();
        path.sort_by_key(|l| l.position_in_chain);
        path
    }

    /// `(issuer, subject)` pairs along the validation path, leaf end first.
    #[must_use]
    pub fn path_edges(&self) -> Vec<(&str, &str)> {
        self.path()
            .windows(2)
            .map(|w| (w[1].cert_hash.as_str(), w[0].cert_hash.as_str()))
            .collect()
    }

    /// Whether `timestamp` falls inside the path's validity interval.
    #[must_use]
    pub const fn valid_at(&self, timestamp: i64) -> bool {
        self.not_before <= timestamp && timestamp <= self.not_after
    }
}

/// A sent certificate that a candidate path does not use.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnusedCert {
    /// Chain identifier
    pub chain_hash: ChainHash,
    /// Candidate the certificate is unused in
    pub candidate: CandidateNumber,
    /// Certificate hash
    pub cert_hash: CertHash,
    /// Position in the original message
    pub position_in_msg: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn link(cert: &str, msg: Option<u32>, chain: u32) -> BuiltLink {
        BuiltLink {
            cert_hash: cert.into(),
            position_in_msg: msg,
            position_in_chain: chain,
        }
    }

    #[test]
    fn path_edges_follow_chain_position_not_message_order() {
        let chain = BuiltChain {
            chain_hash: "abc".into(),
            candidate: 0,
            chain_length: 3,
            complete: true,
            ordered: false,
            transitively_valid_count: 3,
            not_before: 0,
            not_after: 10,
            links: vec![
                link("root", None, 3),
                link("leaf", Some(0), 1),
                link("inter", Some(2), 2),
            ],
        };

        assert_eq!(
            chain.path_edges(),
            vec![("inter", "leaf"), ("root", "inter")]
        );
    }

    #[test]
    fn single_link_path_has_no_edges() {
        let chain = BuiltChain {
            chain_hash: "abc".into(),
            candidate: 0,
            chain_length: 1,
            complete: false,
            ordered: true,
            transitively_valid_count: 0,
            not_before: 0,
            not_after: 0,
            links: vec![link("leaf", Some(0), 1)],
        };
        assert!(chain.path_edges().is_empty());
    }
}
