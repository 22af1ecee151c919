//! Issuance relationships between certificates.

use serde::{Deserialize, Serialize};

use super::CertHash;

/// "subject was directly signed by issuer" in at least one observation.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DirectLink {
    /// Issuing certificate
    pub issuer_hash: CertHash,
    /// Issued certificate
    pub subject_hash: CertHash,
}

/// Multi-hop issuance relationship from the precomputed transitive closure.
///
/// Every [`DirectLink`] has a matching entry at distance 1.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransitiveLink {
    /// Ancestor certificate
    pub issuer_hash: CertHash,
    /// Descendant certificate
    pub subject_hash: CertHash,
    /// Number of issuance edges between the two (>= 1)
    pub distance: u32,
}
