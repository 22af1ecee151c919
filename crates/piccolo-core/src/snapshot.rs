//! Serializable dump of every fact family.

use serde::{Deserialize, Serialize};

use crate::types::{
    Answer, BuiltChain, CertName, Certificate, DirectLink, DistinguishedName, Grade, SentChain,
    TransitiveLink, TrustAnchorSet, UnusedCert,
};
use crate::Result;

/// A point-in-time export of the fact store.
///
/// Every field defaults to empty so partial exports load.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FactSnapshot {
    /// Observed certificates
    #[serde(default)]
    pub certificates: Vec<Certificate>,
    /// Distinguished names
    #[serde(default)]
    pub names: Vec<DistinguishedName>,
    /// Names each certificate is valid for
    #[serde(default)]
    pub cert_names: Vec<CertName>,
    /// Direct issuance links
    #[serde(default)]
    pub links: Vec<DirectLink>,
    /// Precomputed transitive closure
    #[serde(default)]
    pub transitive_links: Vec<TransitiveLink>,
    /// Chains as sent by servers
    #[serde(default)]
    pub sent_chains: Vec<SentChain>,
    /// Path-built candidates
    #[serde(default)]
    pub built_chains: Vec<BuiltChain>,
    /// Sent certificates each candidate leaves out
    #[serde(default)]
    pub unused_certs: Vec<UnusedCert>,
    /// Trust anchors per context
    #[serde(default)]
    pub trust_anchors: Vec<TrustAnchorSet>,
    /// Candidate grades per context
    #[serde(default)]
    pub grades: Vec<Grade>,
    /// Observed answers
    #[serde(default)]
    pub answers: Vec<Answer>,
}

impl FactSnapshot {
    /// Parse a snapshot from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Parse a snapshot from JSON bytes.
    pub fn from_json_slice(bytes: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }

    /// Serialize to pretty JSON.
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_families_default_to_empty() {
        let snapshot = FactSnapshot::from_json(
            r#"{"sent_chains": [{"chain_hash": "abc", "certs": ["aa", "bb"]}]}"#,
        )
        .unwrap();
        assert_eq!(snapshot.sent_chains.len(), 1);
        assert!(snapshot.certificates.is_empty());
        assert!(snapshot.grades.is_empty());
        assert!(snapshot.cert_names.is_empty());
    }

    #[test]
    fn malformed_json_is_an_error() {
        let err = FactSnapshot::from_json("{not json").unwrap_err();
        assert!(matches!(err, crate::ChainError::Json(_)));
    }
}
