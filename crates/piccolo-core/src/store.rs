//! Read-only query surface over the relational fact store.
//!
//! Graph assembly calls [`FactStore::direct_issuers`] once per node, so
//! adapters should back it with an index on the subject hash.

use crate::types::{
    Answer, BuiltChain, CandidateNumber, CertHash, CertName, Certificate, ChainHash, DirectLink,
    Grade, SentChain, TransitiveLink, UnusedCert,
};
use crate::Result;

/// Lookups the chain analysis layer needs from a fact store.
///
/// Implementations never expose mutation; every method is a pure read
/// against one snapshot of facts.
pub trait FactStore: Send + Sync {
    /// Certificate by exact hash.
    fn certificate(&self, hash: &str) -> Result<Option<Certificate>>;

    /// Display name for a distinguished-name hash.
    fn name(&self, name_hash: &str) -> Result<Option<String>>;

    /// Sent chain by chain hash.
    fn sent_chain(&self, chain_hash: &str) -> Result<Option<SentChain>>;

    /// Every built candidate for a chain hash, ordered by candidate number.
    fn built_chains(&self, chain_hash: &str) -> Result<Vec<BuiltChain>>;

    /// One built candidate.
    fn built_chain(
        &self,
        chain_hash: &str,
        candidate: CandidateNumber,
    ) -> Result<Option<BuiltChain>> {
        Ok(self
            .built_chains(chain_hash)?
            .into_iter()
            .find(|c| c.candidate == candidate))
    }

    /// Sent certificates a candidate path leaves out.
    fn unused_certs(
        &self,
        chain_hash: &str,
        candidate: CandidateNumber,
    ) -> Result<Vec<UnusedCert>>;

    /// Names `cert` is valid for.
    fn cert_names(&self, cert: &str) -> Result<Vec<CertName>>;

    /// Certificates valid for `name`, optionally only through one name type. Sorted.
    fn certs_by_name(&self, name: &str, name_type: Option<&str>) -> Result<Vec<CertHash>>;

    /// Certificates whose subject name hash is `subject_hash`, sorted.
    fn certs_by_subject_hash(&self, subject_hash: &str) -> Result<Vec<CertHash>>;

    /// Certificates whose subject display name is exactly `subject`, sorted.
    fn certs_by_subject(&self, subject: &str) -> Result<Vec<CertHash>>;

    /// Built candidates whose path contains `cert`, by chain hash then candidate.
    fn built_chains_containing(&self, cert: &str) -> Result<Vec<BuiltChain>>;

    /// Direct links whose subject is `subject`.
    fn direct_issuers(&self, subject: &str) -> Result<Vec<DirectLink>>;

    /// Direct links whose issuer is `issuer`.
    fn direct_subjects(&self, issuer: &str) -> Result<Vec<DirectLink>>;

    /// Transitive links whose subject is `subject`, ascending by distance.
    fn transitive_issuers(&self, subject: &str) -> Result<Vec<TransitiveLink>>;

    /// Transitive links whose issuer is `issuer`, ascending by distance.
    fn transitive_subjects(&self, issuer: &str) -> Result<Vec<TransitiveLink>>;

    /// Whether `cert` is an anchor in `trust_context`.
    fn is_trust_anchor(&self, trust_context: &str, cert: &str) -> Result<bool>;

    /// Grades of every candidate of `chain_hash` under `trust_context`.
    fn grades(&self, chain_hash: &str, trust_context: &str) -> Result<Vec<Grade>>;

    /// Answers that carried `chain_hash`.
    fn answers_for_chain(&self, chain_hash: &str) -> Result<Vec<Answer>>;

    /// Every answer received from `ip`, in time order.
    fn answers_from_ip(&self, ip: &str) -> Result<Vec<Answer>>;

    /// Answers received from `ip` during `campaign`.
    fn answers_in_campaign(&self, campaign: u64, ip: &str) -> Result<Vec<Answer>> {
        Ok(self
            .answers_from_ip(ip)?
            .into_iter()
            .filter(|a| a.campaign == campaign)
            .collect())
    }

    /// Sent chains that contain `cert`.
    fn chains_containing(&self, cert: &str) -> Result<Vec<SentChain>>;

    /// Chain hashes (sent or built) starting with `prefix`, sorted.
    fn chain_hashes_with_prefix(&self, prefix: &str) -> Result<Vec<ChainHash>>;

    /// Certificate hashes starting with `prefix`, sorted.
    fn cert_hashes_with_prefix(&self, prefix: &str) -> Result<Vec<CertHash>>;

    /// Subject display name of a certificate, if both are known.
    fn subject_name(&self, cert: &str) -> Result<Option<String>> {
        match self.certificate(cert)? {
            Some(c) => self.name(&c.subject_hash),
            None => Ok(None),
        }
    }
}
