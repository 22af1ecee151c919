//! Finding certificates and chains by name, subject or server address.
//!
//! Every finder fails with `NotFound` on an empty result, so callers can
//! treat "nothing matched" the same way as an unknown hash.

use piccolo_core::{
    format_timestamp, BuiltChain, CandidateNumber, CertHash, ChainError, ChainHash, FactStore,
    Result,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use tracing::{debug, warn};

/// How to look certificates up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CertQuery {
    /// Exact subject display name
    Subject(String),
    /// Subject name hash
    SubjectHash(String),
    /// A name the certificate is valid for, optionally of one type only
    Name {
        name: String,
        name_type: Option<String>,
    },
}

impl fmt::Display for CertQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Subject(subject) => write!(f, "subject={subject}"),
            Self::SubjectHash(hash) => write!(f, "subject_hash={hash}"),
            Self::Name {
                name,
                name_type: Some(t),
            } => write!(f, "{t}:{name}"),
            Self::Name {
                name,
                name_type: None,
            } => write!(f, "{name}"),
        }
    }
}

/// How to look built chains up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChainQuery {
    /// Chains sent by a server address
    Ip(String),
    /// Chains whose path holds a certificate with this subject display name
    SubjectInChain(String),
}

impl fmt::Display for ChainQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ip(ip) => write!(f, "ip={ip}"),
            Self::SubjectInChain(subject) => write!(f, "subject in chain={subject}"),
        }
    }
}

/// One line of a certificate listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertSummary {
    pub hash: CertHash,
    pub subject: Option<String>,
    pub issuer: Option<String>,
    pub key_type: String,
    /// Key length in bits, 0 for non-RSA keys
    pub key_len: usize,
    pub not_before: String,
    pub not_after: String,
}

/// One line of a chain listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainSummary {
    pub chain_hash: ChainHash,
    pub candidate: CandidateNumber,
    /// Subject of the certificate sent first
    pub subject: Option<String>,
    pub chain_length: u32,
    pub complete: bool,
    pub ordered: bool,
    pub transitively_valid_count: u32,
    pub not_before: String,
    pub not_after: String,
}

/// Certificates matching `query`, by hash.
pub fn find_certs<S: FactStore + ?Sized>(
    store: &S,
    query: &CertQuery,
) -> Result<Vec<CertSummary>> {
    let hashes = match query {
        CertQuery::Subject(subject) => store.certs_by_subject(subject)?,
        CertQuery::SubjectHash(hash) => store.certs_by_subject_hash(hash)?,
        CertQuery::Name { name, name_type } => store.certs_by_name(name, name_type.as_deref())?,
    };

    let mut found = Vec::with_capacity(hashes.len());
    for hash in hashes {
        let Some(cert) = store.certificate(&hash)? else {
            warn!(cert = %hash, "name refers to unknown certificate, skipping");
            continue;
        };
        found.push(CertSummary {
            subject: store.name(&cert.subject_hash)?,
            issuer: store.name(&cert.issuer_hash)?,
            key_len: cert.key_len(),
            not_before: format_timestamp(cert.not_before),
            not_after: format_timestamp(cert.not_after),
            key_type: cert.key_type,
            hash: cert.hash,
        });
    }

    if found.is_empty() {
        return Err(ChainError::not_found(format!("certificates with {query}")));
    }
    debug!(%query, matches = found.len(), "certificate lookup");
    Ok(found)
}

/// Candidate `candidate` of every chain matching `query`, by chain hash.
///
/// Chains without that candidate are left out.
pub fn find_chains<S: FactStore + ?Sized>(
    store: &S,
    query: &ChainQuery,
    candidate: CandidateNumber,
) -> Result<Vec<ChainSummary>> {
    let mut chains: BTreeMap<ChainHash, BuiltChain> = BTreeMap::new();
    match query {
        ChainQuery::Ip(ip) => {
            let hashes: BTreeSet<ChainHash> = store
                .answers_from_ip(ip)?
                .into_iter()
                .filter_map(|a| a.chain_hash)
                .collect();
            for hash in hashes {
                if let Some(chain) = store.built_chain(&hash, candidate)? {
                    chains.insert(hash, chain);
                }
            }
        }
        ChainQuery::SubjectInChain(subject) => {
            for cert in store.certs_by_subject(subject)? {
                for chain in store.built_chains_containing(&cert)? {
                    if chain.candidate == candidate {
                        chains.insert(chain.chain_hash.clone(), chain);
                    }
                }
            }
        }
    }

    if chains.is_empty() {
        return Err(ChainError::not_found(format!(
            "candidate {candidate} of chains with {query}"
        )));
    }
    debug!(%query, candidate, matches = chains.len(), "chain lookup");
    chains
        .into_values()
        .map(|chain| summarize(store, chain))
        .collect()
}

fn summarize<S: FactStore + ?Sized>(store: &S, chain: BuiltChain) -> Result<ChainSummary> {
    let first_sent = chain
        .links
        .iter()
        .find(|l| l.position_in_msg == Some(0))
        .or_else(|| chain.path().first().copied());
    let subject = match first_sent {
        Some(link) => store.subject_name(&link.cert_hash)?,
        None => None,
    };
    Ok(ChainSummary {
        subject,
        candidate: chain.candidate,
        chain_length: chain.chain_length,
        complete: chain.complete,
        ordered: chain.ordered,
        transitively_valid_count: chain.transitively_valid_count,
        not_before: format_timestamp(chain.not_before),
        not_after: format_timestamp(chain.not_after),
        chain_hash: chain.chain_hash,
    })
}
