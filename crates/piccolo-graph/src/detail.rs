//! Certificate and chain detail views.

use piccolo_core::{
    format_campaign, format_timestamp, Answer, CandidateNumber, CertHash, CertName, Certificate,
    ChainError, ChainHash, FactStore, Result, TrustContext,
};
use serde::{Deserialize, Serialize};

use crate::expansion::Expander;
use crate::grading::{Alternate, ChainGrader};

/// A certificate with its subject name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedCert {
    pub hash: CertHash,
    pub name: Option<String>,
}

/// A related certificate with its subject name and hop distance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedRelative {
    pub hash: CertHash,
    pub name: Option<String>,
    pub distance: u32,
}

/// One observed answer, judged against a validity interval.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sighting {
    /// Campaign in display form
    pub campaign: String,
    pub ip: String,
    pub name: String,
    pub chain_hash: ChainHash,
    /// Position of the certificate in the sent chain
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<usize>,
    /// Observation time in display form
    pub timestamp: String,
    /// Answer type and protocol summary
    pub description: String,
    /// Whether the observation lies within the validity interval
    pub valid_at_timestamp: bool,
}

impl Sighting {
    fn new(answer: &Answer, chain_hash: &str, position: Option<usize>, valid: bool) -> Self {
        Self {
            campaign: answer.campaign_str(),
            ip: answer.ip.clone(),
            name: answer.name.clone(),
            chain_hash: chain_hash.to_string(),
            position,
            timestamp: answer.timestamp_str(),
            description: answer.describe(),
            valid_at_timestamp: valid,
        }
    }
}

/// Everything known about one certificate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertificateDetail {
    pub certificate: Certificate,
    pub subject: Option<String>,
    pub issuer: Option<String>,
    /// Key length in bits, 0 for non-RSA keys
    pub key_len: usize,
    pub not_before: String,
    pub not_after: String,
    /// Direct issuers
    pub issuers: Vec<NamedCert>,
    /// Directly issued certificates
    pub issued: Vec<NamedCert>,
    pub transitive_issuers: Vec<NamedRelative>,
    pub transitive_issued: Vec<NamedRelative>,
    /// Names the certificate is valid for
    pub names: Vec<CertName>,
    /// Names of the directly issued certificates
    pub issued_names: Vec<CertName>,
    /// Names of every transitively issued certificate
    pub transitive_issued_names: Vec<CertName>,
    /// Answers whose sent chain contains the certificate
    pub sightings: Vec<Sighting>,
}

/// One answer received from a server, in display form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerDetail {
    pub campaign: String,
    pub ip: String,
    pub name: String,
    pub port: u16,
    pub timestamp: String,
    /// Sent chain, absent for answers without certificates
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chain_hash: Option<ChainHash>,
    /// Answer type and protocol summary
    pub description: String,
    pub answer: Answer,
}

impl From<Answer> for AnswerDetail {
    fn from(answer: Answer) -> Self {
        Self {
            campaign: answer.campaign_str(),
            ip: answer.ip.clone(),
            name: answer.name.clone(),
            port: answer.port,
            timestamp: answer.timestamp_str(),
            chain_hash: answer.chain_hash.clone(),
            description: answer.describe(),
            answer,
        }
    }
}

/// A certificate on a candidate's validation path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathCert {
    pub cert_hash: CertHash,
    pub subject: Option<String>,
    /// Position in the sent message, `None` if the path builder supplied it
    pub position_in_msg: Option<u32>,
    pub position_in_chain: u32,
}

/// A sent certificate the candidate path leaves out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnusedEntry {
    pub cert_hash: CertHash,
    pub subject: Option<String>,
    pub position_in_msg: u32,
}

/// One built candidate of a chain hash, with its evidence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainDetail {
    pub chain_hash: ChainHash,
    pub candidate: CandidateNumber,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trust_context: Option<TrustContext>,
    /// Grade under `trust_context`, `None` when ungraded
    pub grade: Option<i64>,
    pub complete: bool,
    pub ordered: bool,
    pub chain_length: u32,
    pub transitively_valid_count: u32,
    pub not_before: String,
    pub not_after: String,
    /// Path certificates, leaf first
    pub certs: Vec<PathCert>,
    pub unused: Vec<UnusedEntry>,
    pub sightings: Vec<Sighting>,
    /// Other candidates, best first
    pub alternates: Vec<Alternate>,
}

fn named<S: FactStore + ?Sized>(store: &S, hashes: Vec<CertHash>) -> Result<Vec<NamedCert>> {
    hashes
        .into_iter()
        .map(|hash| {
            let name = store.subject_name(&hash)?;
            Ok(NamedCert { hash, name })
        })
        .collect()
}

fn names_of<'h, S, I>(store: &S, certs: I) -> Result<Vec<CertName>>
where
    S: FactStore + ?Sized,
    I: IntoIterator<Item = &'h str>,
{
    let mut names = Vec::new();
    for cert in certs {
        names.extend(store.cert_names(cert)?);
    }
    Ok(names)
}

fn named_relatives<S: FactStore + ?Sized>(
    store: &S,
    relatives: Vec<crate::expansion::Relative>,
) -> Result<Vec<NamedRelative>> {
    relatives
        .into_iter()
        .map(|r| {
            let name = store.subject_name(&r.cert)?;
            Ok(NamedRelative {
                hash: r.cert,
                name,
                distance: r.distance,
            })
        })
        .collect()
}

/// Detail view of the certificate `hash`.
pub fn certificate_detail<S: FactStore + ?Sized>(
    store: &S,
    expander: &Expander<'_, S>,
    hash: &str,
) -> Result<CertificateDetail> {
    let certificate = store
        .certificate(hash)?
        .ok_or_else(|| ChainError::not_found(format!("certificate {hash}")))?;

    let issuers = store
        .direct_issuers(hash)?
        .into_iter()
        .map(|l| l.issuer_hash)
        .collect();
    let issued: Vec<CertHash> = store
        .direct_subjects(hash)?
        .into_iter()
        .map(|l| l.subject_hash)
        .collect();
    let descendants = expander.descendants(hash)?;
    let issued_names = names_of(store, issued.iter().map(String::as_str))?;
    let transitive_issued_names = names_of(store, descendants.iter().map(|r| r.cert.as_str()))?;

    let mut sightings = Vec::new();
    for chain in store.chains_containing(hash)? {
        let position = chain.position_of(hash);
        for answer in store.answers_for_chain(&chain.chain_hash)? {
            let valid = certificate.valid_at(answer.timestamp);
            sightings.push(Sighting::new(&answer, &chain.chain_hash, position, valid));
        }
    }

    Ok(CertificateDetail {
        subject: store.name(&certificate.subject_hash)?,
        issuer: store.name(&certificate.issuer_hash)?,
        key_len: certificate.key_len(),
        not_before: format_timestamp(certificate.not_before),
        not_after: format_timestamp(certificate.not_after),
        issuers: named(store, issuers)?,
        issued: named(store, issued)?,
        transitive_issuers: named_relatives(store, expander.ancestors(hash)?)?,
        transitive_issued: named_relatives(store, descendants)?,
        names: store.cert_names(hash)?,
        issued_names,
        transitive_issued_names,
        sightings,
        certificate,
    })
}

/// Answers received from `ip` during `campaign`.
///
/// Fails with `NotFound` when the server never answered in that campaign.
pub fn answer_detail<S: FactStore + ?Sized>(
    store: &S,
    campaign: u64,
    ip: &str,
) -> Result<Vec<AnswerDetail>> {
    let answers = store.answers_in_campaign(campaign, ip)?;
    if answers.is_empty() {
        return Err(ChainError::not_found(format!(
            "answer from {ip} in campaign {}",
            format_campaign(campaign)
        )));
    }
    Ok(answers.into_iter().map(AnswerDetail::from).collect())
}

/// Detail view of one built candidate of `chain_hash`.
///
/// Alternates are graded when `trust_context` is given, otherwise listed
/// by candidate number.
pub fn chain_detail<S: FactStore + ?Sized>(
    store: &S,
    grader: &ChainGrader<'_, S>,
    chain_hash: &str,
    candidate: CandidateNumber,
    trust_context: Option<&str>,
) -> Result<ChainDetail> {
    let chain = store.built_chain(chain_hash, candidate)?.ok_or_else(|| {
        ChainError::not_found(format!("candidate {candidate} of chain {chain_hash}"))
    })?;

    let mut certs = Vec::with_capacity(chain.links.len());
    for link in chain.path() {
        certs.push(PathCert {
            cert_hash: link.cert_hash.clone(),
            subject: store.subject_name(&link.cert_hash)?,
            position_in_msg: link.position_in_msg,
            position_in_chain: link.position_in_chain,
        });
    }

    let mut unused = Vec::new();
    for u in store.unused_certs(chain_hash, candidate)? {
        unused.push(UnusedEntry {
            subject: store.subject_name(&u.cert_hash)?,
            cert_hash: u.cert_hash,
            position_in_msg: u.position_in_msg,
        });
    }

    let sightings = store
        .answers_for_chain(chain_hash)?
        .iter()
        .map(|a| Sighting::new(a, chain_hash, None, chain.valid_at(a.timestamp)))
        .collect();

    let (grade, alternates) = match trust_context {
        Some(context) => (
            grader.grade(chain_hash, candidate, context)?,
            grader.alternates(chain_hash, candidate, context)?,
        ),
        None => (None, grader.ungraded_alternates(chain_hash, candidate)?),
    };

    Ok(ChainDetail {
        chain_hash: chain.chain_hash.clone(),
        candidate,
        trust_context: trust_context.map(str::to_string),
        grade,
        complete: chain.complete,
        ordered: chain.ordered,
        chain_length: chain.chain_length,
        transitively_valid_count: chain.transitively_valid_count,
        not_before: format_timestamp(chain.not_before),
        not_after: format_timestamp(chain.not_after),
        certs,
        unused,
        sightings,
        alternates,
    })
}
