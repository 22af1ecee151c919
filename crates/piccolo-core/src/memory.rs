//! Indexed in-memory fact store built from a [`FactSnapshot`].

use std::collections::{BTreeSet, HashMap, HashSet};
use tracing::{debug, warn};

use crate::snapshot::FactSnapshot;
use crate::store::FactStore;
use crate::types::{
    Answer, BuiltChain, CandidateNumber, CertHash, CertName, Certificate, ChainHash, DirectLink,
    Grade, NameHash, SentChain, TransitiveLink, UnusedCert,
};
use crate::Result;

/// Fact store holding one snapshot in hash indexes.
///
/// Links are deduplicated on load, and every direct link is guaranteed a
/// distance-1 entry in the transitive index.
#[derive(Debug, Default)]
pub struct MemoryStore {
    certificates: HashMap<CertHash, Certificate>,
    names: HashMap<NameHash, String>,
    name_hashes: HashMap<String, BTreeSet<NameHash>>,
    certs_by_subject_hash: HashMap<NameHash, BTreeSet<CertHash>>,
    cert_names: HashMap<CertHash, Vec<CertName>>,
    names_by_value: HashMap<String, Vec<CertName>>,
    sent_chains: HashMap<ChainHash, SentChain>,
    built_chains: HashMap<ChainHash, Vec<BuiltChain>>,
    unused_certs: HashMap<(ChainHash, CandidateNumber), Vec<UnusedCert>>,
    links_by_subject: HashMap<CertHash, Vec<DirectLink>>,
    links_by_issuer: HashMap<CertHash, Vec<DirectLink>>,
    transitive_by_subject: HashMap<CertHash, Vec<TransitiveLink>>,
    transitive_by_issuer: HashMap<CertHash, Vec<TransitiveLink>>,
    anchors: HashMap<String, HashSet<CertHash>>,
    grades: HashMap<(ChainHash, String), Vec<Grade>>,
    answers: HashMap<ChainHash, Vec<Answer>>,
    answers_by_ip: HashMap<String, Vec<Answer>>,
    chains_by_cert: HashMap<CertHash, BTreeSet<ChainHash>>,
    built_by_cert: HashMap<CertHash, BTreeSet<(ChainHash, CandidateNumber)>>,
}

impl MemoryStore {
    /// Build the indexes for a snapshot.
    #[must_use]
    pub fn from_snapshot(snapshot: FactSnapshot) -> Self {
        let mut store = Self::default();

        for cert in snapshot.certificates {
            store
                .certs_by_subject_hash
                .entry(cert.subject_hash.clone())
                .or_default()
                .insert(cert.hash.clone());
            store.certificates.insert(cert.hash.clone(), cert);
        }
        for dn in snapshot.names {
            store
                .name_hashes
                .entry(dn.name.clone())
                .or_default()
                .insert(dn.hash.clone());
            store.names.insert(dn.hash, dn.name);
        }

        let cert_names: BTreeSet<CertName> = snapshot.cert_names.into_iter().collect();
        for name in cert_names {
            store
                .names_by_value
                .entry(name.name.clone())
                .or_default()
                .push(name.clone());
            store
                .cert_names
                .entry(name.cert_hash.clone())
                .or_default()
                .push(name);
        }

        let direct: BTreeSet<DirectLink> = snapshot.links.into_iter().collect();
        let mut transitive: HashMap<(CertHash, CertHash), u32> = HashMap::new();
        for link in snapshot.transitive_links {
            if link.distance == 0 {
                warn!(
                    issuer = %link.issuer_hash,
                    subject = %link.subject_hash,
                    "dropping zero-distance transitive link"
                );
                continue;
            }
            let entry = transitive
                .entry((link.issuer_hash, link.subject_hash))
                .or_insert(link.distance);
            *entry = (*entry).min(link.distance);
        }
        for link in &direct {
            let key = (link.issuer_hash.clone(), link.subject_hash.clone());
            if transitive.get(&key) != Some(&1) {
                debug!(
                    issuer = %link.issuer_hash,
                    subject = %link.subject_hash,
                    "adding distance-1 closure entry for direct link"
                );
                transitive.insert(key, 1);
            }
        }
        for link in direct {
            store
                .links_by_subject
                .entry(link.subject_hash.clone())
                .or_default()
                .push(link.clone());
            store
                .links_by_issuer
                .entry(link.issuer_hash.clone())
                .or_default()
                .push(link);
        }
        for ((issuer_hash, subject_hash), distance) in transitive {
            let link = TransitiveLink {
                issuer_hash,
                subject_hash,
                distance,
            };
            store
                .transitive_by_subject
                .entry(link.subject_hash.clone())
                .or_default()
                .push(link.clone());
            store
                .transitive_by_issuer
                .entry(link.issuer_hash.clone())
                .or_default()
                .push(link);
        }
        for links in store.transitive_by_subject.values_mut() {
            links.sort_by(|a, b| {
                a.distance
                    .cmp(&b.distance)
                    .then_with(|| a.issuer_hash.cmp(&b.issuer_hash))
            });
        }
        for links in store.transitive_by_issuer.values_mut() {
            links.sort_by(|a, b| {
                a.distance
                    .cmp(&b.distance)
                    .then_with(|| a.subject_hash.cmp(&b.subject_hash))
            });
        }

        for chain in snapshot.sent_chains {
            for cert in &chain.certs {
                store
                    .chains_by_cert
                    .entry(cert.clone())
                    .or_default()
                    .insert(chain.chain_hash.clone());
            }
            store.sent_chains.insert(chain.chain_hash.clone(), chain);
        }

        for chain in snapshot.built_chains {
            let candidates = store
                .built_chains
                .entry(chain.chain_hash.clone())
                .or_default();
            if candidates.iter().any(|c| c.candidate == chain.candidate) {
                warn!(
                    chain = %chain.chain_hash,
                    candidate = chain.candidate,
                    "duplicate built chain, keeping first"
                );
                continue;
            }
            candidates.push(chain);
        }
        for candidates in store.built_chains.values_mut() {
            candidates.sort_by_key(|c| c.candidate);
            for chain in candidates.iter() {
                for link in &chain.links {
                    store
                        .built_by_cert
                        .entry(link.cert_hash.clone())
                        .or_default()
                        .insert((chain.chain_hash.clone(), chain.candidate));
                }
            }
        }

        for unused in snapshot.unused_certs {
            store
                .unused_certs
                .entry((unused.chain_hash.clone(), unused.candidate))
                .or_default()
                .push(unused);
        }
        for unused in store.unused_certs.values_mut() {
            unused.sort_by_key(|u| u.position_in_msg);
        }

        for set in snapshot.trust_anchors {
            store
                .anchors
                .entry(set.context)
                .or_default()
                .extend(set.certs);
        }

        for grade in snapshot.grades {
            store
                .grades
                .entry((grade.chain_hash.clone(), grade.trust_context.clone()))
                .or_default()
                .push(grade);
        }

        for answer in snapshot.answers {
            if let Some(chain) = &answer.chain_hash {
                store
                    .answers
                    .entry(chain.clone())
                    .or_default()
                    .push(answer.clone());
            }
            store
                .answers_by_ip
                .entry(answer.ip.clone())
                .or_default()
                .push(answer);
        }
        for answers in store.answers.values_mut() {
            answers.sort_by(|a, b| {
                a.timestamp
                    .cmp(&b.timestamp)
                    .then_with(|| a.ip.cmp(&b.ip))
            });
        }
        for answers in store.answers_by_ip.values_mut() {
            answers.sort_by(|a, b| {
                a.timestamp
                    .cmp(&b.timestamp)
                    .then_with(|| a.campaign.cmp(&b.campaign))
            });
        }

        debug!(
            certificates = store.certificates.len(),
            sent_chains = store.sent_chains.len(),
            built_chains = store.built_chains.len(),
            "fact store loaded"
        );
        store
    }

    /// Number of certificates held.
    #[must_use]
    pub fn certificate_count(&self) -> usize {
        self.certificates.len()
    }
}

fn with_prefix<'a>(keys: impl Iterator<Item = &'a String>, prefix: &str) -> Vec<String> {
    let found: BTreeSet<&String> = keys.filter(|k| k.starts_with(prefix)).collect();
    found.into_iter().cloned().collect()
}

impl FactStore for MemoryStore {
    fn certificate(&self, hash: &str) -> Result<Option<Certificate>> {
        Ok(self.certificates.get(hash).cloned())
    }

    fn name(&self, name_hash: &str) -> Result<Option<String>> {
        Ok(self.names.get(name_hash).cloned())
    }

    fn sent_chain(&self, chain_hash: &str) -> Result<Option<SentChain>> {
        Ok(self.sent_chains.get(chain_hash).cloned())
    }

    fn built_chains(&self, chain_hash: &str) -> Result<Vec<BuiltChain>> {
        Ok(self.built_chains.get(chain_hash).cloned().unwrap_or_default())
    }

    fn built_chain(
        &self,
        chain_hash: &str,
        candidate: CandidateNumber,
    ) -> Result<Option<BuiltChain>> {
        Ok(self.built_chains.get(chain_hash).and_then(|candidates| {
            candidates
                .binary_search_by_key(&candidate, |c| c.candidate)
                .ok()
                .map(|idx| candidates[idx].clone())
        }))
    }

    fn unused_certs(
        &self,
        chain_hash: &str,
        candidate: CandidateNumber,
    ) -> Result<Vec<UnusedCert>> {
        Ok(self
            .unused_certs
            .get(&(chain_hash.to_string(), candidate))
            .cloned()
            .unwrap_or_default())
    }

    fn cert_names(&self, cert: &str) -> Result<Vec<CertName>> {
        Ok(self.cert_names.get(cert).cloned().unwrap_or_default())
    }

    fn certs_by_name(&self, name: &str, name_type: Option<&str>) -> Result<Vec<CertHash>> {
        let found: BTreeSet<&CertHash> = self
            .names_by_value
            .get(name)
            .into_iter()
            .flatten()
            .filter(|n| name_type.map_or(true, |t| n.name_type == t))
            .map(|n| &n.cert_hash)
            .collect();
        Ok(found.into_iter().cloned().collect())
    }

    fn certs_by_subject_hash(&self, subject_hash: &str) -> Result<Vec<CertHash>> {
        Ok(self
            .certs_by_subject_hash
            .get(subject_hash)
            .map(|certs| certs.iter().cloned().collect())
            .unwrap_or_default())
    }

    fn certs_by_subject(&self, subject: &str) -> Result<Vec<CertHash>> {
        let found: BTreeSet<&CertHash> = self
            .name_hashes
            .get(subject)
            .into_iter()
            .flatten()
            .filter_map(|hash| self.certs_by_subject_hash.get(hash))
            .flatten()
            .collect();
        Ok(found.into_iter().cloned().collect())
    }

    fn built_chains_containing(&self, cert: &str) -> Result<Vec<BuiltChain>> {
        let Some(keys) = self.built_by_cert.get(cert) else {
            return Ok(Vec::new());
        };
        let mut chains = Vec::with_capacity(keys.len());
        for (chain_hash, candidate) in keys {
            if let Some(chain) = self.built_chain(chain_hash, *candidate)? {
                chains.push(chain);
            }
        }
        Ok(chains)
    }

    fn direct_issuers(&self, subject: &str) -> Result<Vec<DirectLink>> {
        Ok(self.links_by_subject.get(subject).cloned().unwrap_or_default())
    }

    fn direct_subjects(&self, issuer: &str) -> Result<Vec<DirectLink>> {
        Ok(self.links_by_issuer.get(issuer).cloned().unwrap_or_default())
    }

    fn transitive_issuers(&self, subject: &str) -> Result<Vec<TransitiveLink>> {
        Ok(self
            .transitive_by_subject
            .get(subject)
            .cloned()
            .unwrap_or_default())
    }

    fn transitive_subjects(&self, issuer: &str) -> Result<Vec<TransitiveLink>> {
        Ok(self
            .transitive_by_issuer
            .get(issuer)
            .cloned()
            .unwrap_or_default())
    }

    fn is_trust_anchor(&self, trust_context: &str, cert: &str) -> Result<bool> {
        Ok(self
            .anchors
            .get(trust_context)
            .is_some_and(|set| set.contains(cert)))
    }

    fn grades(&self, chain_hash: &str, trust_context: &str) -> Result<Vec<Grade>> {
        Ok(self
            .grades
            .get(&(chain_hash.to_string(), trust_context.to_string()))
            .cloned()
            .unwrap_or_default())
    }

    fn answers_for_chain(&self, chain_hash: &str) -> Result<Vec<Answer>> {
        Ok(self.answers.get(chain_hash).cloned().unwrap_or_default())
    }

    fn answers_from_ip(&self, ip: &str) -> Result<Vec<Answer>> {
        Ok(self.answers_by_ip.get(ip).cloned().unwrap_or_default())
    }

    fn chains_containing(&self, cert: &str) -> Result<Vec<SentChain>> {
        Ok(self
            .chains_by_cert
            .get(cert)
            .map(|hashes| {
                hashes
                    .iter()
                    .filter_map(|h| self.sent_chains.get(h).cloned())
                    .collect()
            })
            .unwrap_or_default())
    }

    fn chain_hashes_with_prefix(&self, prefix: &str) -> Result<Vec<ChainHash>> {
        Ok(with_prefix(
            self.sent_chains.keys().chain(self.built_chains.keys()),
            prefix,
        ))
    }

    fn cert_hashes_with_prefix(&self, prefix: &str) -> Result<Vec<CertHash>> {
        Ok(with_prefix(self.certificates.keys(), prefix))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BuiltLink, DistinguishedName, TrustAnchorSet};

    fn link(issuer: &str, subject: &str) -> DirectLink {
        DirectLink {
            issuer_hash: issuer.into(),
            subject_hash: subject.into(),
        }
    }

    fn transitive(issuer: &str, subject: &str, distance: u32) -> TransitiveLink {
        TransitiveLink {
            issuer_hash: issuer.into(),
            subject_hash: subject.into(),
            distance,
        }
    }

    fn built(chain: &str, candidate: u32) -> BuiltChain {
        BuiltChain {
            chain_hash: chain.into(),
            candidate,
            chain_length: 1,
            complete: false,
            ordered: true,
            transitively_valid_count: 0,
            not_before: 0,
            not_after: 0,
            links: vec![BuiltLink {
                cert_hash: "leaf".into(),
                position_in_msg: Some(0),
                position_in_chain: 1,
            }],
        }
    }

    fn cert(hash: &str, subject_hash: &str) -> Certificate {
        Certificate {
            hash: hash.into(),
            version: 3,
            serial: "01".into(),
            issuer_hash: "dn-ca".into(),
            subject_hash: subject_hash.into(),
            not_before: 0,
            not_after: 10,
            key_type: "EC".into(),
            rsa_modulus: None,
            rsa_exponent: None,
            is_ca: false,
        }
    }

    fn cert_name(cert: &str, name_type: &str, name: &str) -> CertName {
        CertName {
            cert_hash: cert.into(),
            name_type: name_type.into(),
            name: name.into(),
        }
    }

    fn answer(campaign: u64, ip: &str, timestamp: i64, chain: Option<&str>) -> Answer {
        Answer {
            campaign,
            ip: ip.into(),
            name: "example.com".into(),
            port: 443,
            timestamp,
            chain_hash: chain.map(Into::into),
            answer_type: 21,
            version: 0x0303,
            ciphersuite: 47,
            alert_level: 0,
            alert_type: 0,
        }
    }

    #[test]
    fn duplicate_links_collapse() {
        let store = MemoryStore::from_snapshot(FactSnapshot {
            links: vec![link("ca", "leaf"), link("ca", "leaf")],
            ..FactSnapshot::default()
        });
        assert_eq!(store.direct_issuers("leaf").unwrap().len(), 1);
        assert_eq!(store.direct_subjects("ca").unwrap().len(), 1);
    }

    #[test]
    fn direct_links_get_distance_one_closure_entries() {
        let store = MemoryStore::from_snapshot(FactSnapshot {
            links: vec![link("ca", "leaf")],
            transitive_links: vec![transitive("root", "leaf", 2)],
            ..FactSnapshot::default()
        });
        let ancestors = store.transitive_issuers("leaf").unwrap();
        assert_eq!(
            ancestors,
            vec![transitive("ca", "leaf", 1), transitive("root", "leaf", 2)]
        );
    }

    #[test]
    fn transitive_links_sorted_by_distance() {
        let store = MemoryStore::from_snapshot(FactSnapshot {
            transitive_links: vec![
                transitive("root", "leaf", 3),
                transitive("ca", "leaf", 1),
                transitive("mid", "leaf", 2),
            ],
            ..FactSnapshot::default()
        });
        let distances: Vec<u32> = store
            .transitive_issuers("leaf")
            .unwrap()
            .iter()
            .map(|l| l.distance)
            .collect();
        assert_eq!(distances, vec![1, 2, 3]);
    }

    #[test]
    fn built_chains_ordered_by_candidate() {
        let store = MemoryStore::from_snapshot(FactSnapshot {
            built_chains: vec![
                built("abc", 2),
                built("abc", 0),
                built("abc", 1),
                built("abc", 1),
            ],
            ..FactSnapshot::default()
        });
        let numbers: Vec<u32> = store
            .built_chains("abc")
            .unwrap()
            .iter()
            .map(|c| c.candidate)
            .collect();
        assert_eq!(numbers, vec![0, 1, 2]);
        assert!(store.built_chain("abc", 2).unwrap().is_some());
        assert!(store.built_chain("abc", 3).unwrap().is_none());
    }

    #[test]
    fn anchors_scoped_by_context() {
        let store = MemoryStore::from_snapshot(FactSnapshot {
            trust_anchors: vec![TrustAnchorSet {
                context: "trusted".into(),
                certs: vec!["root".into()],
            }],
            ..FactSnapshot::default()
        });
        assert!(store.is_trust_anchor("trusted", "root").unwrap());
        assert!(!store.is_trust_anchor("other", "root").unwrap());
        assert!(!store.is_trust_anchor("trusted", "leaf").unwrap());
    }

    #[test]
    fn prefix_lookup_spans_sent_and_built() {
        let store = MemoryStore::from_snapshot(FactSnapshot {
            sent_chains: vec![SentChain {
                chain_hash: "abc1".into(),
                certs: vec!["leaf".into()],
            }],
            built_chains: vec![built("abc2", 0), built("abc1", 0), built("ffe", 0)],
            ..FactSnapshot::default()
        });
        assert_eq!(
            store.chain_hashes_with_prefix("abc").unwrap(),
            vec!["abc1".to_string(), "abc2".to_string()]
        );
        assert_eq!(store.chains_containing("leaf").unwrap().len(), 1);
    }

    #[test]
    fn names_index_both_ways() {
        let store = MemoryStore::from_snapshot(FactSnapshot {
            cert_names: vec![
                cert_name("www", "CN", "www.example.com"),
                cert_name("www", "DNS", "www.example.com"),
                cert_name("www", "DNS", "example.com"),
                cert_name("alt", "DNS", "www.example.com"),
                cert_name("alt", "DNS", "www.example.com"),
            ],
            ..FactSnapshot::default()
        });

        assert_eq!(store.cert_names("www").unwrap().len(), 3);
        assert_eq!(store.cert_names("alt").unwrap().len(), 1);
        assert_eq!(
            store.certs_by_name("www.example.com", None).unwrap(),
            vec!["alt".to_string(), "www".to_string()]
        );
        assert_eq!(
            store.certs_by_name("www.example.com", Some("CN")).unwrap(),
            vec!["www".to_string()]
        );
        assert!(store.certs_by_name("other.org", None).unwrap().is_empty());
    }

    #[test]
    fn subject_lookups_go_through_name_hashes() {
        let store = MemoryStore::from_snapshot(FactSnapshot {
            certificates: vec![cert("a", "dn-1"), cert("b", "dn-1"), cert("c", "dn-2")],
            names: vec![
                DistinguishedName {
                    hash: "dn-1".into(),
                    name: "CN=Shared".into(),
                },
                DistinguishedName {
                    hash: "dn-2".into(),
                    name: "CN=Shared".into(),
                },
            ],
            ..FactSnapshot::default()
        });

        assert_eq!(
            store.certs_by_subject_hash("dn-1").unwrap(),
            vec!["a".to_string(), "b".to_string()]
        );
        assert_eq!(store.certs_by_subject("CN=Shared").unwrap().len(), 3);
        assert!(store.certs_by_subject("CN=Nobody").unwrap().is_empty());
    }

    #[test]
    fn built_chains_indexed_by_path_cert() {
        let store = MemoryStore::from_snapshot(FactSnapshot {
            built_chains: vec![built("def", 1), built("abc", 0), built("def", 0)],
            ..FactSnapshot::default()
        });
        let found: Vec<(String, u32)> = store
            .built_chains_containing("leaf")
            .unwrap()
            .into_iter()
            .map(|c| (c.chain_hash, c.candidate))
            .collect();
        assert_eq!(
            found,
            vec![
                ("abc".to_string(), 0),
                ("def".to_string(), 0),
                ("def".to_string(), 1),
            ]
        );
        assert!(store.built_chains_containing("root").unwrap().is_empty());
    }

    #[test]
    fn answers_indexed_by_ip_including_chainless() {
        let store = MemoryStore::from_snapshot(FactSnapshot {
            answers: vec![
                answer(2_014_051_302, "192.0.2.1", 20, Some("abc")),
                answer(2_014_051_301, "192.0.2.1", 10, None),
                answer(2_014_051_301, "192.0.2.9", 15, Some("abc")),
            ],
            ..FactSnapshot::default()
        });

        let from_ip = store.answers_from_ip("192.0.2.1").unwrap();
        assert_eq!(from_ip.len(), 2);
        assert_eq!(from_ip[0].timestamp, 10);
        assert_eq!(
            store
                .answers_in_campaign(2_014_051_301, "192.0.2.1")
                .unwrap()
                .len(),
            1
        );
        assert!(store
            .answers_in_campaign(2_014_051_303, "192.0.2.1")
            .unwrap()
            .is_empty());
        assert_eq!(store.answers_for_chain("abc").unwrap().len(), 2);
    }
}
