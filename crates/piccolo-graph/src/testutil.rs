//! Fact builders shared by the unit tests.

use piccolo_core::{
    Answer, BuiltChain, BuiltLink, CertName, Certificate, DirectLink, DistinguishedName,
    FactSnapshot, Grade, MemoryStore, SentChain, TransitiveLink, TrustAnchorSet, UnusedCert,
};

pub(crate) fn make_cert(hash: &str) -> Certificate {
    Certificate {
        hash: hash.into(),
        version: 3,
        serial: "01".into(),
        issuer_hash: format!("dn-issuer-{hash}"),
        subject_hash: format!("dn-{hash}"),
        not_before: 1_000,
        not_after: 2_000,
        key_type: "RSA".into(),
        rsa_modulus: Some(format!("00{}", "ab".repeat(256))),
        rsa_exponent: Some("010001".into()),
        is_ca: false,
    }
}

/// Fluent builder over a [`FactSnapshot`].
#[derive(Default)]
pub(crate) struct Facts {
    snapshot: FactSnapshot,
}

impl Facts {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn cert(mut self, hash: &str, subject: &str) -> Self {
        let cert = make_cert(hash);
        self.snapshot.names.push(DistinguishedName {
            hash: cert.subject_hash.clone(),
            name: subject.into(),
        });
        self.snapshot.certificates.push(cert);
        self
    }

    pub(crate) fn certs(self, hashes: &[&str]) -> Self {
        hashes
            .iter()
            .fold(self, |facts, h| facts.cert(h, &format!("CN={h}")))
    }

    pub(crate) fn valid_for(mut self, cert: &str, name_type: &str, name: &str) -> Self {
        self.snapshot.cert_names.push(CertName {
            cert_hash: cert.into(),
            name_type: name_type.into(),
            name: name.into(),
        });
        self
    }

    pub(crate) fn link(mut self, issuer: &str, subject: &str) -> Self {
        self.snapshot.links.push(DirectLink {
            issuer_hash: issuer.into(),
            subject_hash: subject.into(),
        });
        self
    }

    pub(crate) fn transitive(mut self, issuer: &str, subject: &str, distance: u32) -> Self {
        self.snapshot.transitive_links.push(TransitiveLink {
            issuer_hash: issuer.into(),
            subject_hash: subject.into(),
            distance,
        });
        self
    }

    pub(crate) fn sent(mut self, chain: &str, certs: &[&str]) -> Self {
        self.snapshot.sent_chains.push(SentChain {
            chain_hash: chain.into(),
            certs: certs.iter().map(|c| (*c).to_string()).collect(),
        });
        self
    }

    /// Candidate with `path` given leaf first.
    pub(crate) fn built(
        mut self,
        chain: &str,
        candidate: u32,
        path: &[&str],
        complete: bool,
    ) -> Self {
        let links = (1..)
            .zip(path)
            .map(|(pos, cert)| BuiltLink {
                cert_hash: (*cert).to_string(),
                position_in_msg: Some(pos - 1),
                position_in_chain: pos,
            })
            .collect::<Vec<_>>();
        self.snapshot.built_chains.push(BuiltChain {
            chain_hash: chain.into(),
            candidate,
            chain_length: u32::try_from(links.len()).unwrap(),
            complete,
            ordered: true,
            transitively_valid_count: u32::try_from(links.len()).unwrap(),
            not_before: 1_000,
            not_after: 2_000,
            links,
        });
        self
    }

    pub(crate) fn unused(
        mut self,
        chain: &str,
        candidate: u32,
        cert: &str,
        position: u32,
    ) -> Self {
        self.snapshot.unused_certs.push(UnusedCert {
            chain_hash: chain.into(),
            candidate,
            cert_hash: cert.into(),
            position_in_msg: position,
        });
        self
    }

    pub(crate) fn anchor(mut self, context: &str, cert: &str) -> Self {
        self.snapshot.trust_anchors.push(TrustAnchorSet {
            context: context.into(),
            certs: vec![cert.into()],
        });
        self
    }

    pub(crate) fn grade(mut self, chain: &str, candidate: u32, context: &str, grade: i64) -> Self {
        self.snapshot.grades.push(Grade {
            chain_hash: chain.into(),
            candidate,
            trust_context: context.into(),
            grade,
        });
        self
    }

    pub(crate) fn answer(self, chain: &str, ip: &str, timestamp: i64) -> Self {
        self.answer_in(2_014_051_301, Some(chain), ip, timestamp)
    }

    pub(crate) fn answer_in(
        mut self,
        campaign: u64,
        chain: Option<&str>,
        ip: &str,
        timestamp: i64,
    ) -> Self {
        self.snapshot.answers.push(Answer {
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
        });
        self
    }

    pub(crate) fn store(self) -> MemoryStore {
        MemoryStore::from_snapshot(self.snapshot)
    }
}

/// Sent `[leaf, intermediate]`, one complete candidate `[leaf, intermediate, root]`,
/// and a direct link only between intermediate and leaf.
pub(crate) fn scenario_a() -> MemoryStore {
    Facts::new()
        .certs(&["leaf", "intermediate", "root"])
        .link("intermediate", "leaf")
        .sent("abc123", &["leaf", "intermediate"])
        .built("abc123", 0, &["leaf", "intermediate", "root"], true)
        .store()
}
