//! Certificate and distinguished-name facts.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Content hash of a certificate's DER encoding (hex, SHA-1 in practice).
pub type CertHash = String;

/// Hash of a distinguished name.
pub type NameHash = String;

/// Returns true if `hash` is a non-empty hexadecimal string.
#[must_use]
pub fn is_hex_hash(hash: &str) -> bool {
    !hash.is_empty() && hash.bytes().all(|b| b.is_ascii_hexdigit())
}

/// An observed X.509 certificate. Immutable once recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Certificate {
    /// Content hash, the global identity of the certificate
    pub hash: CertHash,
    /// X.509 version field
    #[serde(default)]
    pub version: u8,
    /// Serial number (hex)
    #[serde(default)]
    pub serial: String,
    /// Hash of the issuer distinguished name
    pub issuer_hash: NameHash,
    /// Hash of the subject distinguished name
    pub subject_hash: NameHash,
    /// Not valid before (epoch seconds)
    pub not_before: i64,
    /// Not valid after (epoch seconds)
    pub not_after: i64,
    /// Public key algorithm, e.g. `RSA`
    #[serde(default)]
    pub key_type: String,
    /// RSA modulus as hex, when `key_type` is `RSA`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rsa_modulus: Option<String>,
    /// RSA public exponent as hex
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rsa_exponent: Option<String>,
    /// Basic constraints CA flag
    #[serde(default)]
    pub is_ca: bool,
}

impl Certificate {
    /// Key length in bits derived from the key material.
    ///
    /// RSA keys are measured on the hex modulus after dropping one leading
    /// `00` sign byte. Other key types report 0.
    #[must_use]
    pub fn key_len(&self) -> usize {
        if !self.key_type.eq_ignore_ascii_case("RSA") {
            return 0;
        }
        self.rsa_modulus.as_deref().map_or(0, |n| {
            let n = n.strip_prefix("00").unwrap_or(n);
            n.len() * 4
        })
    }

    /// Whether `timestamp` (epoch seconds) falls inside the validity interval.
    #[must_use]
    pub const fn valid_at(&self, timestamp: i64) -> bool {
        self.not_before <= timestamp && timestamp <= self.not_after
    }

    /// Not-before as a UTC datetime.
    #[must_use]
    pub fn not_before_utc(&self) -> DateTime<Utc> {
        epoch_to_utc(self.not_before)
    }

    /// Not-after as a UTC datetime.
    #[must_use]
    pub fn not_after_utc(&self) -> DateTime<Utc> {
        epoch_to_utc(self.not_after)
    }
}

/// A distinguished name, shared by every certificate with the same name hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistinguishedName {
    /// Name hash
    pub hash: NameHash,
    /// Human-readable name
    pub name: String,
}

/// A name a certificate is valid for, e.g. its subject CN or a DNS
/// subjectAltName entry.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CertName {
    /// Certificate carrying the name
    pub cert_hash: CertHash,
    /// Where the name comes from, e.g. `CN` or `DNS`
    #[serde(rename = "type")]
    pub name_type: String,
    /// The name itself
    pub name: String,
}

/// Convert epoch seconds to `DateTime<Utc>`, clamping out-of-range values to the epoch.
#[must_use]
pub fn epoch_to_utc(epoch: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(epoch, 0).single().unwrap_or_default()
}

/// Render epoch seconds as `YYYY-MM-DD HH:MM:SS` (UTC).
#[must_use]
pub fn format_timestamp(epoch: i64) -> String {
    epoch_to_utc(epoch).format("%Y-%m-%d %H:%M:%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_cert(key_type: &str, modulus: Option<&str>) -> Certificate {
        Certificate {
            hash: "aa".into(),
            version: 3,
            serial: "01".into(),
            issuer_hash: "i".into(),
            subject_hash: "s".into(),
            not_before: 1_000,
            not_after: 2_000,
            key_type: key_type.into(),
            rsa_modulus: modulus.map(Into::into),
            rsa_exponent: None,
            is_ca: false,
        }
    }

    #[test]
    fn rsa_key_len_strips_sign_byte() {
        let modulus = format!("00{}", "ab".repeat(256));
        assert_eq!(make_cert("RSA", Some(&modulus)).key_len(), 2048);
        assert_eq!(make_cert("RSA", Some(&"cd".repeat(128))).key_len(), 1024);
    }

    #[test]
    fn non_rsa_key_len_is_zero() {
        assert_eq!(make_cert("EC", Some("00ff")).key_len(), 0);
        assert_eq!(make_cert("RSA", None).key_len(), 0);
    }

    #[test]
    fn validity_bounds_are_inclusive() {
        let cert = make_cert("RSA", None);
        assert!(cert.valid_at(1_000));
        assert!(cert.valid_at(2_000));
        assert!(!cert.valid_at(999));
        assert!(!cert.valid_at(2_001));
    }

    #[test]
    fn hex_hash_syntax() {
        assert!(is_hex_hash("abc123"));
        assert!(is_hex_hash("DEADBEEF"));
        assert!(!is_hex_hash(""));
        assert!(!is_hex_hash("xyz"));
    }

    #[test]
    fn timestamps_render_in_utc() {
        assert_eq!(format_timestamp(0), "1970-01-01 00:00:00");
        assert_eq!(format_timestamp(1_400_000_000), "2014-05-13 16:53:20");
    }

    #[test]
    fn cert_name_type_uses_short_key() {
        let name: CertName =
            serde_json::from_str(r#"{"cert_hash": "aa", "type": "DNS", "name": "example.com"}"#)
                .unwrap();
        assert_eq!(name.name_type, "DNS");
        assert!(serde_json::to_string(&name).unwrap().contains(r#""type":"DNS""#));
    }
}
