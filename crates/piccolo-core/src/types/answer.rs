//! Observed TLS answers from probing campaigns.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::{format_timestamp, ChainHash};

/// One observed TLS exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    /// Campaign identifier, usually `YYYYMMDDNN`
    pub campaign: u64,
    /// Server IP address
    pub ip: String,
    /// Server name probed (SNI)
    #[serde(default)]
    pub name: String,
    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
    /// Observation time (epoch seconds)
    pub timestamp: i64,
    /// Sent chain, when the server answered with certificates
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chain_hash: Option<ChainHash>,
    /// Raw answer type code
    #[serde(default)]
    pub answer_type: u8,
    /// Protocol version of the answer
    #[serde(default)]
    pub version: u16,
    /// Selected ciphersuite
    #[serde(default)]
    pub ciphersuite: u16,
    /// Alert level, for alert answers
    #[serde(default)]
    pub alert_level: u8,
    /// Alert type, for alert answers
    #[serde(default)]
    pub alert_type: u8,
}

const fn default_port() -> u16 {
    443
}

impl Answer {
    /// Campaign identifier in display form.
    #[must_use]
    pub fn campaign_str(&self) -> String {
        format_campaign(self.campaign)
    }

    /// Observation time in display form.
    #[must_use]
    pub fn timestamp_str(&self) -> String {
        format_timestamp(self.timestamp)
    }

    /// Classified answer type.
    #[must_use]
    pub const fn kind(&self) -> AnswerKind {
        AnswerKind::from_code(self.answer_type)
    }

    /// Human-readable summary of what the server answered.
    #[must_use]
    pub fn describe(&self) -> String {
        let version = TlsVersion(self.version);
        match self.kind() {
            AnswerKind::Empty => "Empty".to_string(),
            AnswerKind::Junk => "Junk".to_string(),
            AnswerKind::Sslv2Alert => format!("SSLv2 Alert ({})", self.alert_type),
            AnswerKind::TlsAlert => format!(
                "{version} Alert ({}, {})",
                self.alert_level, self.alert_type
            ),
            AnswerKind::Sslv2Handshake => format!("SSLv2 Handshake ({})", self.ciphersuite),
            AnswerKind::TlsHandshake => format!("{version} Handshake ({})", self.ciphersuite),
            AnswerKind::Unexpected(code) => format!("Unexpected type ({code})"),
        }
    }
}

/// Render a campaign id: 10-digit ids become `YYYY-MM-DD/NN`.
#[must_use]
pub fn format_campaign(campaign: u64) -> String {
    let s = campaign.to_string();
    if s.len() == 10 {
        format!("{}-{}-{}/{}", &s[0..4], &s[4..6], &s[6..8], &s[8..10])
    } else {
        s
    }
}

/// Parse a campaign id given either raw (`2014051301`) or in display form
/// (`2014-05-13/01`).
#[must_use]
pub fn parse_campaign(input: &str) -> Option<u64> {
    let digits: String = input
        .trim()
        .chars()
        .filter(|c| !matches!(c, '-' | '/'))
        .collect();
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Answer type codes recorded by the prober.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnswerKind {
    /// Connection closed without data
    Empty,
    /// Unparseable data
    Junk,
    /// SSLv2 error message
    Sslv2Alert,
    /// SSLv3/TLS alert record
    TlsAlert,
    /// SSLv2 server hello
    Sslv2Handshake,
    /// SSLv3/TLS server hello
    TlsHandshake,
    /// Anything else
    Unexpected(u8),
}

impl AnswerKind {
    /// Classify a raw answer type code.
    #[must_use]
    pub const fn from_code(code: u8) -> Self {
        match code {
            0 => Self::Empty,
            1 => Self::Junk,
            10 => Self::Sslv2Alert,
            11 => Self::TlsAlert,
            20 => Self::Sslv2Handshake,
            21 => Self::TlsHandshake,
            other => Self::Unexpected(other),
        }
    }
}

/// Protocol version as carried on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TlsVersion(pub u16);

impl fmt::Display for TlsVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            2 => write!(f, "SSLv2"),
            0x0300 => write!(f, "SSLv3"),
            0x0301 => write!(f, "TLS 1.0"),
            0x0302 => write!(f, "TLS 1.1"),
            0x0303 => write!(f, "TLS 1.2"),
            v => write!(f, "Unknown TLS version ({v:04x})"),
        }
    }
}
