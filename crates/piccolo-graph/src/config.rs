//! Configuration for chain grading and expansion.

use piccolo_core::{ChainError, GradeOrder, Result, TrustContext};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Chain analysis configuration.
///
/// `grade_order` has no default: a config without it does not load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphConfig {
    /// Which direction of the numeric grade is better.
    pub grade_order: GradeOrder,

    /// Trust context used when a caller does not name one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_trust_context: Option<TrustContext>,

    /// Where ancestor/descendant relationships come from.
    #[serde(default)]
    pub transitive_source: TransitiveSource,

    /// Hop ceiling for [`TransitiveSource::DirectWalk`].
    #[serde(default = "default_max_hops")]
    pub max_hops: u32,
}

/// Source of transitive issuance relationships.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TransitiveSource {
    /// Read the externally maintained transitive closure.
    #[default]
    Precomputed,
    /// Breadth-first walk over direct links, bounded by `max_hops`.
    DirectWalk,
}

impl GraphConfig {
    /// Create a config with the given grade order and defaults elsewhere.
    #[must_use]
    pub const fn new(grade_order: GradeOrder) -> Self {
        Self {
            grade_order,
            default_trust_context: None,
            transitive_source: TransitiveSource::Precomputed,
            max_hops: default_max_hops(),
        }
    }

    /// Set the default trust context.
    #[must_use]
    pub fn default_trust_context(mut self, context: impl Into<TrustContext>) -> Self {
        self.default_trust_context = Some(context.into());
        self
    }

    /// Switch to bounded direct-link expansion.
    #[must_use]
    pub const fn direct_walk(mut self, max_hops: u32) -> Self {
        self.transitive_source = TransitiveSource::DirectWalk;
        self.max_hops = max_hops;
        self
    }

    /// Parse a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(|e| ChainError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load config from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    fn validate(&self) -> Result<()> {
        if self.max_hops == 0 {
            return Err(ChainError::Config("max_hops must be at least 1".into()));
        }
        Ok(())
    }
}

const fn default_max_hops() -> u32 {
    16
}
