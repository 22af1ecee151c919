//! Configuration management.

use anyhow::{Context as _, Result};
use directories::ProjectDirs;
use piccolo_core::{FactStore, GradeOrder};
use piccolo_graph::{Expander, GraphConfig, TransitiveSource};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::output::OutputFormat;

/// CLI configuration.
///
/// Same keys as [`GraphConfig`], plus CLI defaults. `grade_order` may be
/// left out here and given with `--grade-order` instead.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Default fact snapshot.
    pub facts: Option<PathBuf>,

    /// Default output format.
    pub output_format: Option<OutputFormat>,

    /// Which direction of the numeric grade is better.
    pub grade_order: Option<GradeOrder>,

    /// Trust context used when `--context` is not given.
    pub default_trust_context: Option<String>,

    /// Where ancestor/descendant relationships come from.
    #[serde(default)]
    pub transitive_source: TransitiveSource,

    /// Hop ceiling for direct-walk expansion.
    pub max_hops: Option<u32>,
}

impl Config {
    /// Get the default config file path.
    pub fn path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("org", "piccolo", "piccolo")
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Load configuration from `explicit`, else from the default path.
    ///
    /// A missing default file yields the empty config; a missing explicit
    /// file is an error.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => {
                let path = Self::path()?;
                if !path.exists() {
                    return Ok(Self::default());
                }
                path
            }
        };

        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("parsing config {}", path.display()))
    }

    /// Parse a TOML document.
    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Graph configuration for commands that select or rank candidates.
    pub fn graph_config(&self) -> Result<GraphConfig> {
        let order = self.grade_order.ok_or_else(|| {
            anyhow::anyhow!(
                "Grade order required.\n\n\
                 Set it with one of:\n  \
                 1. --grade-order lower-is-better|higher-is-better\n  \
                 2. grade_order = \"...\" in {}",
                Self::path().map_or_else(|_| "config.toml".to_string(), |p| p.display().to_string())
            )
        })?;

        let mut config = GraphConfig::new(order);
        if let Some(context) = &self.default_trust_context {
            config = config.default_trust_context(context.clone());
        }
        if self.transitive_source == TransitiveSource::DirectWalk {
            config = config.direct_walk(self.hop_ceiling()?);
        }
        Ok(config)
    }

    /// Expander for commands that only follow issuance links.
    pub fn expander<'a, S: FactStore + ?Sized>(&self, store: &'a S) -> Result<Expander<'a, S>> {
        Ok(match self.transitive_source {
            TransitiveSource::Precomputed => Expander::precomputed(store),
            TransitiveSource::DirectWalk => Expander::direct_walk(store, self.hop_ceiling()?),
        })
    }

    fn hop_ceiling(&self) -> Result<u32> {
        match self.max_hops {
            Some(0) => anyhow::bail!("max_hops must be at least 1"),
            Some(hops) => Ok(hops),
            None => Ok(GraphConfig::new(GradeOrder::LowerIsBetter).max_hops),
        }
    }
}
