//! Command implementations.

pub mod answer;
pub mod cert;
pub mod chain;
pub mod chains;
pub mod expand;
pub mod grades;
pub mod graph;

use anyhow::Result;
use piccolo_core::MemoryStore;
use std::path::PathBuf;

use crate::config::Config;
use crate::output::OutputFormat;

/// Shared context for all commands.
#[derive(Debug, Clone)]
pub struct Context {
    /// Fact snapshot to read
    pub facts: Option<PathBuf>,

    /// Trust context from `--context` or the config default
    pub trust_context: Option<String>,

    /// Loaded configuration, with flag overrides applied
    pub config: Config,

    /// Output format
    pub output_format: OutputFormat,
}

impl Context {
    /// Load the fact snapshot, returning an error if none is configured.
    pub async fn store(&self) -> Result<MemoryStore> {
        let path = self.facts.as_deref().ok_or_else(|| {
            anyhow::anyhow!(
                "Fact snapshot required.\n\n\
                 Set it with one of:\n  \
                 1. --facts <FILE>\n  \
                 2. PICCOLO_FACTS environment variable\n  \
                 3. facts = \"...\" in the config file"
            )
        })?;
        crate::facts::load(path).await
    }

    /// Trust context, returning an error if none is configured.
    pub fn require_trust_context(&self) -> Result<&str> {
        self.trust_context.as_deref().ok_or_else(|| {
            anyhow::anyhow!(
                "Trust context required.\n\n\
                 Set it with one of:\n  \
                 1. --context <NAME>\n  \
                 2. default_trust_context = \"...\" in the config file"
            )
        })
    }

    /// Reject `--output dot` for commands without a graph.
    pub fn reject_dot(&self, command: &str) -> Result<()> {
        if self.output_format == OutputFormat::Dot {
            anyhow::bail!("dot output is only available for `graph`, not `{command}`");
        }
        Ok(())
    }
}
