//! Fact snapshot loading and hash resolution from user input.

use anyhow::{Context as _, Result};
use piccolo_core::{
    is_hex_hash, CertHash, ChainError, ChainHash, FactSnapshot, FactStore, MemoryStore,
};
use std::path::Path;
use tracing::{debug, info};

/// Read and index a JSON fact snapshot.
pub async fn load(path: &Path) -> Result<MemoryStore> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("reading fact snapshot {}", path.display()))?;
    let snapshot = FactSnapshot::from_json_slice(&bytes)
        .with_context(|| format!("parsing fact snapshot {}", path.display()))?;

    let store = MemoryStore::from_snapshot(snapshot);
    info!(path = %path.display(), certificates = store.certificate_count(), "loaded fact snapshot");
    Ok(store)
}

/// Chain hash named by `input`: an exact hash, else a unique prefix.
pub fn resolve_chain<S: FactStore + ?Sized>(
    store: &S,
    input: &str,
) -> piccolo_core::Result<ChainHash> {
    if store.sent_chain(input)?.is_some() || !store.built_chains(input)?.is_empty() {
        return Ok(input.to_string());
    }
    resolve_prefix("chain", input, |prefix| store.chain_hashes_with_prefix(prefix))
}

/// Certificate hash named by `input`: an exact hash, else a unique prefix.
pub fn resolve_cert<S: FactStore + ?Sized>(
    store: &S,
    input: &str,
) -> piccolo_core::Result<CertHash> {
    if store.certificate(input)?.is_some() {
        return Ok(input.to_string());
    }
    resolve_prefix("certificate", input, |prefix| store.cert_hashes_with_prefix(prefix))
}

fn resolve_prefix<F>(kind: &str, input: &str, lookup: F) -> piccolo_core::Result<String>
where
    F: FnOnce(&str) -> piccolo_core::Result<Vec<String>>,
{
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ChainError::InvalidHash(input.to_string()));
    }
    // Stored hashes are lowercase hex; anything else is matched as typed.
    let prefix = if is_hex_hash(trimmed) {
        trimmed.to_ascii_lowercase()
    } else {
        trimmed.to_string()
    };

    let mut matches = lookup(&prefix)?;
    match matches.len() {
        0 => Err(ChainError::not_found(format!("{kind} {input}"))),
        1 => {
            let hash = matches.remove(0);
            debug!(kind, prefix = %prefix, hash = %hash, "resolved hash prefix");
            Ok(hash)
        }
        n => Err(ChainError::Ambiguous { prefix, matches: n }),
    }
}
