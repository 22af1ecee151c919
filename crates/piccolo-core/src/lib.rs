//! Core fact types and store traits for TLS certificate chain analysis.
//!
//! This crate provides the foundational types shared by the piccolo crates:
//!
//! - **Types**: certificates, issuance links, sent and built chains, grades,
//!   trust anchors and observed answers
//! - **Store**: the read-only [`FactStore`] query surface and the indexed
//!   [`MemoryStore`] adapter over a [`FactSnapshot`]
//! - **Errors**: [`ChainError`] with HTTP status mapping for front ends
//!
//! # Example
//!
//! ```rust,ignore
//! use piccolo_core::{FactSnapshot, FactStore, MemoryStore, Result};
//!
//! fn leaf_of(json: &str, chain: &str) -> Result<Option<String>> {
//!     let store = MemoryStore::from_snapshot(FactSnapshot::from_json(json)?);
//!     Ok(store.sent_chain(chain)?.and_then(|c| c.certs.first().cloned()))
//! }
//! ```

mod error;
pub mod memory;
pub mod snapshot;
pub mod store;
pub mod types;

pub use error::{ChainError, Result};
pub use memory::MemoryStore;
pub use snapshot::FactSnapshot;
pub use store::FactStore;
pub use types::*;
