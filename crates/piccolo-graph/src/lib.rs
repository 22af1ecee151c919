//! Trust-chain graph reconstruction and grading.
//!
//! Given the facts recorded for a TLS answer, this crate rebuilds the
//! certificate graph the server presented and the path builder found:
//!
//! - **Expansion**: ancestors and descendants of a certificate with hop
//!   distances ([`Expander`])
//! - **Assembly**: one deduplicated graph from the sent chain and every
//!   built candidate, tagged with provenance ([`assemble`])
//! - **Anchors**: trust anchors of a context marked on existing nodes
//!   ([`mark_anchors`])
//! - **Grading**: best candidate and ranked alternates under a configured
//!   [`GradeOrder`](piccolo_core::GradeOrder) ([`ChainGrader`])
//! - **Rendering**: a declarative [`LayoutSpec`] for a graph drawer
//! - **Lookup**: certificates by subject or name, chains by server address
//!   or by a subject on their path ([`find_certs`], [`find_chains`])
//!
//! [`ChainExplorer`] strings these together for a single request.
//!
//! # Example
//!
//! ```rust,ignore
//! use piccolo_core::{GradeOrder, MemoryStore};
//! use piccolo_graph::{ChainExplorer, GraphConfig};
//!
//! let config = GraphConfig::new(GradeOrder::LowerIsBetter);
//! let explorer = ChainExplorer::new(&store, &config);
//! let view = explorer.explore("abc123", None, Some("mozilla"))?;
//! println!("{}", view.layout.to_dot());
//! ```

pub mod anchors;
pub mod assembly;
pub mod candidates;
pub mod config;
pub mod detail;
pub mod expansion;
pub mod explorer;
pub mod graph;
pub mod grading;
pub mod lookup;
pub mod render;

#[cfg(test)]
mod testutil;

pub use anchors::mark_anchors;
pub use assembly::assemble;
pub use candidates::CandidateSet;
pub use config::{GraphConfig, TransitiveSource};
pub use detail::{
    AnswerDetail, CertificateDetail, ChainDetail, NamedCert, NamedRelative, PathCert, Sighting,
};
pub use expansion::{Expander, Relative};
pub use explorer::{ChainExplorer, ChainView};
pub use graph::{Edge, Graph, Inconsistency, Node, Tag};
pub use grading::{Alternate, ChainGrader};
pub use lookup::{find_certs, find_chains, CertQuery, CertSummary, ChainQuery, ChainSummary};
pub use render::{project, EdgeStyle, LayoutSpec, NodeStyle, Shape};
