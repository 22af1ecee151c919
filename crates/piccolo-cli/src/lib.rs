//! # piccolo-cli
//!
//! Command-line explorer for TLS certificate chains.
//!
//! ## Features
//!
//! - **Graphs**: sent and built certificates of a chain as one tagged graph,
//!   printed as tables, JSON, YAML or Graphviz DOT
//! - **Details**: per-chain and per-certificate evidence, with the answers
//!   that carried them
//! - **Grading**: best candidate and ranked alternates under a trust context
//! - **Hash prefixes**: any unique prefix of a chain or certificate hash

pub mod cli;
pub mod config;
pub mod facts;
pub mod output;

pub use cli::{report, run};
