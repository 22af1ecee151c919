//! Trust anchor classification.

use piccolo_core::{FactStore, Result};
use tracing::debug;

use crate::graph::{Graph, Tag};

/// Tag every node that is a trust anchor in `trust_context`.
///
/// Only existing nodes are considered: an anchor that was never observed
/// for this chain is not added to the graph.
pub fn mark_anchors<S: FactStore + ?Sized>(
    store: &S,
    mut graph: Graph,
    trust_context: &str,
) -> Result<Graph> {
    let mut marked = 0usize;
    for node in &mut graph.nodes {
        if store.is_trust_anchor(trust_context, &node.hash)? {
            node.tags.insert(Tag::Anchor);
            marked += 1;
        }
    }
    debug!(chain = %graph.chain_hash, trust_context, marked, "marked trust anchors");
    Ok(graph)
}
