//! Render projection: a declarative layout handed to a graph drawer.
//!
//! Style is derived from tags alone, over independent channels:
//!
//! - `anchor` → box shape, and the node joins the source rank
//! - `sent` → filled background
//! - `built` node / `highlighted` edge → highlight color and pen width
//! - edge without `direct` → dashed (inferred by the path builder)

use piccolo_core::{CandidateNumber, CertHash, ChainHash};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::graph::{Edge, Graph, Node, Tag};

/// Color of highlighted nodes and edges.
pub const HIGHLIGHT_COLOR: &str = "red";

/// Pen width of highlighted nodes and edges.
pub const HIGHLIGHT_PENWIDTH: f32 = 2.0;

/// Pen width of everything else.
pub const DEFAULT_PENWIDTH: f32 = 1.0;

/// Background of nodes that were sent by the server.
pub const SENT_FILL: &str = "lightgrey";

/// Hex digits of the hash shown under each label.
const SHORT_HASH_LEN: usize = 12;

/// Node outline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Shape {
    /// Default outline
    Ellipse,
    /// Trust anchors
    Box,
}

/// Style of one node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeStyle {
    /// Certificate hash, used as node id
    pub id: CertHash,
    /// Display text
    pub label: String,
    /// Outline shape
    pub shape: Shape,
    /// Filled background
    pub filled: bool,
    /// Highlight color and weight
    pub highlighted: bool,
}

/// Style of one edge, drawn issuer to subject.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeStyle {
    /// Issuer node id
    pub from: CertHash,
    /// Subject node id
    pub to: CertHash,
    /// Highlight color and weight
    pub highlighted: bool,
    /// Drawn dashed: no direct link backs it
    pub inferred: bool,
}

impl NodeStyle {
    /// Outline color, when highlighted.
    #[must_use]
    pub const fn color(&self) -> Option<&'static str> {
        if self.highlighted {
            Some(HIGHLIGHT_COLOR)
        } else {
            None
        }
    }

    /// Outline width.
    #[must_use]
    pub const fn penwidth(&self) -> f32 {
        if self.highlighted {
            HIGHLIGHT_PENWIDTH
        } else {
            DEFAULT_PENWIDTH
        }
    }
}

impl EdgeStyle {
    /// Line color, when highlighted.
    #[must_use]
    pub const fn color(&self) -> Option<&'static str> {
        if self.highlighted {
            Some(HIGHLIGHT_COLOR)
        } else {
            None
        }
    }

    /// Line width.
    #[must_use]
    pub const fn penwidth(&self) -> f32 {
        if self.highlighted {
            HIGHLIGHT_PENWIDTH
        } else {
            DEFAULT_PENWIDTH
        }
    }
}

/// Layering and styling directives for one chain graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutSpec {
    /// Chain the layout belongs to
    pub chain_hash: ChainHash,
    /// Highlighted candidate
    pub candidate: Option<CandidateNumber>,
    /// Nodes placed in the source rank (drawn first)
    pub source_rank: Vec<CertHash>,
    /// Node styles, sorted by id
    pub nodes: Vec<NodeStyle>,
    /// Edge styles, sorted by endpoints
    pub edges: Vec<EdgeStyle>,
}

fn short_hash(hash: &str) -> &str {
    hash.get(..SHORT_HASH_LEN).unwrap_or(hash)
}

fn node_style(node: &Node) -> NodeStyle {
    NodeStyle {
        id: node.hash.clone(),
        label: node
            .label
            .clone()
            .unwrap_or_else(|| short_hash(&node.hash).to_string()),
        shape: if node.has(Tag::Anchor) {
            Shape::Box
        } else {
            Shape::Ellipse
        },
        filled: node.has(Tag::Sent),
        highlighted: node.has(Tag::Built),
    }
}

fn edge_style(edge: &Edge) -> EdgeStyle {
    EdgeStyle {
        from: edge.issuer.clone(),
        to: edge.subject.clone(),
        highlighted: edge.has(Tag::Highlighted),
        inferred: edge.is_inferred(),
    }
}

/// Project a tagged graph onto layout directives. Performs no I/O.
#[must_use]
pub fn project(graph: &Graph) -> LayoutSpec {
    LayoutSpec {
        chain_hash: graph.chain_hash.clone(),
        candidate: graph.candidate,
        source_rank: graph.tagged(Tag::Anchor).map(|n| n.hash.clone()).collect(),
        nodes: graph.nodes.iter().map(node_style).collect(),
        edges: graph.edges.iter().map(edge_style).collect(),
    }
}

impl LayoutSpec {
    /// Graphviz DOT text for this layout.
    #[must_use]
    pub fn to_dot(&self) -> String {
        Dot(self).to_string()
    }
}

struct Dot<'a>(&'a LayoutSpec);

fn escape(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

impl fmt::Display for Dot<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let spec = self.0;
        writeln!(f, "digraph \"{}\" {{", escape(&spec.chain_hash))?;

        if !spec.source_rank.is_empty() {
            write!(f, "  {{ rank=source;")?;
            for id in &spec.source_rank {
                write!(f, " \"{}\";", escape(id))?;
            }
            writeln!(f, " }}")?;
        }

        for node in &spec.nodes {
            let mut attrs = vec![
                format!(
                    "label=\"{}\\n{}\"",
                    escape(&node.label),
                    escape(short_hash(&node.id))
                ),
            ];
            if node.shape == Shape::Box {
                attrs.push("shape=box".into());
            }
            if node.filled {
                attrs.push(format!("style=filled, fillcolor=\"{SENT_FILL}\""));
            }
            if let Some(color) = node.color() {
                attrs.push(format!("color=\"{color}\", penwidth={}", node.penwidth()));
            }
            writeln!(f, "  \"{}\" [{}];", escape(&node.id), attrs.join(", "))?;
        }

        for edge in &spec.edges {
            let mut attrs = Vec::new();
            if let Some(color) = edge.color() {
                attrs.push(format!("color=\"{color}\", penwidth={}", edge.penwidth()));
            }
            if edge.inferred {
                attrs.push("style=dashed".to_string());
            }
            write!(f, "  \"{}\" -> \"{}\"", escape(&edge.from), escape(&edge.to))?;
            if attrs.is_empty() {
                writeln!(f, ";")?;
            } else {
                writeln!(f, " [{}];", attrs.join(", "))?;
            }
        }

        writeln!(f, "}}")
    }
}
