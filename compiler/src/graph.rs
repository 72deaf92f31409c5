// graph.rs — Operator dataflow graph model
//
// Holds the read-only input of the compiler: an ordered list of typed
// operator nodes, each referring to its inputs by id. Graphs are built by
// an authoring tool (or decoded from JSON) and never mutated by lowering.
//
// Preconditions: none.
// Postconditions: `Graph::from_json` yields a graph whose node order matches
//                 the document order.
// Failure modes: malformed JSON → `Diagnostic` E0201.
// Side effects: none.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::diag::{codes, Diagnostic};

// ── Public types ────────────────────────────────────────────────────────────

/// Unique identifier for a node within a graph.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct NodeId(pub u32);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

/// Numeric representation carried by a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
    /// Continuous floating values (animation parameters).
    #[default]
    Control,
    /// Fixed-point integers; one full turn = 3600 units.
    Visual,
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Domain::Control => write!(f, "control"),
            Domain::Visual => write!(f, "visual"),
        }
    }
}

/// The operator a node performs, with only the payload that operator uses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NodeKind {
    /// An externally supplied procedure parameter.
    Input { name: String },
    Constant { value: f64 },
    /// Arithmetic: `add`, `mul`, `map`, `clamp`, `abs`.
    Math {
        op: String,
        #[serde(default)]
        params: Vec<f64>,
    },
    /// Periodic waveform: `sin`, `cos`, `saw`, `square`. `phase` is in turns
    /// and shifts the angle of every waveform, saw and square included.
    Wave {
        wave: String,
        #[serde(default)]
        phase: f64,
    },
    /// Polar-coordinate math: `distance`, `angle`.
    Polar {
        op: String,
        #[serde(default)]
        center_x: f64,
        #[serde(default)]
        center_y: f64,
    },
    ValueOutput,
    BufferOutput,
    AudioOutput,
    /// A kind this compiler does not know how to lower.
    Other { tag: String },
}

impl NodeKind {
    /// True for the kinds whose value is a result of the procedure.
    pub fn is_output(&self) -> bool {
        matches!(
            self,
            NodeKind::ValueOutput | NodeKind::BufferOutput | NodeKind::AudioOutput
        )
    }

    /// Short name of the kind, used in comments and DOT labels.
    pub fn tag(&self) -> &str {
        match self {
            NodeKind::Input { .. } => "input",
            NodeKind::Constant { .. } => "constant",
            NodeKind::Math { .. } => "math",
            NodeKind::Wave { .. } => "wave",
            NodeKind::Polar { .. } => "polar",
            NodeKind::ValueOutput => "value_output",
            NodeKind::BufferOutput => "buffer_output",
            NodeKind::AudioOutput => "audio_output",
            NodeKind::Other { tag } => tag.as_str(),
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKind::Input { name } => write!(f, "input {}", name),
            NodeKind::Constant { value } => write!(f, "constant {}", value),
            NodeKind::Math { op, params } if params.is_empty() => write!(f, "math {}", op),
            NodeKind::Math { op, params } => {
                let rendered: Vec<String> = params.iter().map(|p| p.to_string()).collect();
                write!(f, "math {}({})", op, rendered.join(", "))
            }
            NodeKind::Wave { wave, phase } if *phase == 0.0 => write!(f, "wave {}", wave),
            NodeKind::Wave { wave, phase } => write!(f, "wave {} +{}", wave, phase),
            NodeKind::Polar {
                op,
                center_x,
                center_y,
            } => write!(f, "polar {} @({}, {})", op, center_x, center_y),
            NodeKind::Other { tag } => write!(f, "other {}", tag),
            other => write!(f, "{}", other.tag()),
        }
    }
}

/// A node in the dataflow graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    #[serde(default)]
    pub domain: Domain,
    #[serde(flatten)]
    pub kind: NodeKind,
    /// Ordered references to other nodes of the same graph.
    #[serde(default)]
    pub inputs: Vec<NodeId>,
}

impl Node {
    pub fn new(id: NodeId, domain: Domain, kind: NodeKind, inputs: Vec<NodeId>) -> Self {
        Node {
            id,
            domain,
            kind,
            inputs,
        }
    }
}

/// An ordered collection of nodes forming one computation.
///
/// The graph must be acyclic; that is checked during lowering, not here.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "GraphDocument")]
pub struct Graph {
    pub nodes: Vec<Node>,
    /// One past the highest id handed out or pushed so far.
    #[serde(skip)]
    next_id: u32,
}

/// Wire shape of a graph; the id high-water mark is rebuilt on decode.
#[derive(Deserialize)]
struct GraphDocument {
    nodes: Vec<Node>,
}

impl From<GraphDocument> for Graph {
    fn from(doc: GraphDocument) -> Self {
        let next_id = doc.nodes.iter().map(|n| n.id.0 + 1).max().unwrap_or(0);
        Graph {
            nodes: doc.nodes,
            next_id,
        }
    }
}

impl PartialEq for Graph {
    fn eq(&self, other: &Self) -> bool {
        self.nodes == other.nodes
    }
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a node with the next free id and return that id.
    ///
    /// Ids come from a high-water mark, so they stay unique even after nodes
    /// are removed. Nodes written straight into `nodes` are covered as long
    /// as the last one carries the highest id; `GraphIndex::build` rejects
    /// any duplicate that slips through.
    pub fn add_node(&mut self, domain: Domain, kind: NodeKind, inputs: &[NodeId]) -> NodeId {
        let after_last = self.nodes.last().map_or(0, |n| n.id.0 + 1);
        let id = NodeId(self.next_id.max(after_last));
        self.push(Node::new(id, domain, kind, inputs.to_vec()));
        id
    }

    /// Append a fully built node as-is.
    pub fn push(&mut self, node: Node) {
        self.next_id = self.next_id.max(node.id.0 + 1);
        self.nodes.push(node);
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Output-kind nodes in stored order.
    pub fn outputs(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter().filter(|n| n.kind.is_output())
    }

    /// Decode a graph from its JSON document form.
    pub fn from_json(text: &str) -> Result<Graph, Diagnostic> {
        serde_json::from_str(text).map_err(|e| {
            Diagnostic::error(codes::E0201, format!("invalid graph document: {}", e))
                .with_hint("expected {\"nodes\": [{\"id\": 0, \"kind\": \"constant\", ...}]}")
        })
    }

    /// Compact JSON with no whitespace; stable for a given graph value.
    pub fn canonical_json(&self) -> String {
        // Serializing plain structs of strings, numbers and vectors cannot fail.
        serde_json::to_string(self).unwrap_or_default()
    }
}

// ── Display ─────────────────────────────────────────────────────────────────

impl fmt::Display for Graph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Graph ({} nodes, {} outputs)",
            self.nodes.len(),
            self.outputs().count()
        )?;
        for node in &self.nodes {
            write!(f, "  {} [{}] {}", node.id, node.domain, node.kind)?;
            if !node.inputs.is_empty() {
                let inputs: Vec<String> = node.inputs.iter().map(|i| i.to_string()).collect();
                write!(f, " <- {}", inputs.join(", "))?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
