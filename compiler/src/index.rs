// index.rs — Id lookup and structural checks over a Graph
//
// Inputs are stored as ids, so every traversal needs id → node lookup.
// Building the index is also where duplicate ids and dangling input
// references are rejected, before any statement is emitted.

use std::collections::{HashMap, HashSet};

use crate::diag::{codes, Diagnostic};
use crate::graph::{Graph, Node, NodeId};

#[derive(Debug, Clone)]
pub struct GraphIndex<'g> {
    graph: &'g Graph,
    node_pos: HashMap<NodeId, usize>,
    fan_out: HashMap<NodeId, usize>,
}

impl<'g> GraphIndex<'g> {
    /// Index `graph`, failing on the first duplicate id or dangling input.
    pub fn build(graph: &'g Graph) -> Result<Self, Diagnostic> {
        let mut node_pos = HashMap::with_capacity(graph.nodes.len());
        for (i, node) in graph.nodes.iter().enumerate() {
            if let Some(prev) = node_pos.insert(node.id, i) {
                return Err(Diagnostic::error(
                    codes::E0101,
                    format!("duplicate node id {}", node.id),
                )
                .at(node.id)
                .with_cause(
                    format!("first defined at position {}, again at {}", prev, i),
                    None,
                ));
            }
        }
        let mut fan_out = HashMap::with_capacity(graph.nodes.len());
        for node in &graph.nodes {
            if let Some(missing) = node.inputs.iter().find(|&i| !node_pos.contains_key(i)) {
                return Err(Diagnostic::error(
                    codes::E0102,
                    format!("{} takes input from unknown node {}", node.id, missing),
                )
                .at(node.id)
                .with_hint("remove the input or add the referenced node"));
            }
            for &input in &node.inputs {
                *fan_out.entry(input).or_insert(0) += 1;
            }
        }
        Ok(GraphIndex {
            graph,
            node_pos,
            fan_out,
        })
    }

    pub fn node(&self, id: NodeId) -> Option<&'g Node> {
        self.node_pos.get(&id).and_then(|&i| self.graph.nodes.get(i))
    }

    /// Number of nodes that list `id` among their inputs (with multiplicity).
    pub fn fan_out(&self, id: NodeId) -> usize {
        self.fan_out.get(&id).copied().unwrap_or(0)
    }

    /// Ids of every node an output-kind node transitively depends on,
    /// including the outputs themselves.
    pub fn reachable_from_outputs(&self) -> HashSet<NodeId> {
        let mut seen = HashSet::new();
        let mut stack: Vec<NodeId> = self.graph.outputs().map(|n| n.id).collect();
        while let Some(id) = stack.pop() {
            if !seen.insert(id) {
                continue;
            }
            if let Some(node) = self.node(id) {
                stack.extend(node.inputs.iter().copied());
            }
        }
        seen
    }
}
