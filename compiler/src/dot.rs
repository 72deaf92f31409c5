// dot.rs — Graphviz DOT output for operator graphs
//
// Renders a Graph in DOT format for `dot` or other Graphviz layout engines.
// Nodes that no output depends on (and so produce no code) are drawn
// dashed; nodes feeding more than one consumer are drawn bold.
//
// Preconditions: none.
// Postconditions: returns a valid DOT string with one statement per node
//                 and per input reference.
// Failure modes: duplicate ids or dangling inputs → `Diagnostic`.
// Side effects: none.

use std::fmt::Write;

use crate::diag::Diagnostic;
use crate::graph::{Domain, Graph, Node, NodeKind};
use crate::index::GraphIndex;

/// Emit the graph as a Graphviz DOT string.
pub fn emit_dot(graph: &Graph) -> Result<String, Diagnostic> {
    let index = GraphIndex::build(graph)?;
    let live = index.reachable_from_outputs();

    let mut buf = String::new();
    writeln!(buf, "digraph ngc {{").unwrap();
    writeln!(buf, "    rankdir=LR;").unwrap();
    writeln!(buf, "    node [fontname=\"Helvetica\", fontsize=10];").unwrap();
    writeln!(buf, "    edge [fontname=\"Helvetica\", fontsize=9];").unwrap();
    writeln!(buf).unwrap();

    for node in &graph.nodes {
        let mut styles = Vec::new();
        let mut attrs = vec![
            format!("label=\"{}\"", escape(&node_label(node))),
            format!("shape={}", node_shape(&node.kind)),
        ];
        if node.domain == Domain::Visual {
            styles.push("filled");
            attrs.push("fillcolor=lightblue".to_string());
        }
        if !live.contains(&node.id) {
            styles.push("dashed");
            attrs.push("color=gray60".to_string());
        } else if matches!(node.kind, NodeKind::Other { .. }) {
            attrs.push("color=red".to_string());
        }
        if index.fan_out(node.id) > 1 {
            attrs.push("penwidth=2".to_string());
        }
        if !styles.is_empty() {
            attrs.push(format!("style=\"{}\"", styles.join(",")));
        }
        writeln!(buf, "    n{} [{}];", node.id.0, attrs.join(", ")).unwrap();
    }

    writeln!(buf).unwrap();
    for node in &graph.nodes {
        let labelled = node.inputs.len() > 1;
        for (slot, input) in node.inputs.iter().enumerate() {
            if labelled {
                writeln!(buf, "    n{} -> n{} [label=\"{}\"];", input.0, node.id.0, slot).unwrap();
            } else {
                writeln!(buf, "    n{} -> n{};", input.0, node.id.0).unwrap();
            }
        }
    }

    writeln!(buf, "}}").unwrap();
    Ok(buf)
}

// ── Helpers ─────────────────────────────────────────────────────────────────

fn node_label(node: &Node) -> String {
    format!("{}\\n{}", node.id, node.kind)
}

fn node_shape(kind: &NodeKind) -> &'static str {
    match kind {
        NodeKind::Input { .. } => "invhouse",
        NodeKind::Constant { .. } => "plaintext",
        NodeKind::Math { .. } | NodeKind::Polar { .. } => "box",
        NodeKind::Wave { .. } => "ellipse",
        NodeKind::ValueOutput | NodeKind::BufferOutput | NodeKind::AudioOutput => "doublecircle",
        NodeKind::Other { .. } => "octagon",
    }
}

/// Escape a label for use inside a double-quoted DOT string. Backslash
/// sequences already placed by `node_label` are kept.
fn escape(label: &str) -> String {
    label.replace('"', "\\\"")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::NodeId;

    fn sample() -> Graph {
        let mut g = Graph::new();
        let t = g.add_node(Domain::Visual, NodeKind::Input { name: "t".into() }, &[]);
        let s = g.add_node(
            Domain::Visual,
            NodeKind::Wave {
                wave: "sin".into(),
                phase: 0.0,
            },
            &[t],
        );
        let sum = g.add_node(
            Domain::Visual,
            NodeKind::Math {
                op: "add".into(),
                params: vec![],
            },
            &[s, s],
        );
        g.add_node(Domain::Visual, NodeKind::Constant { value: 9.0 }, &[]);
        g.add_node(Domain::Control, NodeKind::ValueOutput, &[sum]);
        g
    }

    #[test]
    fn valid_dot_structure() {
        let dot = emit_dot(&sample()).unwrap();
        assert!(dot.starts_with("digraph ngc {"));
        assert!(dot.trim_end().ends_with('}'));
        assert!(dot.contains("rankdir=LR;"));
    }

    #[test]
    fn node_shapes_present() {
        let dot = emit_dot(&sample()).unwrap();
        assert!(dot.contains("shape=invhouse"), "missing input shape");
        assert!(dot.contains("shape=ellipse"), "missing wave shape");
        assert!(dot.contains("shape=doublecircle"), "missing output shape");
    }

    #[test]
    fn dead_node_dashed() {
        let dot = emit_dot(&sample()).unwrap();
        let dead = dot.lines().find(|l| l.trim_start().starts_with("n3 [")).unwrap();
        assert!(dead.contains("dashed"), "{}", dead);
        let live = dot.lines().find(|l| l.trim_start().starts_with("n1 [")).unwrap();
        assert!(!live.contains("dashed"), "{}", live);
    }

    #[test]
    fn shared_node_bold_and_slots_labelled() {
        let dot = emit_dot(&sample()).unwrap();
        let shared = dot.lines().find(|l| l.trim_start().starts_with("n1 [")).unwrap();
        assert!(shared.contains("penwidth=2"));
        assert!(dot.contains("n1 -> n2 [label=\"0\"];"));
        assert!(dot.contains("n1 -> n2 [label=\"1\"];"));
        assert!(dot.contains("n0 -> n1;"));
    }

    #[test]
    fn dangling_input_rejected() {
        let mut g = Graph::new();
        g.push(Node::new(
            NodeId(0),
            Domain::Control,
            NodeKind::ValueOutput,
            vec![NodeId(1)],
        ));
        assert!(emit_dot(&g).is_err());
    }
}
