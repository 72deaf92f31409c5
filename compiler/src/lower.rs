// lower.rs — Memoized node lowering
//
// Walks the graph depth-first from a requested node, emitting at most one
// assignment statement per node in dependency-first order. The symbol
// table maps node id → variable name and serves as both the memo cache and
// the alias table for inputs and transparent outputs.
//
// Preconditions: `index` was built from the graph being compiled.
// Postconditions: every node lowered has a symbol; statements only ever
//                 reference names defined by earlier statements or inputs.
// Failure modes: cycle → E0103; depth limit → E0104; unknown id → E0102.
//                Unknown operators never fail; they lower to placeholders.
// Side effects: none (tracing events only).

use std::collections::{BTreeSet, HashMap, HashSet};

use crate::diag::{codes, Diagnostic};
use crate::graph::{Domain, Node, NodeId, NodeKind};
use crate::index::GraphIndex;
use crate::primitives::{Primitive, FULL_TURN, HALF_TURN, UNIT_AMPLITUDE};

/// Prefix of every generated variable name.
pub const NAME_PREFIX: &str = "v";

/// Deepest dependency chain lowered before giving up.
pub const MAX_LOWER_DEPTH: usize = 1024;

const CLAMP_DEFAULT_MIN: f64 = 0.0;
const CLAMP_DEFAULT_MAX: f64 = 1000.0;

/// A node that could not be lowered faithfully and got a stand-in value.
#[derive(Debug, Clone, PartialEq)]
pub struct Placeholder {
    pub node: NodeId,
    pub detail: String,
}

/// Everything one traversal produced, handed to top-level assembly.
#[derive(Debug, Default)]
pub struct LoweredBody {
    pub statements: Vec<String>,
    pub used_primitives: BTreeSet<Primitive>,
    pub placeholders: Vec<Placeholder>,
}

/// Mutable state of a single compile. Never shared between compiles.
pub struct CompilerContext<'g> {
    index: GraphIndex<'g>,
    name_counter: u32,
    symbols: HashMap<NodeId, String>,
    statements: Vec<String>,
    used_primitives: BTreeSet<Primitive>,
    placeholders: Vec<Placeholder>,
    /// Nodes whose inputs are being lowered right now, outermost first.
    path: Vec<NodeId>,
    on_path: HashSet<NodeId>,
}

impl<'g> CompilerContext<'g> {
    pub fn new(index: GraphIndex<'g>) -> Self {
        CompilerContext {
            index,
            name_counter: 0,
            symbols: HashMap::new(),
            statements: Vec::new(),
            used_primitives: BTreeSet::new(),
            placeholders: Vec::new(),
            path: Vec::new(),
            on_path: HashSet::new(),
        }
    }

    /// Lower `id` and its dependencies; return the variable holding its value.
    pub fn lower(&mut self, id: NodeId) -> Result<String, Diagnostic> {
        if let Some(name) = self.symbols.get(&id) {
            return Ok(name.clone());
        }
        if self.on_path.contains(&id) {
            return Err(self.cycle_error(id));
        }
        if self.path.len() >= MAX_LOWER_DEPTH {
            return Err(Diagnostic::error(
                codes::E0104,
                format!(
                    "dependency chain deeper than {} nodes at {}",
                    MAX_LOWER_DEPTH, id
                ),
            )
            .at(id));
        }
        let node = self.index.node(id).ok_or_else(|| {
            Diagnostic::error(codes::E0102, format!("unknown node {}", id)).at(id)
        })?;

        self.path.push(id);
        self.on_path.insert(id);
        let mut args = Vec::with_capacity(node.inputs.len());
        for &input in &node.inputs {
            args.push(self.lower(input)?);
        }
        self.path.pop();
        self.on_path.remove(&id);

        let name = self.lower_node(node, &args);
        tracing::trace!(node = %id, var = %name, "lowered");
        self.symbols.insert(id, name.clone());
        Ok(name)
    }

    /// Variable already bound to `id`, if it has been lowered.
    pub fn symbol(&self, id: NodeId) -> Option<&str> {
        self.symbols.get(&id).map(String::as_str)
    }

    pub fn statements(&self) -> &[String] {
        &self.statements
    }

    pub fn finish(self) -> LoweredBody {
        LoweredBody {
            statements: self.statements,
            used_primitives: self.used_primitives,
            placeholders: self.placeholders,
        }
    }

    // ── Per-kind rules ──────────────────────────────────────────────────

    fn lower_node(&mut self, node: &Node, args: &[String]) -> String {
        match &node.kind {
            NodeKind::Input { name } => name.clone(),
            NodeKind::Constant { value } => {
                let literal = number_literal(node.domain, *value);
                self.emit(literal)
            }
            NodeKind::Math { op, params } => self.lower_math(node, op, params, args),
            NodeKind::Wave { wave, phase } => self.lower_wave(node, wave, *phase, args),
            NodeKind::Polar {
                op,
                center_x,
                center_y,
            } => self.lower_polar(node, op, *center_x, *center_y, args),
            NodeKind::ValueOutput | NodeKind::BufferOutput | NodeKind::AudioOutput => {
                match args.first() {
                    Some(input) => input.clone(),
                    None => self.emit("0".to_string()),
                }
            }
            NodeKind::Other { tag } => {
                self.emit_placeholder("0".to_string(), node.id, format!("node kind: {}", tag))
            }
        }
    }

    fn lower_math(&mut self, node: &Node, op: &str, params: &[f64], args: &[String]) -> String {
        let domain = node.domain;
        match (op, args) {
            ("add" | "mul", [first, rest @ ..]) if !rest.is_empty() => {
                let expr = match domain {
                    Domain::Visual => {
                        let prim = if op == "add" {
                            Primitive::WaveAdd
                        } else {
                            Primitive::WaveMultiply
                        };
                        self.used_primitives.insert(prim);
                        rest.iter().fold(first.clone(), |acc, arg| {
                            format!("{}({}, {})", prim, acc, arg)
                        })
                    }
                    Domain::Control => {
                        let sym = if op == "add" { " + " } else { " * " };
                        args.join(sym)
                    }
                };
                self.emit(expr)
            }
            ("map", [input, ..]) if params.len() == 4 => {
                self.used_primitives.insert(Primitive::Map);
                let bounds: Vec<String> =
                    params.iter().map(|&p| number_literal(domain, p)).collect();
                self.emit(format!("{}({}, {})", Primitive::Map, input, bounds.join(", ")))
            }
            ("clamp", [input, ..]) => {
                self.used_primitives.insert(Primitive::Clamp);
                let min = params.first().copied().unwrap_or(CLAMP_DEFAULT_MIN);
                let max = params.get(1).copied().unwrap_or(CLAMP_DEFAULT_MAX);
                self.emit(format!(
                    "{}({}, {}, {})",
                    Primitive::Clamp,
                    input,
                    number_literal(domain, min),
                    number_literal(domain, max)
                ))
            }
            ("abs", [input, ..]) => self.emit(format!("abs({})", input)),
            _ => {
                let detail = match op {
                    "add" | "mul" | "clamp" | "abs" => {
                        format!("math op: {} (got {} inputs)", op, args.len())
                    }
                    "map" => format!(
                        "math op: map (got {} inputs, {} params)",
                        args.len(),
                        params.len()
                    ),
                    other => format!("math op: {}", other),
                };
                let passthrough = args.first().cloned().unwrap_or_else(|| "0".to_string());
                self.emit_placeholder(passthrough, node.id, detail)
            }
        }
    }

    fn lower_wave(&mut self, node: &Node, wave: &str, phase: f64, args: &[String]) -> String {
        let Some(input) = args.first() else {
            return self.emit_placeholder("0".to_string(), node.id, format!("wave input: {}", wave));
        };
        // Whole turns are a no-op, so the shift is always in [0, FULL_TURN).
        // The float-to-int cast saturates, which keeps huge phases finite here.
        let shift = ((phase * FULL_TURN as f64).round() as i64).rem_euclid(FULL_TURN);
        let angle = match shift {
            0 => format!("{} mod {}", input, FULL_TURN),
            s => format!("({} + {}) mod {}", input, s, FULL_TURN),
        };
        match wave {
            "sin" | "cos" => {
                let prim = if wave == "sin" {
                    Primitive::Isin
                } else {
                    Primitive::Icos
                };
                self.used_primitives.insert(prim);
                self.emit(format!("{}({})", prim, angle))
            }
            "saw" => self.emit(angle),
            "square" => self.emit(format!(
                "(if ({}) < {}: {} else: -{})",
                angle, HALF_TURN, UNIT_AMPLITUDE, UNIT_AMPLITUDE
            )),
            other => {
                self.emit_placeholder("0".to_string(), node.id, format!("wave type: {}", other))
            }
        }
    }

    fn lower_polar(
        &mut self,
        node: &Node,
        op: &str,
        center_x: f64,
        center_y: f64,
        args: &[String],
    ) -> String {
        let prim = match op {
            "distance" => Primitive::PolarDistance,
            "angle" => Primitive::PolarAngle,
            other => {
                return self.emit_placeholder(
                    "0".to_string(),
                    node.id,
                    format!("polar op: {}", other),
                )
            }
        };
        // Fewer than two inputs: fall back to the ambient `x`/`y` parameters.
        let (x, y) = match args {
            [x, y, ..] => (x.as_str(), y.as_str()),
            _ => ("x", "y"),
        };
        self.used_primitives.insert(prim);
        self.emit(format!(
            "{}({}, {}, {}, {})",
            prim,
            x,
            y,
            number_literal(node.domain, center_x),
            number_literal(node.domain, center_y)
        ))
    }

    // ── Emission ────────────────────────────────────────────────────────

    fn fresh_name(&mut self) -> String {
        let name = format!("{}{}", NAME_PREFIX, self.name_counter);
        self.name_counter += 1;
        name
    }

    fn emit(&mut self, expr: String) -> String {
        let name = self.fresh_name();
        self.statements.push(format!("let {} = {}", name, expr));
        name
    }

    fn emit_placeholder(&mut self, expr: String, node: NodeId, detail: String) -> String {
        let name = self.fresh_name();
        tracing::debug!(node = %node, %detail, "lowered to placeholder");
        self.statements
            .push(format!("let {} = {}  # unhandled {}", name, expr, detail));
        self.placeholders.push(Placeholder { node, detail });
        name
    }

    fn cycle_error(&self, id: NodeId) -> Diagnostic {
        let start = self.path.iter().position(|&p| p == id).unwrap_or(0);
        let mut diag = Diagnostic::error(
            codes::E0103,
            format!("cycle detected: {} depends on itself", id),
        )
        .at(id)
        .with_hint("graphs must be acyclic; remove one edge of the loop");
        for &step in &self.path[start..] {
            diag = diag.with_cause("on the dependency path", Some(step));
        }
        diag
    }
}

/// Render a numeric payload in the convention of `domain`: a float literal
/// for Control, a truncated integer for the Visual fixed-point scale.
pub fn number_literal(domain: Domain, value: f64) -> String {
    match domain {
        Domain::Visual => format!("{}", value.trunc() as i64),
        Domain::Control if value.fract() == 0.0 && value.abs() < 1e15 => format!("{:.1}", value),
        // f64 Display never switches to an exponent; `{:e}` keeps huge
        // magnitudes as float literals (`1e20`, not `100000000000000000000`).
        Domain::Control if value.abs() >= 1e15 => format!("{:e}", value),
        Domain::Control => format!("{}", value),
    }
}
