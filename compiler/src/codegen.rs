// codegen.rs — Procedure source assembly
//
// Lowers every output node of a graph through one CompilerContext, then
// wraps the resulting statements in an import header, a procedure
// signature and a return statement.
//
// Preconditions: none; the graph is validated here before lowering.
// Postconditions: returns source whose imports match the primitives used
//                 and whose body defines each reachable node at most once.
// Failure modes: structural graph errors (E0101–E0104) as `Diagnostic`.
// Side effects: none.

use std::collections::BTreeSet;
use std::fmt::Write as _;

use crate::diag::Diagnostic;
use crate::graph::Graph;
use crate::index::GraphIndex;
use crate::lower::{CompilerContext, Placeholder};
use crate::primitives::{required_imports, Primitive};

pub const GENERATED_BANNER: &str = "# Generated by ngc (node graph compiler)";

/// Fixed-point values are integers, so that is what procedures return.
pub const DEFAULT_RETURN_TYPE: &str = "int";

pub const KINEMATICS_PROC_NAME: &str = "updateParticle";

const INDENT: &str = "  ";

// ── Public types ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcParam {
    pub name: String,
    pub type_tag: String,
}

impl ProcParam {
    pub fn new(name: impl Into<String>, type_tag: impl Into<String>) -> Self {
        ProcParam {
            name: name.into(),
            type_tag: type_tag.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcSignature {
    pub name: String,
    pub params: Vec<ProcParam>,
    pub return_type: String,
}

impl ProcSignature {
    pub fn new(name: impl Into<String>, params: Vec<ProcParam>) -> Self {
        ProcSignature {
            name: name.into(),
            params,
            return_type: DEFAULT_RETURN_TYPE.to_string(),
        }
    }

    pub fn with_return_type(mut self, return_type: impl Into<String>) -> Self {
        self.return_type = return_type.into();
        self
    }

    /// The particle-update call shape: position, velocity, age,
    /// remaining life, absolute time and time step.
    pub fn kinematics() -> Self {
        let params = ["x", "y", "vx", "vy", "age", "life", "time", "dt"]
            .into_iter()
            .map(|name| ProcParam::new(name, "float"))
            .collect();
        ProcSignature::new(KINEMATICS_PROC_NAME, params)
    }
}

/// Which lowered outputs the procedure returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReturnMode {
    /// Return the first output in graph order; later outputs are still lowered.
    #[default]
    First,
    /// Return every output as a tuple when there is more than one.
    All,
}

#[derive(Debug, Clone)]
pub struct CompileOptions {
    pub signature: ProcSignature,
    pub return_mode: ReturnMode,
    /// Emit the banner and used-primitive comment above the imports.
    pub header: bool,
}

impl CompileOptions {
    pub fn new(signature: ProcSignature) -> Self {
        CompileOptions {
            signature,
            return_mode: ReturnMode::default(),
            header: true,
        }
    }
}

#[derive(Debug)]
pub struct GeneratedCode {
    pub source: String,
    /// Variable bound to each output node, in graph order.
    pub output_vars: Vec<String>,
    pub used_primitives: BTreeSet<Primitive>,
    pub placeholders: Vec<Placeholder>,
}

// ── Public entry points ─────────────────────────────────────────────────────

/// Compile `graph` into a procedure named `proc_name` taking `params`.
pub fn compile(
    graph: &Graph,
    proc_name: &str,
    params: &[ProcParam],
) -> Result<String, Diagnostic> {
    let options = CompileOptions::new(ProcSignature::new(proc_name, params.to_vec()));
    compile_with_options(graph, &options).map(|generated| generated.source)
}

/// Compile `graph` with the fixed particle-kinematics signature.
pub fn compile_kinematics(graph: &Graph) -> Result<String, Diagnostic> {
    let options = CompileOptions::new(ProcSignature::kinematics());
    compile_with_options(graph, &options).map(|generated| generated.source)
}

#[tracing::instrument(skip_all, fields(procedure = %options.signature.name, nodes = graph.len()))]
pub fn compile_with_options(
    graph: &Graph,
    options: &CompileOptions,
) -> Result<GeneratedCode, Diagnostic> {
    let index = GraphIndex::build(graph)?;
    let mut ctx = CompilerContext::new(index);

    let mut output_vars = Vec::new();
    for node in graph.outputs() {
        output_vars.push(ctx.lower(node.id)?);
    }
    let body = ctx.finish();
    tracing::debug!(
        statements = body.statements.len(),
        outputs = output_vars.len(),
        placeholders = body.placeholders.len(),
        "graph lowered"
    );

    let mut out = String::with_capacity(256 + body.statements.len() * 32);
    emit_header(&mut out, &body.used_primitives, options.header);
    emit_signature(&mut out, &options.signature, options.return_mode, &output_vars);
    for stmt in &body.statements {
        let _ = writeln!(out, "{}{}", INDENT, stmt);
    }
    emit_return(&mut out, &options.signature, options.return_mode, &output_vars);

    Ok(GeneratedCode {
        source: out,
        output_vars,
        used_primitives: body.used_primitives,
        placeholders: body.placeholders,
    })
}

// ── Assembly ────────────────────────────────────────────────────────────────

fn emit_header(out: &mut String, used: &BTreeSet<Primitive>, banner: bool) {
    if banner {
        let _ = writeln!(out, "{}", GENERATED_BANNER);
        if used.is_empty() {
            out.push_str("# primitives: none\n");
        } else {
            let names: Vec<&str> = used.iter().map(|p| p.name()).collect();
            let _ = writeln!(out, "# primitives: {}", names.join(", "));
        }
    }
    for module in required_imports(used) {
        let _ = writeln!(out, "import {}", module);
    }
    out.push('\n');
}

fn returns_tuple(mode: ReturnMode, output_vars: &[String]) -> bool {
    mode == ReturnMode::All && output_vars.len() > 1
}

fn emit_signature(
    out: &mut String,
    sig: &ProcSignature,
    mode: ReturnMode,
    output_vars: &[String],
) {
    let params: Vec<String> = sig
        .params
        .iter()
        .map(|p| format!("{}: {}", p.name, p.type_tag))
        .collect();
    let return_type = if returns_tuple(mode, output_vars) {
        let slots = vec![sig.return_type.as_str(); output_vars.len()];
        format!("({})", slots.join(", "))
    } else {
        sig.return_type.clone()
    };
    let _ = writeln!(
        out,
        "proc {}({}): {} =",
        sig.name,
        params.join(", "),
        return_type
    );
}

fn emit_return(out: &mut String, sig: &ProcSignature, mode: ReturnMode, output_vars: &[String]) {
    let convert = |var: &String| format!("{}({})", sig.return_type, var);
    let expr = if returns_tuple(mode, output_vars) {
        let items: Vec<String> = output_vars.iter().map(convert).collect();
        format!("({})", items.join(", "))
    } else {
        match output_vars.first() {
            Some(var) => convert(var),
            None => "0".to_string(),
        }
    };
    let _ = writeln!(out, "{}return {}", INDENT, expr);
}

// ── Tests ───────────────────────────────────────────────────────────────────
// Structural checks on the generated text. Whole-output snapshots live in
// compiler/tests/snapshot_codegen.rs.
