use clap::Parser;
use std::path::PathBuf;

use ngc::codegen::{CompileOptions, ProcParam, ProcSignature, ReturnMode};
use ngc::diag::{codes, Diagnostic};

#[derive(Debug, Clone, clap::ValueEnum)]
enum EmitStage {
    Source,
    Dot,
    BuildInfo,
    Graph,
}

#[derive(Debug, Clone, clap::ValueEnum)]
enum Preset {
    Kinematics,
}

#[derive(Parser, Debug)]
#[command(
    name = "ngc",
    version,
    about = "Node Graph Compiler — lowers operator graphs to straight-line procedure source"
)]
struct Cli {
    /// Input graph document (JSON)
    graph: PathBuf,

    /// Output file path (stdout if omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output stage
    #[arg(long, value_enum, default_value_t = EmitStage::Source)]
    emit: EmitStage,

    /// Procedure name
    #[arg(long, default_value = "evaluateGraph")]
    name: String,

    /// Procedure parameter as `name:type` (repeatable)
    #[arg(short = 'p', long = "param", value_parser = parse_param)]
    params: Vec<ProcParam>,

    /// Use a canonical signature instead of --name/--param
    #[arg(long, value_enum, conflicts_with_all = ["name", "params"])]
    preset: Option<Preset>,

    /// Declared return type
    #[arg(long, default_value = ngc::codegen::DEFAULT_RETURN_TYPE)]
    return_type: String,

    /// Return every output as a tuple instead of only the first
    #[arg(long)]
    all_outputs: bool,

    /// Omit the banner and primitive summary comments
    #[arg(long)]
    no_header: bool,

    /// Print compiler phases
    #[arg(long)]
    verbose: bool,
}

fn parse_param(s: &str) -> Result<ProcParam, String> {
    match s.split_once(':') {
        Some((name, ty)) if !name.trim().is_empty() && !ty.trim().is_empty() => {
            Ok(ProcParam::new(name.trim(), ty.trim()))
        }
        _ => Err(format!("expected `name:type`, got `{}`", s)),
    }
}

fn main() {
    let cli = Cli::parse();

    if cli.verbose {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_max_level(tracing::Level::DEBUG)
            .init();
    }
    tracing::debug!(graph = %cli.graph.display(), emit = ?cli.emit, "starting");

    // ── Read and decode graph ──
    let text = match std::fs::read_to_string(&cli.graph) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("ngc: error: {}: {}", cli.graph.display(), e);
            std::process::exit(2);
        }
    };
    let graph = match ngc::graph::Graph::from_json(&text) {
        Ok(g) => g,
        Err(diag) => {
            eprintln!("ngc: {}", diag);
            std::process::exit(2);
        }
    };
    tracing::debug!(nodes = graph.len(), outputs = graph.outputs().count(), "graph decoded");

    // ── Produce the requested stage ──
    let rendered = match cli.emit {
        EmitStage::Graph => Ok(graph.to_string()),
        EmitStage::BuildInfo => Ok(ngc::provenance::compute_provenance(&graph).to_json()),
        EmitStage::Dot => ngc::dot::emit_dot(&graph),
        EmitStage::Source => {
            let signature = match cli.preset {
                Some(Preset::Kinematics) => ProcSignature::kinematics(),
                None => ProcSignature::new(cli.name.clone(), cli.params.clone()),
            }
            .with_return_type(cli.return_type.clone());
            let mut options = CompileOptions::new(signature);
            if cli.all_outputs {
                options.return_mode = ReturnMode::All;
            }
            options.header = !cli.no_header;
            ngc::compile_with_options(&graph, &options).map(|generated| {
                for ph in &generated.placeholders {
                    let warning = Diagnostic::warning(codes::W0301, format!("unhandled {}", ph.detail))
                        .at(ph.node);
                    eprintln!("ngc: {} ({})", warning, ph.node);
                }
                generated.source
            })
        }
    };

    let rendered = match rendered {
        Ok(s) => s,
        Err(diag) => {
            eprintln!("ngc: {}", diag);
            std::process::exit(1);
        }
    };

    match &cli.output {
        Some(path) => {
            if let Err(e) = std::fs::write(path, &rendered) {
                eprintln!("ngc: error: {}: {}", path.display(), e);
                std::process::exit(2);
            }
            tracing::debug!(output = %path.display(), bytes = rendered.len(), "written");
        }
        None => print!("{}", rendered),
    }
}
