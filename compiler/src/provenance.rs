// provenance.rs — Build identity for generated procedures
//
// `graph_hash`: SHA-256 of `Graph::canonical_json()` (compact JSON).
// `compiler_version`: crate version from `Cargo.toml`.
//
// Two compiles with equal provenance produce byte-identical source.

use std::fmt::Write as _;

use sha2::{Digest, Sha256};

use crate::graph::Graph;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Provenance {
    pub graph_hash: [u8; 32],
    pub compiler_version: &'static str,
}

impl Provenance {
    /// Hex string of the graph hash (64 characters).
    pub fn graph_hash_hex(&self) -> String {
        let mut s = String::with_capacity(64);
        for b in &self.graph_hash {
            let _ = write!(s, "{:02x}", b);
        }
        s
    }

    /// Serialize provenance as a JSON string for `--emit build-info`.
    pub fn to_json(&self) -> String {
        let value = serde_json::json!({
            "graph_hash": self.graph_hash_hex(),
            "compiler_version": self.compiler_version,
        });
        let mut text = serde_json::to_string_pretty(&value).unwrap_or_default();
        text.push('\n');
        text
    }
}

pub fn compute_provenance(graph: &Graph) -> Provenance {
    let mut hasher = Sha256::new();
    hasher.update(graph.canonical_json().as_bytes());
    let mut graph_hash = [0u8; 32];
    graph_hash.copy_from_slice(&hasher.finalize());
    Provenance {
        graph_hash,
        compiler_version: env!("CARGO_PKG_VERSION"),
    }
}
