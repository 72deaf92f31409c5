// ngc — Node Graph Compiler
//
// Library root. A graph of typed operator nodes goes in; a flat,
// dependency-ordered procedure comes out.

pub mod codegen;
pub mod diag;
pub mod dot;
pub mod graph;
pub mod index;
pub mod lower;
pub mod primitives;
pub mod provenance;

pub use codegen::{compile, compile_kinematics, compile_with_options};
