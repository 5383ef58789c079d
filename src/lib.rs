// Main library entry point for AST Forge.
//
// Generates syntax tree node families and their visitor from a grammar
// descriptor. Usable from the `generate_ast` binary or a `build.rs`:
//
//     let grammar = ast_forge::parse_grammar(include_str!("grammar.toml"))?;
//     ast_forge::generate(&grammar, &out_dir)?;

pub mod application;
pub mod codegen;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod ports;

use std::path::{Path, PathBuf};

pub use codegen::{render, GeneratedFile, GeneratedOutput};
pub use domain::error::GrammarError;
pub use domain::grammar::Grammar;
pub use infrastructure::parse_grammar;

use ports::OutputWriter;

/// Render `grammar` and write every module into `out_dir`.
pub fn generate(grammar: &Grammar, out_dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let output = render(grammar)?;
    infrastructure::StagedFileWriter.write(&output, out_dir)
}
