use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::codegen;
use crate::ports::{GrammarSource, OutputWriter};

/// Outcome of one generator run.
#[derive(Debug)]
pub struct GenerationReport {
    pub grammar: String,
    pub families: usize,
    pub nodes: usize,
    pub files: Vec<PathBuf>,
}

pub struct GenerateUsecase<'a> {
    pub source: &'a dyn GrammarSource,
    pub writer: &'a dyn OutputWriter,
}

impl<'a> GenerateUsecase<'a> {
    /// Load, link and render the whole grammar, then hand it to the writer.
    /// Nothing reaches the writer unless every module rendered.
    pub fn run(&self, out_dir: &Path) -> Result<GenerationReport> {
        let grammar = self.source.load()?;
        let output = codegen::render(&grammar)?;
        let files = self.writer.write(&output, out_dir)?;

        Ok(GenerationReport {
            grammar: grammar.name.clone(),
            families: grammar.families.len(),
            nodes: grammar.families.iter().map(|f| f.nodes.len()).sum(),
            files,
        })
    }
}
