use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::codegen::GeneratedOutput;
use crate::domain::grammar::Grammar;

/// Where the grammar comes from (embedded descriptor, file, ...).
pub trait GrammarSource {
    fn load(&self) -> Result<Grammar>;
}

/// Puts rendered modules on disk. Returns the paths written, in order.
pub trait OutputWriter {
    fn write(&self, output: &GeneratedOutput, dir: &Path) -> Result<Vec<PathBuf>>;
}
