//! Runtime configuration.
//!
//! The command line only carries the output directory, so everything else
//! comes from the environment:
//! - `AST_FORGE_GRAMMAR`: path to a grammar descriptor replacing the
//!   embedded ijo grammar.
//! - `RUST_LOG`: log filter (see `infrastructure::logging`).

use std::path::PathBuf;

use crate::infrastructure::TomlGrammarSource;

pub const GRAMMAR_ENV: &str = "AST_FORGE_GRAMMAR";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeneratorConfig {
    pub grammar_path: Option<PathBuf>,
}

impl GeneratorConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let grammar_path = lookup(GRAMMAR_ENV)
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from);
        Self { grammar_path }
    }

    pub fn grammar_source(&self) -> TomlGrammarSource {
        match &self.grammar_path {
            Some(path) => TomlGrammarSource::File(path.clone()),
            None => TomlGrammarSource::Embedded,
        }
    }
}
