// Infrastructure adapters for AST Forge: grammar files, staged output, logging.

pub mod grammar_file;
pub mod logging;
pub mod staged_writer;

pub use grammar_file::{parse_grammar, GrammarDescriptor, TomlGrammarSource};
pub use staged_writer::StagedFileWriter;
