/// Grammar Faults
///
/// Everything that can be wrong with a grammar, from a single malformed
/// descriptor line up to a broken family dependency graph. All of them are
/// fatal: generation stops before any file is written.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GrammarError {
    #[error("descriptor `{line}`: expected exactly one `:` between class name and field list")]
    MissingSeparator { line: String },

    #[error("descriptor `{line}`: `{name}` is not a valid class name")]
    InvalidClassName { line: String, name: String },

    #[error("descriptor `{line}`: field `{field}` must be a `<type> <name>` pair")]
    MalformedField { line: String, field: String },

    #[error("descriptor `{line}`: cannot parse type `{ty}`")]
    MalformedType { line: String, ty: String },

    #[error("invalid grammar descriptor: {0}")]
    Descriptor(String),

    #[error("family `{0}` is declared more than once")]
    DuplicateFamily(String),

    #[error("family name `{0}` collides with a generated module name")]
    ReservedFamilyName(String),

    #[error("families `{first}` and `{second}` both generate module `{module}`")]
    ModuleCollision {
        first: String,
        second: String,
        module: String,
    },

    #[error("nodes `{first}` and `{second}` both generate visitor method `{method}`")]
    VisitorCollision {
        first: String,
        second: String,
        method: String,
    },

    #[error("family `{0}` declares no nodes")]
    EmptyFamily(String),

    #[error("family `{family}` declares `{class}` more than once")]
    DuplicateClass { family: String, class: String },

    #[error("node `{node}` declares field `{field}` more than once")]
    DuplicateField { node: String, field: String },

    #[error("family `{family}` depends on unknown family `{dependency}`")]
    UnknownDependency { family: String, dependency: String },

    #[error("family dependency cycle: {}", .0.join(" -> "))]
    DependencyCycle(Vec<String>),

    #[error("`{node}.{field}` references family `{target}`, which `{family}` does not depend on")]
    UndeclaredReference {
        family: String,
        node: String,
        field: String,
        target: String,
    },

    #[error("type `{0}` is listed as both borrowed and defaulted")]
    ConflictingOwnership(String),

    #[error("`{value}` is not a valid Rust {expected}")]
    InvalidRust { value: String, expected: &'static str },

    #[error("generated code for `{file}` does not parse: {message}")]
    Unparsable { file: String, message: String },
}

pub type Result<T> = std::result::Result<T, GrammarError>;
