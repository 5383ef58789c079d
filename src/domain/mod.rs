// Core generation model for AST Forge.
// Grammar description, descriptor parsing, ownership rules and family linking.

pub mod descriptor;
pub mod error;
pub mod grammar;
pub mod linker;
pub mod naming;
pub mod ownership;
