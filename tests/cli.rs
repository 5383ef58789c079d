//! Exercises the `generate_ast` binary as a build step would.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use ast_forge::config::GRAMMAR_ENV;
use tempfile::tempdir;

fn run(args: &[&Path], grammar: Option<&Path>) -> Output {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_generate_ast"));
    cmd.args(args).env_remove(GRAMMAR_ENV).env("RUST_LOG", "warn");
    if let Some(grammar) = grammar {
        cmd.env(GRAMMAR_ENV, grammar);
    }
    cmd.output().expect("failed to spawn generate_ast")
}

fn entries(dir: &Path) -> usize {
    fs::read_dir(dir).unwrap().count()
}

#[test]
fn test_no_arguments_is_a_usage_fault() {
    let output = run(&[], None);
    assert_eq!(output.status.code(), Some(64));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Usage: generate_ast <output directory>"));
}

#[test]
fn test_two_arguments_is_a_usage_fault_without_side_effects() {
    let first = tempdir().unwrap();
    let second = tempdir().unwrap();
    let output = run(&[first.path(), second.path()], None);

    assert_eq!(output.status.code(), Some(64));
    assert_eq!(entries(first.path()), 0);
    assert_eq!(entries(second.path()), 0);
}

#[test]
fn test_generates_into_output_directory() {
    let dir = tempdir().unwrap();
    let output = run(&[dir.path()], None);

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    for file in ["expr.rs", "stmt.rs", "visitor.rs", "mod.rs"] {
        assert!(dir.path().join(file).is_file(), "{} missing", file);
    }
    assert_eq!(entries(dir.path()), 4);
}

#[test]
fn test_missing_output_directory_is_an_io_fault() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("does-not-exist");
    let output = run(&[&missing], None);

    assert_eq!(output.status.code(), Some(74));
    assert!(!missing.exists());
}

#[test]
fn test_grammar_from_environment() {
    let dir = tempdir().unwrap();
    let grammar_dir = tempdir().unwrap();
    let grammar = grammar_dir.path().join("calc.toml");
    fs::write(
        &grammar,
        "name = \"calc\"\nresult = \"Option<f64>\"\n[[family]]\nname = \"Term\"\nnodes = [\"Number : f64 value\"]\n",
    )
    .unwrap();

    let output = run(&[dir.path()], Some(&grammar));
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let term = fs::read_to_string(dir.path().join("term.rs")).unwrap();
    assert!(term.contains("pub struct NumberTerm"));
    assert!(term.contains("pub value: f64"));
}

#[test]
fn test_malformed_grammar_is_a_data_fault() {
    let dir = tempdir().unwrap();
    let grammar_dir = tempdir().unwrap();
    let grammar = grammar_dir.path().join("broken.toml");
    fs::write(
        &grammar,
        "name = \"broken\"\n[[family]]\nname = \"Expr\"\nnodes = [\"Binary Expr left\"]\n",
    )
    .unwrap();

    let output = run(&[dir.path()], Some(&grammar));
    assert_eq!(output.status.code(), Some(65));
    assert_eq!(entries(dir.path()), 0);
}
