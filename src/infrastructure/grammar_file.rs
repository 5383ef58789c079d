/// Grammar Descriptor Files
///
/// Grammars are TOML documents: emission options at the top, then one
/// `[[family]]` table per family holding its node rows. The ijo grammar ships
/// embedded in the binary; any other descriptor can be loaded from disk.

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::domain::descriptor;
use crate::domain::error::GrammarError;
use crate::domain::grammar::{EmitOptions, Family, Grammar};
use crate::domain::ownership::OwnershipClassifier;
use crate::ports::GrammarSource;

/// The grammar used when no descriptor file is configured.
pub const EMBEDDED_GRAMMAR: &str = include_str!("../../grammar/ijo.toml");

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GrammarDescriptor {
    pub name: String,
    #[serde(default)]
    pub result: Option<String>,
    #[serde(default)]
    pub uses: Vec<String>,
    #[serde(default)]
    pub derives: Option<Vec<String>>,
    #[serde(default)]
    pub heap_containers: Option<Vec<String>>,
    #[serde(default)]
    pub ownership: OwnershipClassifier,
    /// Grammar type name -> Rust path
    #[serde(default)]
    pub types: BTreeMap<String, String>,
    #[serde(rename = "family", default)]
    pub families: Vec<FamilyDescriptor>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FamilyDescriptor {
    pub name: String,
    #[serde(default)]
    pub depends_on: Option<String>,
    pub nodes: Vec<String>,
}

impl GrammarDescriptor {
    pub fn from_toml(content: &str) -> Result<Self, GrammarError> {
        toml::from_str(content).map_err(|e| GrammarError::Descriptor(e.to_string()))
    }

    /// Parse every node row. The first malformed row aborts the conversion.
    /// A descriptor relying on the default `result` must also list `uses`.
    pub fn into_grammar(self) -> Result<Grammar, GrammarError> {
        let defaults = EmitOptions::default();
        let result_defaulted = self.result.is_none();
        let options = EmitOptions {
            result: self.result.unwrap_or(defaults.result),
            uses: self.uses,
            derives: self.derives.unwrap_or(defaults.derives),
            type_aliases: self.types,
            heap_containers: self.heap_containers.unwrap_or(defaults.heap_containers),
        };

        let families = self
            .families
            .into_iter()
            .map(|family| -> Result<Family, GrammarError> {
                let nodes = family
                    .nodes
                    .iter()
                    .map(|row| descriptor::parse(row))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Family {
                    name: family.name,
                    nodes,
                    depends_on: family.depends_on,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        if result_defaulted && options.uses.is_empty() {
            return Err(GrammarError::Descriptor(format!(
                "`result` defaults to `{}`, which needs `uses` to bring its types into scope; \
                 list `uses` or set `result` explicitly",
                options.result
            )));
        }

        Ok(Grammar {
            name: self.name,
            families,
            ownership: self.ownership,
            options,
        })
    }
}

/// Parse and structurally validate a TOML grammar descriptor.
pub fn parse_grammar(content: &str) -> Result<Grammar, GrammarError> {
    let grammar = GrammarDescriptor::from_toml(content)?.into_grammar()?;
    grammar.validate()?;
    Ok(grammar)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TomlGrammarSource {
    Embedded,
    File(PathBuf),
}

impl GrammarSource for TomlGrammarSource {
    fn load(&self) -> Result<Grammar> {
        match self {
            TomlGrammarSource::Embedded => {
                tracing::debug!("using embedded grammar");
                Ok(parse_grammar(EMBEDDED_GRAMMAR)?)
            }
            TomlGrammarSource::File(path) => {
                tracing::debug!("loading grammar from {}", path.display());
                let content = fs::read_to_string(path)
                    .with_context(|| format!("Failed to read grammar {}", path.display()))?;
                let grammar = parse_grammar(&content)
                    .with_context(|| format!("Invalid grammar {}", path.display()))?;
                Ok(grammar)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ownership::OwnershipKind;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_embedded_grammar_loads() {
        let grammar = TomlGrammarSource::Embedded.load().unwrap();
        assert_eq!(grammar.name, "ijo");
        let names: Vec<&str> = grammar.families.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["Expr", "Stmt"]);
        assert_eq!(grammar.family("Stmt").unwrap().depends_on.as_deref(), Some("Expr"));
        assert_eq!(grammar.family("Expr").unwrap().nodes.len(), 8);
        assert_eq!(grammar.family("Stmt").unwrap().nodes.len(), 7);
        assert_eq!(grammar.options.type_aliases.get("List").map(String::as_str), Some("Vec"));
        assert_eq!(grammar.ownership.classify_name("Token"), OwnershipKind::Borrowed);
    }

    #[test]
    fn test_defaults_fill_missing_options() {
        let grammar = parse_grammar(
            r#"
            name = "tiny"
            uses = ["crate::value::Value"]

            [[family]]
            name = "Expr"
            nodes = ["Literal : Variant value"]
            "#,
        )
        .unwrap();
        let defaults = EmitOptions::default();
        assert_eq!(grammar.options.result, defaults.result);
        assert_eq!(grammar.options.derives, defaults.derives);
        assert_eq!(grammar.options.heap_containers, defaults.heap_containers);
        assert!(grammar.options.type_aliases.is_empty());
        assert_eq!(grammar.ownership, OwnershipClassifier::default());
    }

    #[test]
    fn test_default_result_requires_uses() {
        let err = parse_grammar(
            r#"
            name = "bare"

            [[family]]
            name = "Expr"
            nodes = ["Literal : Variant value"]
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, GrammarError::Descriptor(message) if message.contains("`uses`")));

        let explicit = parse_grammar(
            r#"
            name = "bare"
            result = "Option<f64>"

            [[family]]
            name = "Expr"
            nodes = ["Literal : Variant value"]
            "#,
        )
        .unwrap();
        assert!(explicit.options.uses.is_empty());
        assert_eq!(explicit.options.result, "Option<f64>");
    }

    #[test]
    fn test_malformed_row_aborts() {
        let err = parse_grammar(
            r#"
            name = "broken"

            [[family]]
            name = "Expr"
            nodes = ["Literal : Variant value", "Binary Expr left"]
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, GrammarError::MissingSeparator { line } if line == "Binary Expr left"));
    }

    #[test]
    fn test_unknown_key_rejected() {
        let err = parse_grammar("name = \"x\"\nfamilies = []\n").unwrap_err();
        assert!(matches!(err, GrammarError::Descriptor(_)));
    }

    #[test]
    fn test_file_source() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "name = \"from_disk\"\nresult = \"()\"").unwrap();
        writeln!(file, "[[family]]\nname = \"Expr\"\nnodes = [\"Literal : Variant value\"]").unwrap();

        let grammar = TomlGrammarSource::File(file.path().to_path_buf()).load().unwrap();
        assert_eq!(grammar.name, "from_disk");

        let missing = TomlGrammarSource::File(PathBuf::from("/nonexistent/grammar.toml"));
        assert!(missing.load().is_err());
    }
}
