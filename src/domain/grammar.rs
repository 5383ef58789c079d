/// Grammar Model
///
/// A grammar is an ordered list of node families. Each family groups the
/// node specifications that share one base type and one dispatch contract.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;

use super::error::{GrammarError, Result};
use super::naming::{is_identifier, to_snake_case};
use super::ownership::OwnershipClassifier;

/// Module names the generator claims for itself.
pub const RESERVED_MODULES: &[&str] = &["mod", "visitor"];

/// A field type as written in the grammar: `Expr`, `List<Expr>`, ...
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeRef {
    pub name: String,
    pub args: Vec<TypeRef>,
}

impl TypeRef {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: vec![],
        }
    }

    pub fn generic(name: impl Into<String>, args: Vec<TypeRef>) -> Self {
        Self {
            name: name.into(),
            args,
        }
    }

    /// Every type name mentioned by this reference, outermost first.
    pub fn names(&self) -> Vec<&str> {
        let mut out = vec![self.name.as_str()];
        for arg in &self.args {
            out.extend(arg.names());
        }
        out
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if !self.args.is_empty() {
            let args: Vec<String> = self.args.iter().map(|a| a.to_string()).collect();
            write!(f, "<{}>", args.join(", "))?;
        }
        Ok(())
    }
}

/// One `type name` pair of a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    pub ty: TypeRef,
    pub name: String,
}

/// One grammar row: a concrete node type and its ordered fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeSpec {
    pub class_name: String,
    pub fields: Vec<FieldSpec>,
}

impl fmt::Display for NodeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields: Vec<String> = self
            .fields
            .iter()
            .map(|field| format!("{} {}", field.ty, field.name))
            .collect();
        write!(f, "{} : {}", self.class_name, fields.join(", "))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Family {
    pub name: String,
    pub nodes: Vec<NodeSpec>,
    pub depends_on: Option<String>,
}

impl Family {
    /// Name of the generated concrete type, e.g. `BinaryExpr`.
    pub fn node_type_name(&self, node: &NodeSpec) -> String {
        format!("{}{}", node.class_name, self.name)
    }

    /// Name of the generated module (and file stem), e.g. `expr`.
    pub fn module_name(&self) -> String {
        to_snake_case(&self.name)
    }
}

/// Knobs that shape the emitted Rust without touching the node model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmitOptions {
    /// Return type of every dispatch operation.
    pub result: String,
    /// `use` trees emitted at the top of every generated module.
    pub uses: Vec<String>,
    pub derives: Vec<String>,
    /// Grammar type name -> Rust path.
    pub type_aliases: BTreeMap<String, String>,
    /// Generic containers that already put their elements on the heap, so a
    /// family reference inside them needs no extra `Box`.
    pub heap_containers: Vec<String>,
}

impl Default for EmitOptions {
    fn default() -> Self {
        Self {
            result: "Result<Value>".to_string(),
            uses: vec![],
            derives: vec!["Debug".to_string(), "Clone".to_string()],
            type_aliases: BTreeMap::new(),
            heap_containers: vec!["Vec".to_string()],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grammar {
    pub name: String,
    pub families: Vec<Family>,
    pub ownership: OwnershipClassifier,
    pub options: EmitOptions,
}

impl Grammar {
    pub fn new(name: impl Into<String>, families: Vec<Family>) -> Self {
        Self {
            name: name.into(),
            families,
            ownership: OwnershipClassifier::default(),
            options: EmitOptions::default(),
        }
    }

    pub fn family(&self, name: &str) -> Option<&Family> {
        self.families.iter().find(|f| f.name == name)
    }

    pub fn is_family(&self, name: &str) -> bool {
        self.family(name).is_some()
    }

    /// Check the per-family invariants: unique names, non-empty families,
    /// unique fields. Cross-family rules live in the linker.
    pub fn validate(&self) -> Result<()> {
        self.ownership.validate()?;

        let mut families = HashSet::new();
        // Generated names, keyed after snake_case, mapped to their source.
        let mut modules: HashMap<String, &str> = HashMap::new();
        let mut visits: HashMap<String, String> = HashMap::new();
        for family in &self.families {
            if !is_identifier(&family.name) {
                return Err(GrammarError::InvalidRust {
                    value: family.name.clone(),
                    expected: "family name",
                });
            }
            if !families.insert(family.name.as_str()) {
                return Err(GrammarError::DuplicateFamily(family.name.clone()));
            }
            if RESERVED_MODULES.contains(&family.module_name().as_str()) {
                return Err(GrammarError::ReservedFamilyName(family.name.clone()));
            }
            if let Some(first) = modules.insert(family.module_name(), &family.name) {
                return Err(GrammarError::ModuleCollision {
                    first: first.to_string(),
                    second: family.name.clone(),
                    module: family.module_name(),
                });
            }
            if family.nodes.is_empty() {
                return Err(GrammarError::EmptyFamily(family.name.clone()));
            }

            let mut classes = HashSet::new();
            for node in &family.nodes {
                if !classes.insert(node.class_name.as_str()) {
                    return Err(GrammarError::DuplicateClass {
                        family: family.name.clone(),
                        class: node.class_name.clone(),
                    });
                }

                let type_name = family.node_type_name(node);
                let method = format!("visit_{}", to_snake_case(&type_name));
                if let Some(first) = visits.insert(method.clone(), type_name.clone()) {
                    return Err(GrammarError::VisitorCollision {
                        first,
                        second: type_name,
                        method,
                    });
                }

                // `currentStr` and `current_str` land on the same Rust field.
                let mut fields = HashSet::new();
                for field in &node.fields {
                    if !fields.insert(to_snake_case(&field.name)) {
                        return Err(GrammarError::DuplicateField {
                            node: family.node_type_name(node),
                            field: field.name.clone(),
                        });
                    }
                }
            }
        }
        Ok(())
    }
}
