/// Ownership Classifier
///
/// Decides, from a field's declared type name, who is responsible for the
/// field's lifetime:
///
/// - `Borrowed`: a reference into data the node does not own (tokens).
///   Emitted as `&'src T`.
/// - `ValueDefaulted`: a self-initializing buffer. Declared and
///   default-initialized, never a constructor parameter.
/// - `OwnedDisposable`: everything else. The node owns it exclusively; a
///   reference to a sibling family is emitted as `Box<Family>`.

use serde::Deserialize;

use super::error::{GrammarError, Result};
use super::grammar::TypeRef;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OwnershipKind {
    OwnedDisposable,
    Borrowed,
    ValueDefaulted,
}

impl OwnershipKind {
    /// Whether the field shows up in the generated constructor.
    pub fn is_constructor_param(self) -> bool {
        self != OwnershipKind::ValueDefaulted
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OwnershipClassifier {
    pub borrowed: Vec<String>,
    pub defaulted: Vec<String>,
}

impl Default for OwnershipClassifier {
    fn default() -> Self {
        Self {
            borrowed: vec!["Token".to_string()],
            defaulted: vec!["String".to_string()],
        }
    }
}

impl OwnershipClassifier {
    /// Total over every type name; names on neither list are owned.
    pub fn classify_name(&self, name: &str) -> OwnershipKind {
        if self.borrowed.iter().any(|b| b == name) {
            OwnershipKind::Borrowed
        } else if self.defaulted.iter().any(|d| d == name) {
            OwnershipKind::ValueDefaulted
        } else {
            OwnershipKind::OwnedDisposable
        }
    }

    /// Classification of a whole field type. A generic is classified by its
    /// outer name: `List<Token>` owns its list even though the elements are
    /// borrowed.
    pub fn classify(&self, ty: &TypeRef) -> OwnershipKind {
        self.classify_name(&ty.name)
    }

    /// Whether the emitted type holds a borrow anywhere inside it.
    pub fn contains_borrow(&self, ty: &TypeRef) -> bool {
        self.classify(ty) == OwnershipKind::Borrowed
            || ty.args.iter().any(|arg| self.contains_borrow(arg))
    }

    pub fn is_listed(&self, name: &str) -> bool {
        self.classify_name(name) != OwnershipKind::OwnedDisposable
    }

    pub fn validate(&self) -> Result<()> {
        match self.borrowed.iter().find(|b| self.defaulted.contains(b)) {
            Some(name) => Err(GrammarError::ConflictingOwnership(name.clone())),
            None => Ok(()),
        }
    }
}
