/// Family Linker
///
/// Resolves the dependency graph between families (statements depend on
/// expressions, ...), fixes the emission order and works out which generated
/// types need the `'src` lifetime.
///
/// A family may only reference its own base type or the base type of a
/// family it (transitively) depends on. Its module imports every such
/// dependency before any of its own declarations.

use std::collections::{BTreeSet, HashMap};

use super::error::{GrammarError, Result};
use super::grammar::{Family, Grammar, NodeSpec, TypeRef};
use super::ownership::OwnershipKind;

/// Types every Rust crate has in scope; never worth a classification warning.
const BUILTIN_TYPES: &[&str] = &[
    "Box", "Option", "Vec", "String", "bool", "char", "u8", "u16", "u32", "u64", "usize", "i8",
    "i16", "i32", "i64", "isize", "f32", "f64",
];

#[derive(Debug)]
pub struct LinkedGrammar<'g> {
    grammar: &'g Grammar,
    /// Family indices, dependencies before dependents.
    order: Vec<usize>,
    /// Families whose base enum carries `'src`.
    borrowing: BTreeSet<String>,
}

#[derive(Clone, Copy, PartialEq)]
enum Mark {
    Visiting,
    Done,
}

pub fn link(grammar: &Grammar) -> Result<LinkedGrammar<'_>> {
    grammar.validate()?;

    for family in &grammar.families {
        if let Some(dep) = &family.depends_on {
            if !grammar.is_family(dep) {
                return Err(GrammarError::UnknownDependency {
                    family: family.name.clone(),
                    dependency: dep.clone(),
                });
            }
        }
    }

    let order = emission_order(grammar)?;
    let linked = LinkedGrammar {
        grammar,
        order,
        borrowing: borrowing_families(grammar),
    };
    linked.check_references()?;

    tracing::debug!(
        order = ?linked.families().map(|f| f.name.as_str()).collect::<Vec<_>>(),
        borrowing = ?linked.borrowing,
        "linked grammar `{}`",
        grammar.name
    );
    for name in linked.unrecognized_types() {
        tracing::warn!("type `{}` is not a family or a known type; treating it as owned", name);
    }

    Ok(linked)
}

/// Depth-first topological sort that keeps declaration order among
/// families with no ordering constraint between them.
fn emission_order(grammar: &Grammar) -> Result<Vec<usize>> {
    let index: HashMap<&str, usize> = grammar
        .families
        .iter()
        .enumerate()
        .map(|(i, f)| (f.name.as_str(), i))
        .collect();
    let mut marks: HashMap<usize, Mark> = HashMap::new();
    let mut order = Vec::with_capacity(grammar.families.len());

    for start in 0..grammar.families.len() {
        let mut path: Vec<usize> = Vec::new();
        let mut current = Some(start);
        while let Some(i) = current {
            match marks.get(&i).copied() {
                Some(Mark::Done) => break,
                Some(Mark::Visiting) => {
                    let mut cycle: Vec<String> = path
                        .iter()
                        .skip_while(|&&p| p != i)
                        .map(|&p| grammar.families[p].name.clone())
                        .collect();
                    cycle.push(grammar.families[i].name.clone());
                    return Err(GrammarError::DependencyCycle(cycle));
                }
                None => {
                    marks.insert(i, Mark::Visiting);
                    path.push(i);
                    current = grammar.families[i]
                        .depends_on
                        .as_deref()
                        .and_then(|dep| index.get(dep).copied());
                }
            }
        }
        // The chain is finished: emit deepest dependency first.
        for &i in path.iter().rev() {
            marks.insert(i, Mark::Done);
            order.push(i);
        }
    }
    Ok(order)
}

/// Fixpoint: a family borrows if any node holds a borrowed value or a
/// reference to a borrowing family.
fn borrowing_families(grammar: &Grammar) -> BTreeSet<String> {
    let mut borrowing = BTreeSet::new();
    loop {
        let mut changed = false;
        for family in &grammar.families {
            if borrowing.contains(&family.name) {
                continue;
            }
            if family.nodes.iter().any(|n| node_borrows(grammar, &borrowing, n)) {
                borrowing.insert(family.name.clone());
                changed = true;
            }
        }
        if !changed {
            return borrowing;
        }
    }
}

fn node_borrows(grammar: &Grammar, borrowing: &BTreeSet<String>, node: &NodeSpec) -> bool {
    node.fields.iter().any(|field| {
        grammar.ownership.contains_borrow(&field.ty)
            || field.ty.names().iter().any(|name| borrowing.contains(*name))
    })
}

impl<'g> LinkedGrammar<'g> {
    pub fn grammar(&self) -> &'g Grammar {
        self.grammar
    }

    /// Families in emission order.
    pub fn families(&self) -> impl Iterator<Item = &'g Family> + '_ {
        self.order.iter().map(|&i| &self.grammar.families[i])
    }

    /// The chain of families `family` depends on, in emission order.
    pub fn dependencies(&self, family: &Family) -> Vec<&'g Family> {
        let mut chain = Vec::new();
        let mut next = family.depends_on.as_deref();
        while let Some(name) = next {
            let Some(dep) = self.grammar.family(name) else {
                break;
            };
            chain.push(dep);
            next = dep.depends_on.as_deref();
        }
        chain.reverse();
        chain
    }

    pub fn family_borrows(&self, name: &str) -> bool {
        self.borrowing.contains(name)
    }

    pub fn node_borrows(&self, node: &NodeSpec) -> bool {
        node_borrows(self.grammar, &self.borrowing, node)
    }

    pub fn classify(&self, field_ty: &TypeRef) -> OwnershipKind {
        self.grammar.ownership.classify(field_ty)
    }

    fn check_references(&self) -> Result<()> {
        for family in &self.grammar.families {
            let reachable: Vec<&str> = std::iter::once(family.name.as_str())
                .chain(self.dependencies(family).into_iter().map(|d| d.name.as_str()))
                .collect();
            for node in &family.nodes {
                for field in &node.fields {
                    let stray = field
                        .ty
                        .names()
                        .into_iter()
                        .find(|name| self.grammar.is_family(name) && !reachable.contains(name));
                    if let Some(target) = stray {
                        return Err(GrammarError::UndeclaredReference {
                            family: family.name.clone(),
                            node: family.node_type_name(node),
                            field: field.name.clone(),
                            target: target.to_string(),
                        });
                    }
                }
            }
        }
        Ok(())
    }

    /// Type names that fall through to `OwnedDisposable` without anything
    /// in the grammar vouching for them.
    pub fn unrecognized_types(&self) -> BTreeSet<&'g str> {
        let grammar = self.grammar;
        let options = &grammar.options;
        grammar
            .families
            .iter()
            .flat_map(|f| f.nodes.iter())
            .flat_map(|n| n.fields.iter())
            .flat_map(|field| field.ty.names())
            .filter(|name| {
                !grammar.is_family(name)
                    && !grammar.ownership.is_listed(name)
                    && !options.type_aliases.contains_key(*name)
                    && !options.heap_containers.iter().any(|h| h == name)
                    && !BUILTIN_TYPES.contains(name)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::descriptor::parse;

    fn family(name: &str, depends_on: Option<&str>, rows: &[&str]) -> Family {
        Family {
            name: name.to_string(),
            nodes: rows.iter().map(|row| parse(row).unwrap()).collect(),
            depends_on: depends_on.map(str::to_string),
        }
    }

    fn names<'a>(linked: &LinkedGrammar<'a>) -> Vec<&'a str> {
        linked.families().map(|f| f.name.as_str()).collect()
    }

    #[test]
    fn test_dependencies_emitted_first() {
        let grammar = Grammar::new(
            "test",
            vec![
                family("Stmt", Some("Expr"), &["Expression : Expr expression"]),
                family("Expr", None, &["Literal : Variant value"]),
            ],
        );
        let linked = link(&grammar).unwrap();
        assert_eq!(names(&linked), vec!["Expr", "Stmt"]);
    }

    #[test]
    fn test_declaration_order_kept_without_constraints() {
        let grammar = Grammar::new(
            "test",
            vec![
                family("Expr", None, &["Literal : Variant value"]),
                family("Pattern", None, &["Wild : Token underscore"]),
                family("Stmt", Some("Expr"), &["Expression : Expr expression"]),
            ],
        );
        let linked = link(&grammar).unwrap();
        assert_eq!(names(&linked), vec!["Expr", "Pattern", "Stmt"]);
    }

    #[test]
    fn test_transitive_chain() {
        let grammar = Grammar::new(
            "test",
            vec![
                family("Item", Some("Stmt"), &["Fn : Token name, List<Stmt> body, Expr ret"]),
                family("Stmt", Some("Expr"), &["Expression : Expr expression"]),
                family("Expr", None, &["Literal : Variant value"]),
            ],
        );
        let linked = link(&grammar).unwrap();
        assert_eq!(names(&linked), vec!["Expr", "Stmt", "Item"]);

        let item = grammar.family("Item").unwrap();
        let deps: Vec<&str> = linked.dependencies(item).iter().map(|f| f.name.as_str()).collect();
        assert_eq!(deps, vec!["Expr", "Stmt"]);
    }

    #[test]
    fn test_unknown_dependency_rejected() {
        let grammar = Grammar::new(
            "test",
            vec![family("Stmt", Some("Expr"), &["Print : Token keyword"])],
        );
        assert!(matches!(
            link(&grammar),
            Err(GrammarError::UnknownDependency { dependency, .. }) if dependency == "Expr"
        ));
    }

    #[test]
    fn test_cycle_rejected() {
        let grammar = Grammar::new(
            "test",
            vec![
                family("Expr", Some("Stmt"), &["Literal : Variant value"]),
                family("Stmt", Some("Expr"), &["Print : Token keyword"]),
            ],
        );
        match link(&grammar) {
            Err(GrammarError::DependencyCycle(cycle)) => {
                assert_eq!(cycle, vec!["Expr", "Stmt", "Expr"]);
            }
            other => panic!("expected a cycle, got {:?}", other),
        }
    }

    #[test]
    fn test_self_dependency_rejected() {
        let grammar = Grammar::new(
            "test",
            vec![family("Expr", Some("Expr"), &["Literal : Variant value"])],
        );
        assert!(matches!(link(&grammar), Err(GrammarError::DependencyCycle(_))));
    }

    #[test]
    fn test_reference_to_dependent_rejected() {
        let grammar = Grammar::new(
            "test",
            vec![
                family("Expr", None, &["Lambda : List<Stmt> body"]),
                family("Stmt", Some("Expr"), &["Expression : Expr expression"]),
            ],
        );
        assert!(matches!(
            link(&grammar),
            Err(GrammarError::UndeclaredReference { target, .. }) if target == "Stmt"
        ));
    }

    #[test]
    fn test_lifetime_propagates_through_family_references() {
        let grammar = Grammar::new(
            "test",
            vec![
                family("Expr", None, &["Literal : Variant value", "Variable : Token name"]),
                family("Stmt", Some("Expr"), &["Expression : Expr expression", "Break : Variant label"]),
                family("Type", None, &["Named : String name"]),
            ],
        );
        let linked = link(&grammar).unwrap();
        assert!(linked.family_borrows("Expr"));
        assert!(linked.family_borrows("Stmt"));
        assert!(!linked.family_borrows("Type"));

        let expr = grammar.family("Expr").unwrap();
        assert!(!linked.node_borrows(&expr.nodes[0]));
        assert!(linked.node_borrows(&expr.nodes[1]));
        let stmt = grammar.family("Stmt").unwrap();
        assert!(linked.node_borrows(&stmt.nodes[0]));
        assert!(!linked.node_borrows(&stmt.nodes[1]));
    }

    #[test]
    fn test_unrecognized_types_reported() {
        let grammar = Grammar::new(
            "test",
            vec![family("Expr", None, &["Literal : Variant value, Option<Expr> next, Token t"])],
        );
        let linked = link(&grammar).unwrap();
        assert_eq!(linked.unrecognized_types().into_iter().collect::<Vec<_>>(), vec!["Variant"]);
    }
}
