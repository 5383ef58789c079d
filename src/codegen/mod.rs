//! Rust code generation for a linked grammar.
//!
//! Every module is built as a `TokenStream`, parsed back with `syn` and
//! printed with `prettyplease`, so a grammar that would produce invalid Rust
//! fails here instead of in the consuming crate.

mod module_emitter;
mod node_emitter;
mod types;
mod visitor_emitter;

use std::path::PathBuf;

use proc_macro2::{Span, TokenStream};
use quote::{format_ident, quote};
use syn::Ident;

use crate::domain::error::{GrammarError, Result};
use crate::domain::grammar::Grammar;
use crate::domain::linker::{link, LinkedGrammar};

/// File name of the aggregated visitor module.
pub const VISITOR_FILE: &str = "visitor.rs";
/// File name of the module root that ties the generated files together.
pub const MODULE_FILE: &str = "mod.rs";

/// Everything one generator run produces, in write order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeneratedOutput {
    pub files: Vec<GeneratedFile>,
}

impl GeneratedOutput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_file(&mut self, file: GeneratedFile) {
        self.files.push(file);
    }

    pub fn file(&self, path: &str) -> Option<&GeneratedFile> {
        self.files.iter().find(|f| f.path == PathBuf::from(path))
    }
}

/// A single generated module. `path` is relative to the output directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    pub path: PathBuf,
    pub content: String,
}

impl GeneratedFile {
    pub fn new(path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }
}

/// Link `grammar` and render every module it implies: one per family in
/// dependency order, then the visitor, then `mod.rs`.
pub fn render(grammar: &Grammar) -> Result<GeneratedOutput> {
    let linked = link(grammar)?;
    let ctx = CodegenContext::new(&linked)?;

    let mut output = GeneratedOutput::new();
    for family in linked.families() {
        output.add_file(node_emitter::emit_family(&ctx, family)?);
    }
    output.add_file(visitor_emitter::emit_visitor(&ctx)?);
    output.add_file(module_emitter::emit_module(&ctx)?);
    Ok(output)
}

/// Grammar options parsed into `syn` form once per run.
pub(crate) struct CodegenContext<'a> {
    linked: &'a LinkedGrammar<'a>,
    result: syn::Type,
    uses: Vec<syn::UseTree>,
    derives: Vec<syn::Path>,
}

impl<'a> CodegenContext<'a> {
    fn new(linked: &'a LinkedGrammar<'a>) -> Result<Self> {
        let options = &linked.grammar().options;

        let result = syn::parse_str(&options.result).map_err(|_| GrammarError::InvalidRust {
            value: options.result.clone(),
            expected: "result type",
        })?;
        let uses = options
            .uses
            .iter()
            .map(|u| {
                syn::parse_str(u).map_err(|_| GrammarError::InvalidRust {
                    value: u.clone(),
                    expected: "use tree",
                })
            })
            .collect::<Result<_>>()?;
        let derives = options
            .derives
            .iter()
            .map(|d| {
                syn::parse_str(d).map_err(|_| GrammarError::InvalidRust {
                    value: d.clone(),
                    expected: "derive path",
                })
            })
            .collect::<Result<_>>()?;

        Ok(Self {
            linked,
            result,
            uses,
            derives,
        })
    }

    fn grammar(&self) -> &'a Grammar {
        self.linked.grammar()
    }

    /// Module-level docs shared by every generated file.
    fn header(&self, title: &str) -> TokenStream {
        let lines = [
            format!(" {}", title),
            String::new(),
            format!(
                " Generated by `generate_ast` from the `{}` grammar. Do not edit by hand.",
                self.grammar().name
            ),
        ];
        quote! {
            #(#![doc = #lines])*
            #![allow(unused_imports)]
        }
    }

    fn uses(&self) -> TokenStream {
        let uses = &self.uses;
        quote! { #(use #uses;)* }
    }

    fn derives(&self) -> TokenStream {
        if self.derives.is_empty() {
            return quote!();
        }
        let derives = &self.derives;
        quote! { #[derive(#(#derives),*)] }
    }
}

/// Identifier for a grammar name, falling back to a raw identifier for
/// Rust keywords (`type` -> `r#type`).
fn ident(name: &str) -> Result<Ident> {
    if syn::parse_str::<Ident>(name).is_ok() {
        return Ok(format_ident!("{}", name));
    }
    match name {
        "self" | "Self" | "super" | "crate" | "_" | "" => Err(GrammarError::InvalidRust {
            value: name.to_string(),
            expected: "identifier",
        }),
        _ => Ok(Ident::new_raw(name, Span::call_site())),
    }
}

fn format_tokens(file: &str, tokens: TokenStream) -> Result<String> {
    let syntax_tree = syn::parse2::<syn::File>(tokens).map_err(|e| GrammarError::Unparsable {
        file: file.to_string(),
        message: e.to_string(),
    })?;
    Ok(prettyplease::unparse(&syntax_tree))
}
