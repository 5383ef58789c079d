// `mod.rs` for the generated tree: declares every module and re-exports
// the family base types and the visitor.

use quote::{format_ident, quote};

use super::{format_tokens, ident, CodegenContext, GeneratedFile, MODULE_FILE};
use crate::domain::error::Result;

pub(super) fn emit_module(ctx: &CodegenContext<'_>) -> Result<GeneratedFile> {
    let header = ctx.header(&format!("Syntax tree of the `{}` grammar.", ctx.grammar().name));
    let families: Vec<_> = ctx.linked.families().collect();
    let modules = families
        .iter()
        .map(|f| ident(&f.module_name()))
        .collect::<Result<Vec<_>>>()?;
    let bases = families.iter().map(|f| format_ident!("{}", f.name));

    let tokens = quote! {
        #header
        #(pub mod #modules;)*
        pub mod visitor;

        #(pub use #modules::#bases;)*
        pub use visitor::Visitor;
    };

    let content = format_tokens(MODULE_FILE, tokens)?;
    Ok(GeneratedFile::new(MODULE_FILE, content))
}
