//! Visitor Interface Emitter
//!
//! Aggregates every node of every family into one `Visitor` trait with a
//! required method per node. Adding a node to the grammar therefore breaks
//! every implementer until it handles the new node.

use proc_macro2::TokenStream;
use quote::{format_ident, quote};

use super::{format_tokens, ident, CodegenContext, GeneratedFile, VISITOR_FILE};
use crate::domain::error::Result;
use crate::domain::naming::to_snake_case;

pub(super) fn emit_visitor(ctx: &CodegenContext<'_>) -> Result<GeneratedFile> {
    let header = ctx.header("Visitor over every syntax tree node.");
    let uses = ctx.uses();
    let result = &ctx.result;
    let families = &ctx.grammar().families;

    let imports = families
        .iter()
        .map(|family| -> Result<TokenStream> {
            let module = ident(&family.module_name())?;
            let nodes: Vec<_> = family
                .nodes
                .iter()
                .map(|node| format_ident!("{}", family.node_type_name(node)))
                .collect();
            Ok(match nodes.as_slice() {
                [single] => quote!(use super::#module::#single;),
                _ => quote!(use super::#module::{#(#nodes),*};),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let methods = families.iter().flat_map(|family| {
        family.nodes.iter().map(move |node| {
            let type_name = family.node_type_name(node);
            let visit = format_ident!("visit_{}", to_snake_case(&type_name));
            let ty = ctx.node_ty_elided(family, node);
            let doc = format!(" Called by [`{}::accept`].", type_name);
            quote! {
                #[doc = #doc]
                fn #visit(&mut self, value: &#ty) -> #result;
            }
        })
    });

    let tokens = quote! {
        #header
        #(#imports)*
        #uses

        /// One handler per node type, in grammar order.
        pub trait Visitor {
            #(#methods)*
        }
    };

    let content = format_tokens(VISITOR_FILE, tokens)?;
    Ok(GeneratedFile::new(VISITOR_FILE, content))
}
