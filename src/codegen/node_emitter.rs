//! Node Class Emitter
//!
//! One module per family: the family's closed base enum with its single
//! dispatch operation, then one concrete struct per node in grammar order.

use proc_macro2::TokenStream;
use quote::{format_ident, quote};

use super::{format_tokens, ident, CodegenContext, GeneratedFile};
use crate::domain::error::Result;
use crate::domain::grammar::{Family, NodeSpec};
use crate::domain::naming::to_snake_case;

/// Beyond this many parameters clippy starts complaining about `new`.
const CLIPPY_MAX_ARGS: usize = 7;

pub(super) fn emit_family(ctx: &CodegenContext<'_>, family: &Family) -> Result<GeneratedFile> {
    let header = ctx.header(&format!("`{}` syntax tree nodes.", family.name));

    // Dependencies come first so nothing below refers to an unknown type.
    let dependencies = ctx
        .linked
        .dependencies(family)
        .into_iter()
        .map(|dep| -> Result<TokenStream> {
            let module = ident(&dep.module_name())?;
            let base = format_ident!("{}", dep.name);
            Ok(quote!(use super::#module::#base;))
        })
        .collect::<Result<Vec<_>>>()?;
    let uses = ctx.uses();
    let base = emit_base(ctx, family)?;
    let nodes = family
        .nodes
        .iter()
        .map(|node| emit_node(ctx, family, node))
        .collect::<Result<Vec<_>>>()?;

    let tokens = quote! {
        #header
        #(#dependencies)*
        use super::visitor::Visitor;
        #uses

        #base
        #(#nodes)*
    };

    let file_name = format!("{}.rs", family.module_name());
    let content = format_tokens(&file_name, tokens)?;
    tracing::debug!("rendered {} ({} nodes)", file_name, family.nodes.len());
    Ok(GeneratedFile::new(file_name, content))
}

fn emit_base(ctx: &CodegenContext<'_>, family: &Family) -> Result<TokenStream> {
    let base = format_ident!("{}", family.name);
    let generics = ctx.generics(ctx.linked.family_borrows(&family.name));
    let derives = ctx.derives();
    let result = &ctx.result;
    let doc = format!(
        " Any node of the `{}` family. Dispatch to a [`Visitor`] with `accept`.",
        family.name
    );

    let mut variants = Vec::with_capacity(family.nodes.len());
    let mut arms = Vec::with_capacity(family.nodes.len());
    for node in &family.nodes {
        let variant = ident(&node.class_name)?;
        let ty = ctx.node_ty(family, node);
        variants.push(quote!(#variant(#ty)));
        arms.push(quote!(Self::#variant(node) => node.accept(visitor)));
    }

    Ok(quote! {
        #[doc = #doc]
        #derives
        pub enum #base #generics {
            #(#variants,)*
        }

        impl #generics #base #generics {
            pub fn accept<V: Visitor + ?Sized>(&self, visitor: &mut V) -> #result {
                match self {
                    #(#arms,)*
                }
            }
        }
    })
}

fn emit_node(ctx: &CodegenContext<'_>, family: &Family, node: &NodeSpec) -> Result<TokenStream> {
    let type_name = family.node_type_name(node);
    let name = format_ident!("{}", type_name);
    let generics = ctx.generics(ctx.linked.node_borrows(node));
    let base = ctx.family_ty(&family.name);
    let base_generics = ctx.generics(ctx.linked.family_borrows(&family.name));
    let variant = ident(&node.class_name)?;
    let visit = format_ident!("visit_{}", to_snake_case(&type_name));
    let derives = ctx.derives();
    let result = &ctx.result;
    let doc = format!(" `{}`", node);

    let mut fields = Vec::with_capacity(node.fields.len());
    let mut params = Vec::new();
    let mut inits = Vec::with_capacity(node.fields.len());
    for field in &node.fields {
        let field_name = ident(&to_snake_case(&field.name))?;
        let ty = ctx.field_ty(&field.ty)?;
        fields.push(quote!(pub #field_name: #ty));
        if ctx.linked.classify(&field.ty).is_constructor_param() {
            params.push(quote!(#field_name: #ty));
            inits.push(quote!(#field_name));
        } else {
            inits.push(quote!(#field_name: Default::default()));
        }
    }
    let allow_many_args =
        (params.len() > CLIPPY_MAX_ARGS).then(|| quote!(#[allow(clippy::too_many_arguments)]));

    Ok(quote! {
        #[doc = #doc]
        #derives
        pub struct #name #generics {
            #(#fields,)*
        }

        impl #generics #name #generics {
            #allow_many_args
            pub fn new(#(#params),*) -> Self {
                Self {
                    #(#inits,)*
                }
            }

            pub fn accept<V: Visitor + ?Sized>(&self, visitor: &mut V) -> #result {
                visitor.#visit(self)
            }
        }

        impl #base_generics From<#name #generics> for #base {
            fn from(node: #name #generics) -> Self {
                Self::#variant(node)
            }
        }
    })
}
