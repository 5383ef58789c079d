// Field type rendering: ownership kinds onto Rust ownership.

use proc_macro2::TokenStream;
use quote::{format_ident, quote};

use super::CodegenContext;
use crate::domain::error::{GrammarError, Result};
use crate::domain::grammar::{Family, NodeSpec, TypeRef};
use crate::domain::ownership::OwnershipKind;

impl<'a> CodegenContext<'a> {
    pub(super) fn generics(&self, borrows: bool) -> TokenStream {
        if borrows {
            quote!(<'src>)
        } else {
            quote!()
        }
    }

    /// `Expr<'src>` or `Expr`.
    pub(super) fn family_ty(&self, family: &str) -> TokenStream {
        let ident = format_ident!("{}", family);
        let generics = self.generics(self.linked.family_borrows(family));
        quote!(#ident #generics)
    }

    /// `BinaryExpr<'src>` or `LiteralExpr`.
    pub(super) fn node_ty(&self, family: &Family, node: &NodeSpec) -> TokenStream {
        let ident = format_ident!("{}", family.node_type_name(node));
        let generics = self.generics(self.linked.node_borrows(node));
        quote!(#ident #generics)
    }

    /// Same as [`Self::node_ty`] with the lifetime elided, for visitor signatures.
    pub(super) fn node_ty_elided(&self, family: &Family, node: &NodeSpec) -> TokenStream {
        let ident = format_ident!("{}", family.node_type_name(node));
        if self.linked.node_borrows(node) {
            quote!(#ident<'_>)
        } else {
            quote!(#ident)
        }
    }

    pub(super) fn field_ty(&self, ty: &TypeRef) -> Result<TokenStream> {
        self.render_ty(ty, true)
    }

    /// A family reference is boxed unless an enclosing heap container
    /// already gives it a stable size.
    fn render_ty(&self, ty: &TypeRef, boxed: bool) -> Result<TokenStream> {
        let grammar = self.grammar();

        if grammar.is_family(&ty.name) {
            if !ty.args.is_empty() {
                return Err(GrammarError::InvalidRust {
                    value: ty.to_string(),
                    expected: "family reference (families take no type arguments)",
                });
            }
            let family = self.family_ty(&ty.name);
            return Ok(if boxed { quote!(Box<#family>) } else { family });
        }

        let heap = self.is_heap_container(&ty.name);
        let args = ty
            .args
            .iter()
            .map(|arg| self.render_ty(arg, !heap))
            .collect::<Result<Vec<_>>>()?;
        let path = self.rust_path(&ty.name)?;
        let full = if args.is_empty() {
            quote!(#path)
        } else {
            quote!(#path<#(#args),*>)
        };

        Ok(match self.linked.classify(ty) {
            OwnershipKind::Borrowed => quote!(&'src #full),
            OwnershipKind::OwnedDisposable | OwnershipKind::ValueDefaulted => full,
        })
    }

    fn alias<'n>(&self, name: &'n str) -> &'n str
    where
        'a: 'n,
    {
        self.grammar()
            .options
            .type_aliases
            .get(name)
            .map(String::as_str)
            .unwrap_or(name)
    }

    fn rust_path(&self, name: &str) -> Result<syn::Path> {
        let raw = self.alias(name);
        syn::parse_str(raw).map_err(|_| GrammarError::InvalidRust {
            value: raw.to_string(),
            expected: "type path",
        })
    }

    fn is_heap_container(&self, name: &str) -> bool {
        let heap = &self.grammar().options.heap_containers;
        let alias = self.alias(name);
        heap.iter().any(|h| h == name || h == alias)
    }
}
