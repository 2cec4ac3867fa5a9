//! Attribute macros that attach the derive bounds required by the
//! `loadscore::Metric` and `loadscore::Aggregate` traits.
//!
//! Both macros are meant to be used inside the `loadscore` crate: the
//! generated `impl` refers to `crate::Metric`.
use proc_macro::TokenStream;
use quote::quote;
use syn::{ItemStruct, parse_macro_input};

extern crate proc_macro;

/// The derives every record and aggregate carries: serde in both directions,
/// partial comparisons, debug output and cloning.
fn with_common_derives(ast: &ItemStruct) -> proc_macro2::TokenStream {
    quote! {
        #[derive(
            serde::Serialize,
            serde::Deserialize,
            std::cmp::PartialOrd,
            std::cmp::PartialEq,
            std::fmt::Debug,
            std::clone::Clone
        )]
        #ast
    }
}

/// Marks a struct as a single decoded observation.
///
/// Field-level `#[serde(...)]` attributes are kept, so the struct can still
/// describe its own wire shape.
#[proc_macro_attribute]
pub fn metric(_attr: TokenStream, item: TokenStream) -> TokenStream {
    let ast = parse_macro_input!(item as ItemStruct);
    let ident = &ast.ident;
    let (impl_generics, ty_generics, where_clause) = ast.generics.split_for_impl();
    let derived = with_common_derives(&ast);

    let expanded = quote! {
        #derived

        impl #impl_generics crate::Metric for #ident #ty_generics #where_clause {}
    };

    TokenStream::from(expanded)
}

/// Marks a struct as an accumulator of metrics. The `Aggregate` impl itself
/// stays hand-written.
#[proc_macro_attribute]
pub fn aggregate(_attr: TokenStream, item: TokenStream) -> TokenStream {
    let ast = parse_macro_input!(item as ItemStruct);
    TokenStream::from(with_common_derives(&ast))
}
