use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::DeriveInput;

use crate::{ContainerAttrs, blank_expr, blank_fn, build_where_clause, parse_field_attrs};

/// Generates the `Isomer` implementation for an enum.
///
/// Fieldless enums are immutable. Enums with data are value types whose
/// variant plays the role of the runtime type: different variants never
/// compare equal.
pub fn generate_enum(
    input: &DeriveInput,
    data: &syn::DataEnum,
    attrs: &ContainerAttrs,
) -> syn::Result<TokenStream> {
    for variant in &data.variants {
        for field in &variant.fields {
            if parse_field_attrs(&field.attrs)?.base {
                return Err(syn::Error::new_spanned(
                    field,
                    "enum variants cannot declare a base field",
                ));
            }
        }
    }

    let all_unit = data
        .variants
        .iter()
        .all(|v| matches!(v.fields, syn::Fields::Unit));

    if all_unit {
        Ok(generate_fieldless(input, data, attrs))
    } else {
        generate_data(input, data, attrs)
    }
}

fn generate_fieldless(input: &DeriveInput, data: &syn::DataEnum, attrs: &ContainerAttrs) -> TokenStream {
    let name = &input.ident;
    let crate_path = &attrs.crate_path;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();
    let where_clause = build_where_clause(&input.generics, where_clause, crate_path);

    let variants: Vec<_> = data.variants.iter().map(|v| &v.ident).collect();

    // The zero value of a fieldless enum is its first variant.
    let blank = match variants.first() {
        _ if attrs.default => blank_fn(attrs),
        Some(first) if !attrs.no_blank => quote! {
            fn blank() -> ::std::result::Result<Self, #crate_path::IsomerError> {
                ::std::result::Result::Ok(Self::#first)
            }
        },
        _ => quote! {},
    };

    quote! {
        impl #impl_generics #crate_path::Isomer for #name #ty_generics #where_clause {
            fn kind() -> #crate_path::Kind {
                #crate_path::Kind::Immutable
            }

            #blank

            fn clone_with(
                &self,
                _cloner: &mut #crate_path::GraphCloner,
            ) -> ::std::result::Result<Self, #crate_path::IsomerError> {
                ::std::result::Result::Ok(match *self {
                    #(Self::#variants => Self::#variants,)*
                })
            }

            fn eq_with(&self, other: &Self, _comparer: &mut #crate_path::GraphComparer) -> bool {
                ::std::mem::discriminant(self) == ::std::mem::discriminant(other)
            }
        }
    }
}

fn generate_data(
    input: &DeriveInput,
    data: &syn::DataEnum,
    attrs: &ContainerAttrs,
) -> syn::Result<TokenStream> {
    let name = &input.ident;
    let crate_path = &attrs.crate_path;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();
    let where_clause = build_where_clause(&input.generics, where_clause, crate_path);

    let mut clone_arms = Vec::new();
    let mut eq_arms = Vec::new();

    for variant in &data.variants {
        let ident = &variant.ident;

        match &variant.fields {
            syn::Fields::Unit => {
                clone_arms.push(quote! { Self::#ident => Self::#ident });
                eq_arms.push(quote! { (Self::#ident, Self::#ident) => true });
            }
            syn::Fields::Named(named) => {
                let mut bindings = Vec::new();
                let mut inits = Vec::new();
                let mut left = Vec::new();
                let mut right = Vec::new();
                let mut checks = Vec::new();

                for field in &named.named {
                    let Some(field_ident) = field.ident.as_ref() else {
                        continue;
                    };
                    if parse_field_attrs(&field.attrs)?.skip {
                        inits.push(quote! { #field_ident: ::std::default::Default::default() });
                        continue;
                    }
                    let a = format_ident!("__self_{}", field_ident);
                    let b = format_ident!("__other_{}", field_ident);
                    bindings.push(field_ident.clone());
                    inits.push(quote! { #field_ident: cloner.clone_value(#field_ident)? });
                    left.push(quote! { #field_ident: #a });
                    right.push(quote! { #field_ident: #b });
                    checks.push(quote! { && comparer.equal(#a, #b) });
                }

                clone_arms.push(quote! {
                    Self::#ident { #(#bindings,)* .. } => Self::#ident { #(#inits),* }
                });
                eq_arms.push(quote! {
                    (Self::#ident { #(#left,)* .. }, Self::#ident { #(#right,)* .. }) => true #(#checks)*
                });
            }
            syn::Fields::Unnamed(unnamed) => {
                let mut patterns = Vec::new();
                let mut inits = Vec::new();
                let mut left = Vec::new();
                let mut right = Vec::new();
                let mut checks = Vec::new();

                for (i, field) in unnamed.unnamed.iter().enumerate() {
                    if parse_field_attrs(&field.attrs)?.skip {
                        patterns.push(quote! { _ });
                        inits.push(quote! { ::std::default::Default::default() });
                        left.push(quote! { _ });
                        right.push(quote! { _ });
                        continue;
                    }
                    let binding = format_ident!("f{}", i);
                    let a = format_ident!("__self_{}", i);
                    let b = format_ident!("__other_{}", i);
                    patterns.push(quote! { #binding });
                    inits.push(quote! { cloner.clone_value(#binding)? });
                    left.push(quote! { #a });
                    right.push(quote! { #b });
                    checks.push(quote! { && comparer.equal(#a, #b) });
                }

                clone_arms.push(quote! {
                    Self::#ident(#(#patterns),*) => Self::#ident(#(#inits),*)
                });
                eq_arms.push(quote! {
                    (Self::#ident(#(#left),*), Self::#ident(#(#right),*)) => true #(#checks)*
                });
            }
        }
    }

    let blank = if attrs.default {
        blank_fn(attrs)
    } else if attrs.no_blank {
        quote! {}
    } else {
        match data.variants.first() {
            Some(first) => {
                let ident = &first.ident;
                let value = match &first.fields {
                    syn::Fields::Unit => quote! { Self::#ident },
                    syn::Fields::Named(named) => {
                        let mut inits = Vec::new();
                        for field in &named.named {
                            let field_attrs = parse_field_attrs(&field.attrs)?;
                            let field_ident = &field.ident;
                            let expr = blank_expr(&field.ty, &field_attrs, crate_path);
                            inits.push(quote! { #field_ident: #expr });
                        }
                        quote! { Self::#ident { #(#inits),* } }
                    }
                    syn::Fields::Unnamed(unnamed) => {
                        let mut exprs = Vec::new();
                        for field in &unnamed.unnamed {
                            let field_attrs = parse_field_attrs(&field.attrs)?;
                            exprs.push(blank_expr(&field.ty, &field_attrs, crate_path));
                        }
                        quote! { Self::#ident(#(#exprs),*) }
                    }
                };
                quote! {
                    fn blank() -> ::std::result::Result<Self, #crate_path::IsomerError> {
                        ::std::result::Result::Ok(#value)
                    }
                }
            }
            None => quote! {},
        }
    };

    Ok(quote! {
        impl #impl_generics #crate_path::Isomer for #name #ty_generics #where_clause {
            fn kind() -> #crate_path::Kind {
                #crate_path::Kind::Value
            }

            #blank

            fn clone_with(
                &self,
                cloner: &mut #crate_path::GraphCloner,
            ) -> ::std::result::Result<Self, #crate_path::IsomerError> {
                ::std::result::Result::Ok(match self {
                    #(#clone_arms,)*
                })
            }

            fn eq_with(&self, other: &Self, comparer: &mut #crate_path::GraphComparer) -> bool {
                #[allow(unreachable_patterns)]
                match (self, other) {
                    #(#eq_arms,)*
                    _ => false,
                }
            }
        }
    })
}
