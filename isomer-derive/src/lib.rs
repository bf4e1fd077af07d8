use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{DeriveInput, parse_macro_input};

mod enums;
mod fields;

/// Derive macro for the `Isomer` trait.
///
/// Structs get a generated `Fields` implementation (the per-type field
/// descriptor list and typed field visitors) and an `Isomer` implementation
/// that routes through it. Fieldless enums are classified immutable; enums
/// with data are copied and compared variant by variant.
///
/// # Example
///
/// ```ignore
/// use isomer_core::Isomer;
///
/// #[derive(Isomer)]
/// struct Entity {
///     id: u64,
/// }
///
/// #[derive(Isomer)]
/// struct Person {
///     #[isomer(base)]
///     entity: Entity,
///     name: String,
/// }
/// ```
///
/// # Container attributes
///
/// - `#[isomer(immutable)]` - Take the immutable fast path (type must impl `Clone + PartialEq`)
/// - `#[isomer(no_blank)]` - Refuse uninitialized allocation
/// - `#[isomer(default)]` - Allocate blanks with `Default::default()`
/// - `#[isomer(crate = "path")]` - Path to `isomer_core` (defaults to `::isomer_core`)
///
/// # Field attributes
///
/// - `#[isomer(base)]` - This field is the parent level of the type hierarchy
/// - `#[isomer(skip)]` - Leave this field out of the walk (field must impl Default)
/// - `#[isomer(default)]` - Allocate this field's blank with `Default::default()`
#[proc_macro_derive(Isomer, attributes(isomer))]
pub fn derive_isomer(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match derive_isomer_impl(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn derive_isomer_impl(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let attrs = parse_container_attrs(&input.attrs)?;

    match &input.data {
        syn::Data::Union(_) => {}
        _ if attrs.immutable => return Ok(generate_immutable(input, &attrs)),
        _ => {}
    }

    match &input.data {
        syn::Data::Struct(data) => fields::generate_struct(input, data, &attrs),
        syn::Data::Enum(data) => enums::generate_enum(input, data, &attrs),
        syn::Data::Union(_) => Err(syn::Error::new_spanned(
            input,
            "Isomer cannot be derived for unions",
        )),
    }
}

/// Opted-in immutable types are shared as-is and compared with their own `PartialEq`.
fn generate_immutable(input: &DeriveInput, attrs: &ContainerAttrs) -> TokenStream2 {
    let name = &input.ident;
    let crate_path = &attrs.crate_path;
    let (impl_generics, ty_generics, _) = input.generics.split_for_impl();

    let type_params = input.generics.type_params().map(|p| &p.ident);
    let existing_predicates = input
        .generics
        .where_clause
        .as_ref()
        .map(|w| {
            let predicates = &w.predicates;
            quote! { #predicates, }
        })
        .unwrap_or_default();

    let blank = blank_fn(attrs);

    quote! {
        impl #impl_generics #crate_path::Isomer for #name #ty_generics
        where
            Self: ::std::clone::Clone + ::std::cmp::PartialEq,
            #existing_predicates
            #(#type_params: 'static),*
        {
            fn kind() -> #crate_path::Kind {
                #crate_path::Kind::Immutable
            }

            #blank

            fn clone_with(
                &self,
                cloner: &mut #crate_path::GraphCloner,
            ) -> ::std::result::Result<Self, #crate_path::IsomerError> {
                ::std::result::Result::Ok(cloner.share(self))
            }

            fn eq_with(&self, other: &Self, _comparer: &mut #crate_path::GraphComparer) -> bool {
                self == other
            }
        }
    }
}

/// `blank()` override for containers marked `default`; other containers keep the
/// trait's failing default unless they generate a field-wise blank.
pub(crate) fn blank_fn(attrs: &ContainerAttrs) -> TokenStream2 {
    let crate_path = &attrs.crate_path;
    if attrs.default {
        quote! {
            fn blank() -> ::std::result::Result<Self, #crate_path::IsomerError> {
                ::std::result::Result::Ok(::std::default::Default::default())
            }
        }
    } else {
        quote! {}
    }
}

/// Builds the where clause, adding `Isomer` bounds for every type parameter.
pub(crate) fn build_where_clause(
    generics: &syn::Generics,
    existing: Option<&syn::WhereClause>,
    crate_path: &TokenStream2,
) -> TokenStream2 {
    let type_params: Vec<_> = generics.type_params().map(|p| &p.ident).collect();

    if type_params.is_empty() && existing.is_none() {
        return quote! {};
    }

    let isomer_bounds = type_params.iter().map(|p| {
        quote! { #p: #crate_path::Isomer }
    });

    let existing_predicates = existing
        .map(|w| {
            let predicates = &w.predicates;
            quote! { #predicates, }
        })
        .unwrap_or_default();

    quote! {
        where
            #existing_predicates
            #(#isomer_bounds),*
    }
}

pub(crate) struct ContainerAttrs {
    pub immutable: bool,
    pub no_blank: bool,
    pub default: bool,
    pub crate_path: TokenStream2,
}

fn parse_container_attrs(attrs: &[syn::Attribute]) -> syn::Result<ContainerAttrs> {
    let mut result = ContainerAttrs {
        immutable: false,
        no_blank: false,
        default: false,
        crate_path: quote! { ::isomer_core },
    };

    for attr in attrs {
        if !attr.path().is_ident("isomer") {
            continue;
        }

        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("immutable") {
                result.immutable = true;
            } else if meta.path.is_ident("no_blank") {
                result.no_blank = true;
            } else if meta.path.is_ident("default") {
                result.default = true;
            } else if meta.path.is_ident("crate") {
                let value: syn::LitStr = meta.value()?.parse()?;
                let path: syn::Path = value.parse()?;
                result.crate_path = quote! { #path };
            } else {
                return Err(meta.error("unknown isomer container attribute"));
            }
            Ok(())
        })?;
    }

    Ok(result)
}

#[derive(Default)]
pub(crate) struct FieldAttrs {
    pub base: bool,
    pub skip: bool,
    pub default: bool,
}

pub(crate) fn parse_field_attrs(attrs: &[syn::Attribute]) -> syn::Result<FieldAttrs> {
    let mut result = FieldAttrs::default();

    for attr in attrs {
        if !attr.path().is_ident("isomer") {
            continue;
        }

        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("base") {
                result.base = true;
            } else if meta.path.is_ident("skip") {
                result.skip = true;
            } else if meta.path.is_ident("default") {
                result.default = true;
            } else {
                return Err(meta.error("unknown isomer field attribute"));
            }
            Ok(())
        })?;
    }

    Ok(result)
}

/// Expression allocating an uninitialized value of `ty`.
pub(crate) fn blank_expr(ty: &syn::Type, attrs: &FieldAttrs, crate_path: &TokenStream2) -> TokenStream2 {
    if attrs.skip || attrs.default {
        quote! { ::std::default::Default::default() }
    } else {
        quote! { <#ty as #crate_path::Isomer>::blank()? }
    }
}
