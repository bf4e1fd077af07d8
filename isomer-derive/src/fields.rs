use proc_macro2::TokenStream;
use quote::quote;
use syn::DeriveInput;

use crate::{ContainerAttrs, FieldAttrs, blank_expr, blank_fn, build_where_clause, parse_field_attrs};

/// One field of the struct being derived.
struct FieldInfo {
    /// `ident` for named fields, `0`, `1`, ... for tuple fields.
    access: TokenStream,
    name: String,
    ty: syn::Type,
    attrs: FieldAttrs,
}

impl FieldInfo {
    fn is_walked(&self) -> bool {
        !self.attrs.base && !self.attrs.skip
    }
}

fn collect_fields(fields: &syn::Fields) -> syn::Result<Vec<FieldInfo>> {
    let mut result = Vec::new();

    for (i, field) in fields.iter().enumerate() {
        let attrs = parse_field_attrs(&field.attrs)?;
        if attrs.base && attrs.skip {
            return Err(syn::Error::new_spanned(
                field,
                "a base field cannot be skipped",
            ));
        }

        let (access, name) = match &field.ident {
            Some(ident) => (quote! { #ident }, ident.to_string()),
            None => {
                let idx = syn::Index::from(i);
                (quote! { #idx }, i.to_string())
            }
        };

        result.push(FieldInfo {
            access,
            name,
            ty: field.ty.clone(),
            attrs,
        });
    }

    let bases = result.iter().filter(|f| f.attrs.base).count();
    if bases > 1 {
        return Err(syn::Error::new_spanned(
            fields,
            "a type can have at most one base field",
        ));
    }

    Ok(result)
}

/// Builds `Self { .. }`, `Self(..)` or `Self` around per-field expressions.
fn construct(fields: &syn::Fields, infos: &[FieldInfo], exprs: &[TokenStream]) -> TokenStream {
    match fields {
        syn::Fields::Named(_) => {
            let inits = infos.iter().zip(exprs).map(|(f, e)| {
                let access = &f.access;
                quote! { #access: #e }
            });
            quote! { Self { #(#inits),* } }
        }
        syn::Fields::Unnamed(_) => quote! { Self(#(#exprs),*) },
        syn::Fields::Unit => quote! { Self },
    }
}

/// Generates the `Fields` and `Isomer` implementations for a struct.
pub fn generate_struct(
    input: &DeriveInput,
    data: &syn::DataStruct,
    attrs: &ContainerAttrs,
) -> syn::Result<TokenStream> {
    let name = &input.ident;
    let type_name = name.to_string();
    let crate_path = &attrs.crate_path;

    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();
    let where_clause = build_where_clause(&input.generics, where_clause, crate_path);

    let infos = collect_fields(&data.fields)?;
    let own: Vec<&FieldInfo> = infos.iter().filter(|f| f.is_walked()).collect();
    let base = infos.iter().find(|f| f.attrs.base);

    let descriptor = |f: &FieldInfo| {
        let field_name = &f.name;
        quote! { #crate_path::FieldDescriptor::new(#type_name, #field_name) }
    };
    let descriptors: Vec<_> = own.iter().map(|f| descriptor(f)).collect();

    let base_walk = base.map(|b| {
        let ty = &b.ty;
        quote! { <#ty as #crate_path::Fields>::for_each_field(visitor); }
    });

    let map_exprs: Vec<_> = infos
        .iter()
        .map(|f| {
            let access = &f.access;
            if f.attrs.skip {
                quote! { ::std::default::Default::default() }
            } else if f.attrs.base {
                quote! { #crate_path::Fields::map_fields(&self.#access, mapper)? }
            } else {
                let desc = descriptor(f);
                quote! { mapper.map_field(&#desc, &self.#access)? }
            }
        })
        .collect();
    let mapped = construct(&data.fields, &infos, &map_exprs);

    let writes = own.iter().map(|f| {
        let access = &f.access;
        let desc = descriptor(f);
        quote! { writer.write_field(&#desc, &mut self.#access, &source.#access)?; }
    });
    let base_write = base.map(|b| {
        let access = &b.access;
        quote! { #crate_path::Fields::write_fields(&mut self.#access, &source.#access, writer)?; }
    });

    let mut comparisons: Vec<_> = own
        .iter()
        .map(|f| {
            let access = &f.access;
            let desc = descriptor(f);
            quote! { comparer.compare_field(&#desc, &self.#access, &other.#access) }
        })
        .collect();
    if let Some(b) = base {
        let access = &b.access;
        comparisons.push(quote! {
            #crate_path::Fields::compare_fields(&self.#access, &other.#access, comparer)
        });
    }
    let comparison = match comparisons.split_first() {
        Some((first, rest)) => quote! { #first #(&& #rest)* },
        None => quote! { true },
    };

    let names: Vec<_> = own.iter().map(|f| f.name.as_str()).collect();
    let accesses: Vec<_> = own.iter().map(|f| &f.access).collect();
    let (field_lookup, field_mut_lookup) = if own.is_empty() {
        (quote! {}, quote! {})
    } else {
        (
            quote! {
                if field.declaring_type == #type_name {
                    match field.name {
                        #(#names => return ::std::option::Option::Some(&self.#accesses as &dyn #crate_path::AnyIsomer),)*
                        _ => {}
                    }
                }
            },
            quote! {
                if field.declaring_type == #type_name {
                    match field.name {
                        #(#names => return ::std::option::Option::Some(&mut self.#accesses as &mut dyn #crate_path::AnyIsomer),)*
                        _ => {}
                    }
                }
            },
        )
    };
    let (field_fallback, field_mut_fallback) = match base {
        Some(b) => {
            let access = &b.access;
            (
                quote! { #crate_path::Fields::field(&self.#access, field) },
                quote! { #crate_path::Fields::field_mut(&mut self.#access, field) },
            )
        }
        None => (
            quote! { ::std::option::Option::None },
            quote! { ::std::option::Option::None },
        ),
    };

    let blank = if attrs.default {
        blank_fn(attrs)
    } else if attrs.no_blank {
        quote! {}
    } else {
        let blank_exprs: Vec<_> = infos
            .iter()
            .map(|f| blank_expr(&f.ty, &f.attrs, crate_path))
            .collect();
        let blanked = construct(&data.fields, &infos, &blank_exprs);
        quote! {
            fn blank() -> ::std::result::Result<Self, #crate_path::IsomerError> {
                ::std::result::Result::Ok(#blanked)
            }
        }
    };

    Ok(quote! {
        impl #impl_generics #crate_path::Fields for #name #ty_generics #where_clause {
            fn declared_fields() -> &'static [#crate_path::FieldDescriptor] {
                const FIELDS: &[#crate_path::FieldDescriptor] = &[#(#descriptors),*];
                FIELDS
            }

            fn for_each_field(visitor: &mut dyn FnMut(&#crate_path::FieldDescriptor)) {
                for field in <Self as #crate_path::Fields>::declared_fields() {
                    visitor(field);
                }
                #base_walk
            }

            fn map_fields(
                &self,
                mapper: &mut impl #crate_path::FieldMapper,
            ) -> ::std::result::Result<Self, #crate_path::IsomerError> {
                ::std::result::Result::Ok(#mapped)
            }

            fn write_fields(
                &mut self,
                source: &Self,
                writer: &mut impl #crate_path::FieldWriter,
            ) -> ::std::result::Result<(), #crate_path::IsomerError> {
                #(#writes)*
                #base_write
                ::std::result::Result::Ok(())
            }

            fn compare_fields(
                &self,
                other: &Self,
                comparer: &mut impl #crate_path::FieldComparer,
            ) -> bool {
                #comparison
            }

            fn field(
                &self,
                field: &#crate_path::FieldDescriptor,
            ) -> ::std::option::Option<&dyn #crate_path::AnyIsomer> {
                #field_lookup
                #field_fallback
            }

            fn field_mut(
                &mut self,
                field: &#crate_path::FieldDescriptor,
            ) -> ::std::option::Option<&mut dyn #crate_path::AnyIsomer> {
                #field_mut_lookup
                #field_mut_fallback
            }
        }

        impl #impl_generics #crate_path::Isomer for #name #ty_generics #where_clause {
            fn kind() -> #crate_path::Kind {
                #crate_path::Kind::Value
            }

            #blank

            fn clone_with(
                &self,
                cloner: &mut #crate_path::GraphCloner,
            ) -> ::std::result::Result<Self, #crate_path::IsomerError> {
                cloner.clone_record(self)
            }

            fn assign_from(
                &mut self,
                source: &Self,
                cloner: &mut #crate_path::GraphCloner,
            ) -> ::std::result::Result<(), #crate_path::IsomerError> {
                cloner.assign_record(self, source)
            }

            fn eq_with(&self, other: &Self, comparer: &mut #crate_path::GraphComparer) -> bool {
                comparer.equal_records(self, other)
            }
        }
    })
}
