//! Derive macro for row-to-record mapping.
//!
//! This crate provides `#[derive(Record)]`, which implements
//! `oxide_dal_core::mapper::Record` for a struct with named fields.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{parse_macro_input, Attribute, Data, DeriveInput, Fields, Ident};

/// Derives the `Record` trait, making every named field a mapping target.
///
/// The struct must implement `Default`, and each mapped field's type must
/// implement `oxide_dal_core::FromValue`.
///
/// # Field Attributes
///
/// - `#[record(skip)]` - Excludes the field from mapping; it keeps its
///   default value
///
/// # Generated Items
///
/// For a struct `Person { id: i64, name: String }` this generates
/// `FIELDS = &["id", "name"]` and a `set_field` dispatching on the field
/// name. Column renames are supplied at the call site through a `FieldMap`.
#[proc_macro_derive(Record, attributes(record))]
pub fn derive_record(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    derive_record_impl(&input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}

fn derive_record_impl(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let struct_name = &input.ident;

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    input,
                    "Record derive only supports structs with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                input,
                "Record derive only supports structs",
            ));
        }
    };

    let mut mapped: Vec<&Ident> = Vec::new();
    for field in fields {
        let Some(ident) = field.ident.as_ref() else {
            continue;
        };
        if !is_skipped(&field.attrs)? {
            mapped.push(ident);
        }
    }

    let names: Vec<String> = mapped.iter().map(|ident| unraw(ident)).collect();
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics ::oxide_dal_core::mapper::Record for #struct_name #ty_generics #where_clause {
            const FIELDS: &'static [&'static str] = &[#(#names),*];

            fn set_field(
                &mut self,
                field: &str,
                value: &::oxide_dal_core::Value,
            ) -> ::core::result::Result<(), ::oxide_dal_core::ConversionError> {
                match field {
                    #(#names => ::oxide_dal_core::mapper::assign(&mut self.#mapped, value),)*
                    _ => ::core::result::Result::Ok(()),
                }
            }
        }
    })
}

fn is_skipped(attrs: &[Attribute]) -> syn::Result<bool> {
    let mut skip = false;
    for attr in attrs {
        if attr.path().is_ident("record") {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("skip") {
                    skip = true;
                    Ok(())
                } else {
                    Err(meta.error("unsupported record attribute, expected `skip`"))
                }
            })?;
        }
    }
    Ok(skip)
}

/// Field name as written, without the `r#` prefix of raw identifiers.
fn unraw(ident: &Ident) -> String {
    let name = ident.to_string();
    name.strip_prefix("r#").map_or_else(|| name.clone(), str::to_string)
}
