//! Implementation of the `#[derive(Record)]` macro.
//!
//! This macro generates `Record` and `Reflect` implementations plus field
//! name constants for the exposed fields.

use std::collections::HashSet;

use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::{
    ext::IdentExt, parse_quote, spanned::Spanned, Data, DeriveInput, Error, Fields, GenericParam,
    Ident, Result,
};

use super::attrs::parse_record_attrs;

/// Main implementation of the Record derive macro.
pub fn record_derive_impl(mut input: DeriveInput) -> Result<TokenStream> {
    let struct_name = input.ident.clone();

    // Ensure we have a struct with named fields
    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(named) => named.named.clone(),
            _ => {
                return Err(Error::new(
                    input.span(),
                    "Record can only be derived for structs with named fields",
                ))
            }
        },
        _ => {
            return Err(Error::new(
                input.span(),
                "Record can only be derived for structs",
            ))
        }
    };

    let mut field_matches: Vec<TokenStream> = Vec::new();
    let mut field_constants: Vec<TokenStream> = Vec::new();
    let mut query_names: Vec<String> = Vec::new();
    let mut exposed: Vec<&Ident> = Vec::new();
    let mut seen = HashSet::new();

    for field in fields.iter() {
        let field_name = field
            .ident
            .as_ref()
            .ok_or_else(|| Error::new(field.span(), "expected named field"))?;

        let record_attrs = parse_record_attrs(&field.attrs)?;
        if record_attrs.skip {
            continue;
        }

        let query_name = record_attrs
            .rename
            .unwrap_or_else(|| field_name.unraw().to_string());
        if !seen.insert(query_name.clone()) {
            return Err(Error::new(
                field.span(),
                format!("duplicate record field name '{}'", query_name),
            ));
        }

        // Names that do not form an identifier are still readable, just
        // without a constant.
        let const_name = to_screaming_snake_case(&query_name);
        if syn::parse_str::<Ident>(&const_name).is_ok() {
            let const_ident = format_ident!("{}", const_name);
            field_constants.push(quote! {
                /// Field name constant for field-name stages.
                pub const #const_ident: &'static str = #query_name;
            });
        }

        field_matches.push(quote! {
            #query_name => ::core::option::Option::Some(
                ::lazyq::Value::new(::core::clone::Clone::clone(&self.#field_name))
            ),
        });
        query_names.push(query_name);
        exposed.push(field_name);
    }

    // Every type parameter has to travel as a dynamic value too.
    for param in input.generics.params.iter_mut() {
        if let GenericParam::Type(ty) = param {
            ty.bounds.push(parse_quote!(::lazyq::Reflect));
            ty.bounds.push(parse_quote!(::core::clone::Clone));
        }
    }
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let expanded = quote! {
        impl #impl_generics #struct_name #ty_generics #where_clause {
            #(#field_constants)*
        }

        impl #impl_generics ::lazyq::Record for #struct_name #ty_generics #where_clause {
            fn field(&self, name: &str) -> ::core::option::Option<::lazyq::Value> {
                match name {
                    #(#field_matches)*
                    _ => ::core::option::Option::None,
                }
            }

            fn field_names(&self) -> &'static [&'static str] {
                &[#(#query_names),*]
            }
        }

        impl #impl_generics ::lazyq::Reflect for #struct_name #ty_generics #where_clause {
            fn as_any(&self) -> &dyn ::core::any::Any {
                self
            }

            fn shape(&self) -> ::lazyq::Shape<'_> {
                ::lazyq::Shape::Record(self)
            }

            #[allow(unused_variables)]
            fn reflect_eq(&self, other: &dyn ::lazyq::Reflect) -> bool {
                match ::lazyq::Reflect::as_any(other).downcast_ref::<Self>() {
                    ::core::option::Option::Some(other) => {
                        true #(&& ::lazyq::Reflect::reflect_eq(&self.#exposed, &other.#exposed))*
                    }
                    ::core::option::Option::None => false,
                }
            }

            fn reflect_hash(&self, state: &mut dyn ::core::hash::Hasher) {
                let _ = &state;
                #(::lazyq::Reflect::reflect_hash(&self.#exposed, state);)*
            }

            fn list_type_id(&self) -> ::core::any::TypeId {
                ::core::any::TypeId::of::<::std::vec::Vec<Self>>()
            }

            fn to_list(&self) -> ::std::boxed::Box<dyn ::core::any::Any> {
                ::lazyq::reflect::__private::list_of(self)
            }

            fn push_onto(&self, list: &mut dyn ::core::any::Any) -> bool {
                ::lazyq::reflect::__private::push_onto(self, list)
            }
        }
    };

    Ok(expanded)
}

/// Convert a string to SCREAMING_SNAKE_CASE.
fn to_screaming_snake_case(s: &str) -> String {
    let mut result = String::with_capacity(s.len() + 4);
    let mut prev_was_lower = false;

    for c in s.chars() {
        if c.is_uppercase() {
            if prev_was_lower {
                result.push('_');
            }
            result.push(c);
            prev_was_lower = false;
        } else if c == '_' || c == '-' || c == ' ' {
            result.push('_');
            prev_was_lower = false;
        } else {
            result.push(c.to_ascii_uppercase());
            prev_was_lower = c.is_lowercase();
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expand(input: &str) -> Result<String> {
        let input: DeriveInput = syn::parse_str(input)?;
        record_derive_impl(input).map(|tokens| tokens.to_string())
    }

    #[test]
    fn test_screaming_snake_case() {
        assert_eq!(to_screaming_snake_case("name"), "NAME");
        assert_eq!(to_screaming_snake_case("created_at"), "CREATED_AT");
        assert_eq!(to_screaming_snake_case("createdAt"), "CREATED_AT");
        assert_eq!(to_screaming_snake_case("my-field"), "MY_FIELD");
        assert_eq!(to_screaming_snake_case("Name"), "NAME");
        assert_eq!(to_screaming_snake_case("user id"), "USER_ID");
    }

    #[test]
    fn test_expands_named_struct() {
        let out = expand("struct Task { title: String, done: bool }").unwrap();
        assert!(out.contains("impl :: lazyq :: Record for Task"));
        assert!(out.contains("impl :: lazyq :: Reflect for Task"));
        assert!(out.contains("pub const TITLE"));
        assert!(out.contains("pub const DONE"));
    }

    #[test]
    fn test_skip_and_rename() {
        let out = expand(
            r#"struct Task {
                #[record(rename = "Title")]
                title: String,
                #[record(skip)]
                cache: Vec<u8>,
            }"#,
        )
        .unwrap();
        assert!(out.contains("\"Title\""));
        assert!(!out.contains("\"title\""));
        assert!(!out.contains("cache"));
    }

    #[test]
    fn test_raw_identifier_is_unraw() {
        let out = expand("struct Item { r#type: String }").unwrap();
        assert!(out.contains("\"type\""));
        assert!(out.contains("pub const TYPE"));
    }

    #[test]
    fn test_rename_without_identifier_has_no_constant() {
        let out = expand(r#"struct Item { #[record(rename = "2nd")] second: u8 }"#).unwrap();
        assert!(out.contains("\"2nd\""));
        assert!(!out.contains("pub const"));
    }

    #[test]
    fn test_generic_params_get_bounds() {
        let out = expand("struct Pair<T> { left: T, right: T }").unwrap();
        assert!(out.contains(":: lazyq :: Reflect + :: core :: clone :: Clone"));
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let err = expand(r#"struct Item { a: u8, #[record(rename = "a")] b: u8 }"#).unwrap_err();
        assert!(err.to_string().contains("duplicate record field name"));
    }

    #[test]
    fn test_tuple_struct_rejected() {
        let err = expand("struct Item(u8);").unwrap_err();
        assert!(err.to_string().contains("named fields"));
    }

    #[test]
    fn test_enum_rejected() {
        let err = expand("enum Item { A }").unwrap_err();
        assert!(err.to_string().contains("only be derived for structs"));
    }
}
