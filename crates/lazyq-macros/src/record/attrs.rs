//! Attribute parsing for the Record derive macro.
//!
//! This module provides parsers for the `#[record(...)]` field attributes.

use syn::{
    parse::{Parse, ParseStream},
    punctuated::Punctuated,
    spanned::Spanned,
    Attribute, Error, Lit, Meta, Result, Token,
};

/// Field-level attributes from `#[record(...)]`.
#[derive(Debug, Clone, Default)]
pub struct RecordAttr {
    /// Hide this field from lookup, equality and hashing.
    pub skip: bool,
    /// Custom field name for lookups (default: field name).
    pub rename: Option<String>,
}

impl Parse for RecordAttr {
    fn parse(input: ParseStream) -> Result<Self> {
        let mut attr = RecordAttr::default();

        let content: Punctuated<Meta, Token![,]> = Punctuated::parse_terminated(input)?;

        for meta in content {
            match &meta {
                Meta::Path(p) if p.is_ident("skip") => {
                    attr.skip = true;
                }

                Meta::NameValue(nv) if nv.path.is_ident("rename") => {
                    if let syn::Expr::Lit(syn::ExprLit {
                        lit: Lit::Str(s), ..
                    }) = &nv.value
                    {
                        if s.value().is_empty() {
                            return Err(Error::new(s.span(), "rename must not be empty"));
                        }
                        attr.rename = Some(s.value());
                    } else {
                        return Err(Error::new(
                            nv.value.span(),
                            "rename must be a string literal",
                        ));
                    }
                }

                _ => {
                    return Err(Error::new(
                        meta.span(),
                        "unknown record attribute. Expected: skip or rename = \"...\"",
                    ));
                }
            }
        }

        if attr.skip && attr.rename.is_some() {
            return Err(Error::new(
                input.span(),
                "a skipped field cannot be renamed",
            ));
        }

        Ok(attr)
    }
}

/// Extract `#[record(...)]` attributes from a field's attributes.
///
/// Repeated attributes are merged in order.
pub fn parse_record_attrs(attrs: &[Attribute]) -> Result<RecordAttr> {
    let mut merged = RecordAttr::default();
    for attr in attrs {
        if attr.path().is_ident("record") {
            let parsed = attr.parse_args::<RecordAttr>()?;
            merged.skip |= parsed.skip;
            if parsed.rename.is_some() {
                merged.rename = parsed.rename;
            }
            if merged.skip && merged.rename.is_some() {
                return Err(Error::new(attr.span(), "a skipped field cannot be renamed"));
            }
        }
    }
    Ok(merged)
}
