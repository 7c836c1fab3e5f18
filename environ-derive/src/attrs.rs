//! Attribute parsing

use syn::{Attribute, Field, LitStr};

/// Struct attributes
#[derive(Debug, Default)]
pub struct StructAttrs {
    /// Prepended to every derived variable name
    pub prefix: String,
}

impl StructAttrs {
    pub fn from_attrs(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut parsed = Self::default();

        for attr in attrs {
            if !attr.path().is_ident("environ") {
                continue;
            }

            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("prefix") {
                    let lit: LitStr = meta.value()?.parse()?;
                    parsed.prefix = lit.value();
                    return Ok(());
                }

                Err(meta.error("unsupported struct-level environ attribute"))
            })?;
        }

        Ok(parsed)
    }
}

/// Field attributes
#[derive(Debug, Default)]
pub struct FieldAttrs {
    /// Explicit variable name, used without the struct prefix
    pub name: Option<String>,
    /// Some(Some(tokens)) = explicit value, Some(None) = Default trait, None = required
    pub default: Option<Option<proc_macro2::TokenStream>>,
    /// Fall back to the file named by `{NAME}_FILE`
    pub from_file: bool,
    /// Loader function path
    pub with: Option<syn::Path>,
}

impl FieldAttrs {
    pub fn from_field(field: &Field) -> syn::Result<Self> {
        let mut attrs = Self::default();

        for attr in &field.attrs {
            if !attr.path().is_ident("environ") {
                continue;
            }

            attr.parse_nested_meta(|meta| {
                // name = "..."
                if meta.path.is_ident("name") {
                    let lit: LitStr = meta.value()?.parse()?;
                    attrs.name = Some(lit.value());
                    return Ok(());
                }

                // default or default = value
                if meta.path.is_ident("default") {
                    if meta.input.peek(syn::Token![=]) {
                        let tokens: proc_macro2::TokenStream = meta.value()?.parse()?;
                        attrs.default = Some(Some(tokens));
                    } else {
                        attrs.default = Some(None);
                    }
                    return Ok(());
                }

                if meta.path.is_ident("from_file") {
                    attrs.from_file = true;
                    return Ok(());
                }

                // with = "path::to::fn"
                if meta.path.is_ident("with") {
                    let lit: LitStr = meta.value()?.parse()?;
                    attrs.with = Some(lit.parse()?);
                    return Ok(());
                }

                Err(meta.error("unsupported environ attribute"))
            })?;
        }

        Ok(attrs)
    }
}
