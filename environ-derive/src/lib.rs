//! Derive macro implementation for environ

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{parse_macro_input, Data, DeriveInput, Field, Fields, Type};

mod attrs;

use attrs::{FieldAttrs, StructAttrs};

/// Extract inner type from Option<T>
fn option_inner_type(ty: &Type) -> Option<&Type> {
    let Type::Path(type_path) = ty else {
        return None;
    };
    let seg = type_path.path.segments.last()?;
    if seg.ident != "Option" {
        return None;
    }
    match &seg.arguments {
        syn::PathArguments::AngleBracketed(args) => match args.args.first() {
            Some(syn::GenericArgument::Type(inner)) => Some(inner),
            _ => None,
        },
        _ => None,
    }
}

/// `Environ` derive macro
///
/// Implements `from_store(&ValueStore)` and `from_env()` on structs with
/// named fields. Field types implement `environ::FromValue` unless a `with`
/// loader is given.
///
/// # Supported Attributes
///
/// **Struct-level**:
/// - `#[environ(prefix = "PREFIX_")]`: Add prefix to derived variable names
///
/// **Field-level**:
/// - `#[environ(name = "CUSTOM_NAME")]`: Explicit variable name (no prefix)
/// - `#[environ(default)]`: Use `Default::default()` if the variable is not set
/// - `#[environ(default = value)]`: Use an explicit default if the variable is not set
/// - `#[environ(from_file)]`: Support the `{VAR}_FILE` pattern
/// - `#[environ(with = "path::to::fn")]`: Load with `fn(&ValueStore, &str) -> environ::Result<T>`
///
/// # Example
///
/// See the `environ` crate documentation for usage examples.
#[proc_macro_derive(Environ, attributes(environ))]
pub fn derive_environ(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

fn expand(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let struct_name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();
    let struct_attrs = StructAttrs::from_attrs(&input.attrs)?;

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    input,
                    "Environ only supports structs with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                input,
                "Environ only supports structs",
            ));
        }
    };

    let field_initializers = fields
        .iter()
        .map(|field| field_initializer(field, &struct_attrs.prefix))
        .collect::<syn::Result<Vec<_>>>()?;

    Ok(quote! {
        impl #impl_generics #struct_name #ty_generics #where_clause {
            /// Load configuration from a value store
            ///
            /// # Errors
            ///
            /// - Required variables are not set
            /// - Values cannot be cast into the field types
            /// - File-based values fail to read their files
            pub fn from_store(__store: &::environ::ValueStore) -> ::environ::anyhow::Result<Self> {
                Ok(Self {
                    #(#field_initializers),*
                })
            }

            /// Load configuration from a snapshot of the process environment
            ///
            /// # Errors
            ///
            /// See `from_store`.
            pub fn from_env() -> ::environ::anyhow::Result<Self> {
                Self::from_store(&::environ::ValueStore::from_env())
            }
        }
    })
}

fn field_initializer(field: &Field, prefix: &str) -> syn::Result<TokenStream2> {
    let Some(field_name) = field.ident.as_ref() else {
        return Err(syn::Error::new_spanned(field, "expected a named field"));
    };
    let field_type = &field.ty;
    let attrs = FieldAttrs::from_field(field)?;
    let option_inner = option_inner_type(field_type);

    // Explicit names are used as written
    let env_var_name = attrs
        .name
        .clone()
        .unwrap_or_else(|| format!("{prefix}{}", field_name.to_string().to_uppercase()));
    let load_from_file = attrs.from_file;

    if option_inner.is_some() && attrs.default.is_some() {
        return Err(syn::Error::new_spanned(
            field,
            "Option<T> fields cannot have default attribute (they default to None automatically)",
        ));
    }

    let expr = if let Some(func) = &attrs.with {
        if attrs.default.is_some() {
            return Err(syn::Error::new_spanned(
                field,
                "default value is not supported with the with attribute",
            ));
        }
        if attrs.from_file {
            return Err(syn::Error::new_spanned(
                field,
                "from_file is not supported with the with attribute",
            ));
        }
        if option_inner.is_some() {
            quote! {
                if __store.contains(#env_var_name) {
                    Some(#func(__store, #env_var_name)?)
                } else {
                    None
                }
            }
        } else {
            quote! { #func(__store, #env_var_name)? }
        }
    } else if let Some(inner_type) = option_inner {
        quote! {
            ::environ::de::optional::<#inner_type>(__store, #env_var_name, #load_from_file)?
        }
    } else {
        match &attrs.default {
            Some(Some(default_value)) => quote! {
                ::environ::de::with_default::<#field_type>(
                    __store,
                    #env_var_name,
                    #load_from_file,
                    #default_value
                )?
            },
            Some(None) => quote! {
                ::environ::de::with_default::<#field_type>(
                    __store,
                    #env_var_name,
                    #load_from_file,
                    ::core::default::Default::default()
                )?
            },
            None => quote! {
                ::environ::de::required::<#field_type>(__store, #env_var_name, #load_from_file)?
            },
        }
    };

    Ok(quote! { #field_name: #expr })
}
