//! Implementation of #[derive(Record)]

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::ext::IdentExt;
use syn::meta::ParseNestedMeta;
use syn::{
    Attribute, Data, DeriveInput, Fields, LitStr, Token, Type, parse_macro_input, parse_quote,
};

pub fn derive_record_impl(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match expand(&input) {
        Ok(expanded) => expanded.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

/// What one field's attributes say about it.
#[derive(Default)]
struct FieldAttrs {
    rename: Option<String>,
    tag: Option<LitStr>,
    omit_empty: bool,
    flatten: bool,
    skip: bool,
}

fn expand(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let name = &input.ident;

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new(
                    name.span(),
                    "Record requires a struct with named fields",
                ));
            }
        },
        Data::Enum(data) => {
            return Err(syn::Error::new(
                data.enum_token.span,
                "Record only works on structs",
            ));
        }
        Data::Union(data) => {
            return Err(syn::Error::new(
                data.union_token.span,
                "Record only works on structs",
            ));
        }
    };

    let mut entries = Vec::with_capacity(fields.len());
    let mut zero_checks = Vec::with_capacity(fields.len());
    for field in fields {
        let Some(ident) = &field.ident else {
            continue;
        };
        // Skipped fields still count toward the record's zero value.
        zero_checks.push(quote! { (&::pick::__private::ZeroCheck(&self.#ident)).is_zero() });

        let pick = parse_pick_attrs(&field.attrs)?;
        let serde = parse_serde_attrs(&field.attrs);
        if pick.skip || serde.skip {
            continue;
        }

        let declared = ident.unraw().to_string();
        if pick.flatten || serde.flatten {
            if is_map_type(&field.ty) {
                return Err(syn::Error::new(
                    ident.span(),
                    "flattened fields must hold a record, maps cannot be flattened",
                ));
            }
            entries.push(quote! { ::pick::Field::embedded(#declared, &self.#ident) });
            continue;
        }

        // A #[pick(tag)] already carries the name; serde's rename only fills
        // in when #[pick] says nothing about it.
        let mut entry = match &pick.tag {
            Some(tag) => quote! { ::pick::Field::tagged(#declared, #tag, &self.#ident) },
            None => quote! { ::pick::Field::new(#declared, &self.#ident) },
        };
        let rename = match &pick.tag {
            Some(_) => pick.rename,
            None => pick.rename.or(serde.rename),
        };
        if let Some(alias) = rename {
            entry = quote! { #entry.rename(#alias) };
        }
        if pick.omit_empty || serde.omit_empty {
            entry = quote! { #entry.omit_empty() };
        }
        entries.push(entry);
    }

    let mut generics = input.generics.clone();
    for param in generics.type_params_mut() {
        param.bounds.push(parse_quote!(::pick::Pickable));
    }
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics ::pick::Record for #name #ty_generics #where_clause {
            fn fields(&self) -> ::std::vec::Vec<::pick::Field<'_>> {
                ::std::vec![#(#entries),*]
            }

            fn is_zero(&self) -> bool {
                #[allow(unused_imports)]
                use ::pick::__private::{OpaqueZero as _, PickableZero as _};
                true #(&& #zero_checks)*
            }
        }

        impl #impl_generics ::pick::Pickable for #name #ty_generics #where_clause {
            fn value(&self) -> ::pick::Value<'_> {
                ::pick::Value::Record(self)
            }
        }
    })
}

/// Map types serialize their keys inline under `#[serde(flatten)]`, which a
/// promoted record cannot express.
fn is_map_type(ty: &Type) -> bool {
    let Type::Path(path) = ty else {
        return false;
    };
    path.path.segments.last().is_some_and(|segment| {
        ["HashMap", "BTreeMap", "IndexMap", "Document", "Bson"]
            .iter()
            .any(|map| segment.ident == *map)
    })
}

fn parse_pick_attrs(attrs: &[Attribute]) -> syn::Result<FieldAttrs> {
    let mut out = FieldAttrs::default();

    for attr in attrs.iter().filter(|attr| attr.path().is_ident("pick")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("rename") {
                let value: LitStr = meta.value()?.parse()?;
                out.rename = Some(value.value());
            } else if meta.path.is_ident("tag") {
                out.tag = Some(meta.value()?.parse()?);
            } else if meta.path.is_ident("omit_empty") {
                out.omit_empty = true;
            } else if meta.path.is_ident("flatten") {
                out.flatten = true;
            } else if meta.path.is_ident("skip") {
                out.skip = true;
            } else {
                return Err(meta.error(
                    "unsupported pick attribute, expected one of `rename`, `tag`, `omit_empty`, `flatten`, `skip`",
                ));
            }
            Ok(())
        })?;
    }

    Ok(out)
}

/// Read the serde attributes that change a field's serialized name or
/// presence. Anything malformed is left for serde's own derive to report.
fn parse_serde_attrs(attrs: &[Attribute]) -> FieldAttrs {
    let mut out = FieldAttrs::default();

    for attr in attrs.iter().filter(|attr| attr.path().is_ident("serde")) {
        let _ = attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("rename") {
                if meta.input.peek(Token![=]) {
                    let value: LitStr = meta.value()?.parse()?;
                    out.rename = Some(value.value());
                } else {
                    // rename(serialize = "...", deserialize = "...")
                    meta.parse_nested_meta(|inner| {
                        if inner.path.is_ident("serialize") {
                            let value: LitStr = inner.value()?.parse()?;
                            out.rename = Some(value.value());
                            Ok(())
                        } else {
                            skip_meta(&inner)
                        }
                    })?;
                }
            } else if meta.path.is_ident("flatten") {
                out.flatten = true;
            } else if meta.path.is_ident("skip") || meta.path.is_ident("skip_serializing") {
                out.skip = true;
            } else if meta.path.is_ident("skip_serializing_if") {
                skip_meta(&meta)?;
                out.omit_empty = true;
            } else {
                skip_meta(&meta)?;
            }
            Ok(())
        });
    }

    out
}

/// Consume the value of a nested meta item we don't care about.
fn skip_meta(meta: &ParseNestedMeta<'_>) -> syn::Result<()> {
    if meta.input.peek(Token![=]) {
        meta.value()?.parse::<syn::Expr>()?;
    } else if meta.input.peek(syn::token::Paren) {
        meta.parse_nested_meta(|inner| skip_meta(&inner))?;
    }
    Ok(())
}
