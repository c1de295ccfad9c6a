use std::collections::HashSet;

use proc_macro::TokenStream;
use quote::quote;
use syn::{
    Data, DeriveInput, Error, ExprClosure, Field, Fields, Ident, LitStr, Result, Token, Type,
    parse::{Parse, ParseStream},
    spanned::Spanned,
};

pub(crate) fn expand_from_reading(input: &DeriveInput) -> Result<TokenStream> {
    let Data::Struct(data) = &input.data else {
        return Err(Error::new(
            input.span(),
            "`FromReading` may only be derived on structs.",
        ));
    };

    let Fields::Named(fields) = &data.fields else {
        return Err(Error::new(
            input.span(),
            "`FromReading` may only be derived on structs with named fields.",
        ));
    };

    let fields = fields
        .named
        .iter()
        .map(FieldMetadata::parse)
        .map(Result::transpose)
        .flatten() // Skip fields without an attribute.
        .collect::<Result<Vec<_>>>()?;

    let mut seen = HashSet::new();
    for field in &fields {
        if !seen.insert(field.key.value()) {
            return Err(Error::new(field.key.span(), "Field names must be unique."));
        }
    }

    let cases = fields.iter().map(|field| {
        let FieldMetadata { name, key, handler } = field;

        let assignment = if let Some((field_type, handler)) = handler {
            let body = &handler.body;
            let acc = &handler.inputs[0];
            let val = &handler.inputs[1];

            quote! {
                (|#acc: &mut #field_type, #val| { #body })(&mut self.#name, value)
            }
        } else {
            quote! {
                if let Ok(value) = ::core::convert::TryFrom::try_from(value) {
                    self.#name = Some(value);
                }
            }
        };

        quote! { #key => { #assignment } }
    });

    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let expanded = quote! {
        impl #impl_generics ::rangeframe::avec::FromReading for #name #ty_generics #where_clause {
            fn add_field(&mut self, name: &str, value: u32) {
                match name {
                    #(#cases)*
                    _ => {}
                };
            }
        }
    };

    Ok(expanded.into())
}

#[derive(Debug)]
struct FieldMetadata {
    name: Ident,
    key: LitStr,
    handler: Option<(Type, ExprClosure)>,
}

impl FieldMetadata {
    fn parse(field: &Field) -> Result<Option<Self>> {
        let Some(name) = field.ident.clone() else {
            return Ok(None);
        };

        let Some(attr) = field.attrs.iter().find(|a| a.path().is_ident("field")) else {
            return Ok(None);
        };

        let FieldAttribute { key, handler } = attr.meta.require_list()?.parse_args()?;

        if let Some(handler) = &handler {
            if handler.inputs.len() != 2 {
                return Err(Error::new_spanned(
                    handler,
                    "Handler closure must have two parameters.",
                ));
            }
        } else if !is_option(&field.ty) {
            return Err(Error::new_spanned(
                &field.ty,
                "Field without a handler must have type `Option<T>`.",
            ));
        }

        let handler = handler.map(|h| (field.ty.clone(), h));

        Ok(Some(Self { name, key, handler }))
    }
}

fn is_option(ty: &Type) -> bool {
    let Type::Path(path) = ty else {
        return false;
    };

    path.path
        .segments
        .last()
        .is_some_and(|segment| segment.ident == "Option")
}

#[derive(Debug)]
struct FieldAttribute {
    key: LitStr,
    handler: Option<ExprClosure>,
}

impl Parse for FieldAttribute {
    /// Accepts `name`, `"name"`, and either followed by `, |acc, value| ...`.
    fn parse(input: ParseStream) -> Result<Self> {
        let key = if input.peek(LitStr) {
            input.parse::<LitStr>()?
        } else {
            let ident = input.parse::<Ident>()?;
            LitStr::new(&ident.to_string(), ident.span())
        };

        let handler = if !input.is_empty() {
            input.parse::<Token![,]>()?;
            Some(input.parse::<ExprClosure>()?)
        } else {
            None
        };

        Ok(Self { key, handler })
    }
}
