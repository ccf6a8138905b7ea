// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

extern crate proc_macro;

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{
    parse_macro_input, parse_quote, Attribute, Data, DeriveInput, Fields, GenericParam, LitStr,
};

/// Serializable member gathered from a named field.
struct MemberField {
    ident: syn::Ident,
    ty: syn::Type,
    /// Name used in schemas and dynamic records.
    wire_name: String,
}

/// Options from `#[message(...)]` on a field.
#[derive(Default)]
struct FieldOptions {
    rename: Option<String>,
    skip: bool,
}

/// `#[derive(Message)]` macro: generates `TypeInfo`, the canonical type name
/// and the conversions to and from `DynamicValue`.
///
/// Supports:
/// - structs with named fields whose types all implement `Message`
/// - generic structs over type parameters (bounds are added automatically)
/// - `#[message(name = "...")]` on the struct to override the canonical name
/// - `#[message(rename = "...")]` on a field to change its member name
/// - `#[message(skip)]` on a field to leave it out of the schema
///
/// The struct must implement `Default`; decoding starts from the default
/// value and assigns every serialized member.
///
/// Example:
/// ```ignore
/// use automessage::Message;
///
/// #[derive(Default, Message)]
/// struct ImageMeta {
///     image_id: u32,
///     #[message(rename = "Format")]
///     format: String,
///     data: Vec<u8>,
///     #[message(skip)]
///     decoded: Option<Vec<u8>>,
/// }
/// ```
#[proc_macro_derive(Message, attributes(message))]
pub fn derive_message(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match expand(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn expand(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let ident = &input.ident;
    let short_name = ident.to_string();

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(named) => &named.named,
            Fields::Unit => {
                return expand_with_members(input, &short_name, Vec::new());
            }
            Fields::Unnamed(_) => {
                return Err(syn::Error::new_spanned(
                    input,
                    "Only structs with named fields are supported",
                ))
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                input,
                "Only structs are supported",
            ))
        }
    };

    let mut members = Vec::with_capacity(fields.len());
    for field in fields {
        let Some(field_ident) = field.ident.as_ref() else {
            return Err(syn::Error::new_spanned(field, "Field must have a name"));
        };
        let options = field_options(&field.attrs)?;
        if options.skip {
            continue;
        }
        members.push(MemberField {
            ident: field_ident.clone(),
            ty: field.ty.clone(),
            wire_name: options
                .rename
                .unwrap_or_else(|| field_ident.to_string()),
        });
    }

    let mut seen = std::collections::HashSet::new();
    for member in &members {
        if !seen.insert(member.wire_name.as_str()) {
            return Err(syn::Error::new_spanned(
                &member.ident,
                format!("duplicate member name `{}`", member.wire_name),
            ));
        }
    }

    expand_with_members(input, &short_name, members)
}

fn expand_with_members(
    input: &DeriveInput,
    short_name: &str,
    members: Vec<MemberField>,
) -> syn::Result<TokenStream2> {
    let ident = &input.ident;
    let name_override = struct_name_override(&input.attrs)?;

    // Only type parameters are supported; they become generic arguments of
    // the canonical name.
    let mut type_params = Vec::new();
    for param in &input.generics.params {
        match param {
            GenericParam::Type(ty) => type_params.push(ty.ident.clone()),
            GenericParam::Lifetime(lt) => {
                return Err(syn::Error::new_spanned(
                    lt,
                    "Message types cannot borrow; lifetime parameters are not supported",
                ))
            }
            GenericParam::Const(c) => {
                return Err(syn::Error::new_spanned(
                    c,
                    "const generic parameters are not supported",
                ))
            }
        }
    }

    let mut generics = input.generics.clone();
    {
        let where_clause = generics.make_where_clause();
        for param in &type_params {
            where_clause
                .predicates
                .push(parse_quote!(#param: ::automessage::Message));
        }
        where_clause
            .predicates
            .push(parse_quote!(Self: ::core::default::Default));
    }
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    let base_name = match name_override {
        Some(name) => quote! { #name },
        None => quote! { ::core::concat!(::core::module_path!(), "::", #short_name) },
    };
    let type_name_body = if type_params.is_empty() {
        quote! { ::std::string::String::from(#base_name) }
    } else {
        quote! {
            let args: ::std::vec::Vec<::std::string::String> = ::std::vec![
                #(<#type_params as ::automessage::Message>::type_name()),*
            ];
            ::std::format!("{}<{}>", #base_name, args.join(", "))
        }
    };

    let wire_names: Vec<&str> = members.iter().map(|m| m.wire_name.as_str()).collect();
    let field_idents: Vec<&syn::Ident> = members.iter().map(|m| &m.ident).collect();
    let field_types: Vec<&syn::Type> = members.iter().map(|m| &m.ty).collect();

    Ok(quote! {
        impl #impl_generics ::automessage::Message for #ident #ty_generics #where_clause {
            fn type_info() -> ::std::sync::Arc<::automessage::TypeInfo> {
                ::std::sync::Arc::new(::automessage::TypeInfo::record(
                    <Self as ::automessage::Message>::type_name(),
                    #short_name,
                    ::std::vec![
                        #(::automessage::MemberInfo::new(
                            #wire_names,
                            ::automessage::TypeRef::Lazy(
                                <#field_types as ::automessage::Message>::type_info
                            ),
                        )),*
                    ],
                ))
            }

            fn type_name() -> ::std::string::String {
                #type_name_body
            }

            fn to_value(&self) -> ::automessage::Result<::automessage::DynamicValue> {
                #[allow(unused_mut)]
                let mut record = ::automessage::DynamicRecord::new(
                    <Self as ::automessage::Message>::type_name(),
                );
                #(
                    record.insert(
                        #wire_names,
                        ::automessage::Message::to_value(&self.#field_idents)?,
                    );
                )*
                ::core::result::Result::Ok(::automessage::DynamicValue::Record(record))
            }

            fn from_value(
                value: ::automessage::DynamicValue,
            ) -> ::automessage::Result<Self> {
                #[allow(unused_mut, unused_variables)]
                let mut record = value.into_record()?;
                #[allow(unused_mut)]
                let mut out = <Self as ::core::default::Default>::default();
                #(
                    if let ::core::option::Option::Some(field) = record.take(#wire_names) {
                        out.#field_idents =
                            <#field_types as ::automessage::Message>::from_value(field)?;
                    }
                )*
                ::core::result::Result::Ok(out)
            }
        }
    })
}

fn is_message_attr(attr: &Attribute) -> bool {
    attr.path().is_ident("message")
}

fn field_options(attrs: &[Attribute]) -> syn::Result<FieldOptions> {
    let mut options = FieldOptions::default();
    for attr in attrs.iter().filter(|a| is_message_attr(a)) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("rename") {
                let lit: LitStr = meta.value()?.parse()?;
                options.rename = Some(lit.value());
                Ok(())
            } else if meta.path.is_ident("skip") {
                options.skip = true;
                Ok(())
            } else {
                Err(meta.error("unsupported field attribute; expected `rename` or `skip`"))
            }
        })?;
    }
    Ok(options)
}

fn struct_name_override(attrs: &[Attribute]) -> syn::Result<Option<String>> {
    let mut name = None;
    for attr in attrs.iter().filter(|a| is_message_attr(a)) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("name") {
                let lit: LitStr = meta.value()?.parse()?;
                name = Some(lit.value());
                Ok(())
            } else {
                Err(meta.error("unsupported struct attribute; expected `name`"))
            }
        })?;
    }
    Ok(name)
}
