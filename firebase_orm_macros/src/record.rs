use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{Data, DeriveInput, Field, Fields, GenericArgument, Ident, LitStr, PathArguments, Type};

use crate::serde_attrs::{self, RenameRule};

/// Mirrors `firebase_orm::ID_FIELD`.
const ID_FIELD: &str = "id";

pub fn derive_record(input: TokenStream) -> TokenStream {
    let input = syn::parse_macro_input!(input as DeriveInput);
    match expand(&input) {
        Ok(tokens) => TokenStream::from(tokens),
        Err(err) => TokenStream::from(err.to_compile_error()),
    }
}

fn expand(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let attrs = RecordAttrs::parse(input)?;
    let fields = named_fields(input)?;
    let rule = serde_attrs::rename_all(input)?;
    let id_field = extract_id_field(name, fields)?;
    check_id_name(id_field, rule)?;
    let id_ident = &id_field.ident;

    let record_name = attrs.name.unwrap_or_else(|| name.to_string());
    let path = match attrs.path {
        Some(path) => quote! { ::core::option::Option::Some(#path) },
        None => quote! { ::core::option::Option::None },
    };

    let descriptors = fields
        .iter()
        .filter(|field| !serde_attrs::skipped(field))
        .map(|field| {
            let field_name = serde_attrs::field_name(field, rule);
            let kind = field_kind(&field.ty);
            quote! {
                ::firebase_orm::FieldDescriptor::new(#field_name, ::firebase_orm::FieldKind::#kind)
            }
        });

    Ok(quote! {
        impl #impl_generics ::firebase_orm::Record for #name #ty_generics #where_clause {
            const NAME: &'static str = #record_name;
            const PATH: ::core::option::Option<&'static str> = #path;

            fn fields() -> &'static [::firebase_orm::FieldDescriptor] {
                const FIELDS: &[::firebase_orm::FieldDescriptor] = &[#(#descriptors),*];
                FIELDS
            }

            fn id(&self) -> u64 {
                self.#id_ident
            }

            fn set_id(&mut self, id: u64) {
                self.#id_ident = id;
            }
        }
    })
}

#[derive(Default)]
struct RecordAttrs {
    name: Option<String>,
    path: Option<String>,
}

impl RecordAttrs {
    fn parse(input: &DeriveInput) -> syn::Result<Self> {
        let mut attrs = RecordAttrs::default();
        for attr in &input.attrs {
            if !attr.path().is_ident("record") {
                continue;
            }
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("path") {
                    let value: LitStr = meta.value()?.parse()?;
                    attrs.path = Some(value.value());
                    Ok(())
                } else if meta.path.is_ident("name") {
                    let value: LitStr = meta.value()?.parse()?;
                    attrs.name = Some(value.value());
                    Ok(())
                } else {
                    Err(meta.error("expected `path = \"...\"` or `name = \"...\"`"))
                }
            })?;
        }
        Ok(attrs)
    }
}

fn named_fields(input: &DeriveInput) -> syn::Result<&syn::punctuated::Punctuated<Field, syn::Token![,]>> {
    if let Data::Struct(data_struct) = &input.data {
        if let Fields::Named(fields) = &data_struct.fields {
            return Ok(&fields.named);
        }
    }
    Err(syn::Error::new_spanned(
        &input.ident,
        "Record derive: only structs with named fields are supported",
    ))
}

fn extract_id_field<'a>(
    name: &Ident,
    fields: &'a syn::punctuated::Punctuated<Field, syn::Token![,]>,
) -> syn::Result<&'a Field> {
    for field in fields {
        for attr in &field.attrs {
            if !attr.path().is_ident("record") {
                continue;
            }
            let mut is_id = false;
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("id") {
                    is_id = true;
                    Ok(())
                } else {
                    Err(meta.error("expected `id`"))
                }
            })?;
            if is_id {
                return Ok(field);
            }
        }
    }

    // Default: look for a field named "id"
    fields
        .iter()
        .find(|field| field.ident.as_ref().is_some_and(|ident| ident == ID_FIELD))
        .ok_or_else(|| {
            syn::Error::new_spanned(
                name,
                "Record derive: no field marked with #[record(id)] and no field named `id`",
            )
        })
}

/// The identifier must serialize under `firebase_orm::ID_FIELD`.
fn check_id_name(field: &Field, rule: Option<RenameRule>) -> syn::Result<()> {
    let ident = field.ident.as_ref().map(ToString::to_string).unwrap_or_default();
    if serde_attrs::skipped(field) {
        return Err(syn::Error::new_spanned(
            field,
            format!("Record derive: identifier field `{ident}` must not be skipped by serde"),
        ));
    }
    let serialized = serde_attrs::field_name(field, rule);
    if serialized != ID_FIELD {
        return Err(syn::Error::new_spanned(
            field,
            format!(
                "Record derive: identifier field `{ident}` serializes as `{serialized}`; \
                 it must serialize as `{ID_FIELD}` (add #[serde(rename = \"{ID_FIELD}\")])"
            ),
        ));
    }
    Ok(())
}

fn field_kind(ty: &Type) -> Ident {
    let kind = match ty {
        Type::Reference(reference) => return field_kind(&reference.elem),
        Type::Group(group) => return field_kind(&group.elem),
        Type::Paren(paren) => return field_kind(&paren.elem),
        Type::Array(_) | Type::Slice(_) | Type::Tuple(_) => "List",
        Type::Path(type_path) => match type_path.path.segments.last() {
            Some(segment) => path_kind(&segment.ident.to_string(), &segment.arguments),
            None => "Object",
        },
        _ => "Object",
    };
    Ident::new(kind, proc_macro2::Span::call_site())
}

fn path_kind(ident: &str, arguments: &PathArguments) -> &'static str {
    match ident {
        "u8" | "u16" | "u32" | "u64" | "u128" | "usize" | "i8" | "i16" | "i32" | "i64"
        | "i128" | "isize" => "Integer",
        "f32" | "f64" => "Float",
        "String" | "str" | "char" => "Text",
        "bool" => "Boolean",
        "Vec" | "VecDeque" | "HashSet" | "BTreeSet" => "List",
        "HashMap" | "BTreeMap" | "IndexMap" => "Map",
        "Option" => "Optional",
        "Box" | "Arc" | "Rc" | "Cow" => match first_type_argument(arguments) {
            Some(inner) => {
                let kind = field_kind(inner).to_string();
                static_kind(&kind)
            }
            None => "Object",
        },
        _ => "Object",
    }
}

fn first_type_argument(arguments: &PathArguments) -> Option<&Type> {
    if let PathArguments::AngleBracketed(args) = arguments {
        args.args.iter().find_map(|arg| match arg {
            GenericArgument::Type(ty) => Some(ty),
            _ => None,
        })
    } else {
        None
    }
}

fn static_kind(kind: &str) -> &'static str {
    match kind {
        "Integer" => "Integer",
        "Float" => "Float",
        "Text" => "Text",
        "Boolean" => "Boolean",
        "List" => "List",
        "Map" => "Map",
        "Optional" => "Optional",
        _ => "Object",
    }
}
