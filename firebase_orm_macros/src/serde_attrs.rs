//! The subset of serde attributes that decides a field's JSON key.

use syn::ext::IdentExt;
use syn::meta::ParseNestedMeta;
use syn::{DeriveInput, Field, LitStr};

/// Container-level `rename_all` rules, applied to snake_case field names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenameRule {
    Lower,
    Upper,
    Pascal,
    Camel,
    Snake,
    ScreamingSnake,
    Kebab,
    ScreamingKebab,
}

impl RenameRule {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "lowercase" => Some(RenameRule::Lower),
            "UPPERCASE" => Some(RenameRule::Upper),
            "PascalCase" => Some(RenameRule::Pascal),
            "camelCase" => Some(RenameRule::Camel),
            "snake_case" => Some(RenameRule::Snake),
            "SCREAMING_SNAKE_CASE" => Some(RenameRule::ScreamingSnake),
            "kebab-case" => Some(RenameRule::Kebab),
            "SCREAMING-KEBAB-CASE" => Some(RenameRule::ScreamingKebab),
            _ => None,
        }
    }

    pub fn apply(self, field: &str) -> String {
        match self {
            RenameRule::Lower | RenameRule::Snake => field.to_string(),
            RenameRule::Upper | RenameRule::ScreamingSnake => field.to_ascii_uppercase(),
            RenameRule::Pascal => {
                let mut pascal = String::with_capacity(field.len());
                let mut capitalize = true;
                for ch in field.chars() {
                    if ch == '_' {
                        capitalize = true;
                    } else if capitalize {
                        pascal.push(ch.to_ascii_uppercase());
                        capitalize = false;
                    } else {
                        pascal.push(ch);
                    }
                }
                pascal
            }
            RenameRule::Camel => {
                let pascal = RenameRule::Pascal.apply(field);
                let mut chars = pascal.chars();
                match chars.next() {
                    Some(first) => first.to_ascii_lowercase().to_string() + chars.as_str(),
                    None => pascal,
                }
            }
            RenameRule::Kebab => field.replace('_', "-"),
            RenameRule::ScreamingKebab => RenameRule::ScreamingSnake.apply(field).replace('_', "-"),
        }
    }
}

/// Reads `#[serde(rename_all = "...")]` from the container.
pub fn rename_all(input: &DeriveInput) -> syn::Result<Option<RenameRule>> {
    let mut rule = None;
    for attr in &input.attrs {
        if !attr.path().is_ident("serde") {
            continue;
        }
        // Malformed serde attributes are serde's to report.
        let _ = attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("rename_all") {
                if let Some(name) = serialize_value(&meta)? {
                    rule = Some(name);
                }
            } else {
                skip_value(&meta)?;
            }
            Ok(())
        });
    }

    match rule {
        None => Ok(None),
        Some(name) => RenameRule::from_name(&name).map(Some).ok_or_else(|| {
            syn::Error::new_spanned(
                &input.ident,
                format!("Record derive: unsupported rename_all rule `{name}`"),
            )
        }),
    }
}

#[derive(Default)]
struct FieldAttrs {
    skip: bool,
    rename: Option<String>,
}

fn field_attrs(field: &Field) -> FieldAttrs {
    let mut attrs = FieldAttrs::default();
    for attr in &field.attrs {
        if !attr.path().is_ident("serde") {
            continue;
        }
        let _ = attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("skip") || meta.path.is_ident("skip_serializing") {
                attrs.skip = true;
            } else if meta.path.is_ident("rename") {
                if let Some(name) = serialize_value(&meta)? {
                    attrs.rename = Some(name);
                }
            } else {
                skip_value(&meta)?;
            }
            Ok(())
        });
    }
    attrs
}

/// Whether serde leaves the field out of the serialized form.
pub fn skipped(field: &Field) -> bool {
    field_attrs(field).skip
}

/// The JSON key serde writes for `field`.
pub fn field_name(field: &Field, rule: Option<RenameRule>) -> String {
    if let Some(rename) = field_attrs(field).rename {
        return rename;
    }
    let ident = field
        .ident
        .as_ref()
        .map(|ident| ident.unraw().to_string())
        .unwrap_or_default();
    match rule {
        Some(rule) => rule.apply(&ident),
        None => ident,
    }
}

/// `key = "..."` or `key(serialize = "...", deserialize = "...")`.
fn serialize_value(meta: &ParseNestedMeta) -> syn::Result<Option<String>> {
    if meta.input.peek(syn::Token![=]) {
        let value: LitStr = meta.value()?.parse()?;
        return Ok(Some(value.value()));
    }
    let mut serialize = None;
    meta.parse_nested_meta(|nested| {
        let value: LitStr = nested.value()?.parse()?;
        if nested.path.is_ident("serialize") {
            serialize = Some(value.value());
        }
        Ok(())
    })?;
    Ok(serialize)
}

fn skip_value(meta: &ParseNestedMeta) -> syn::Result<()> {
    if meta.input.peek(syn::Token![=]) {
        let _: syn::Expr = meta.value()?.parse()?;
    } else if meta.input.peek(syn::token::Paren) {
        meta.parse_nested_meta(|nested| skip_value(&nested))?;
    }
    Ok(())
}
