mod record;
mod serde_attrs;

use proc_macro::TokenStream;

/// Derive macro implementing `firebase_orm::Record` for a struct with named fields.
///
/// # Usage
///
/// ```ignore
/// #[derive(Clone, Serialize, Deserialize, Record)]
/// #[record(path = "/creatures")]
/// struct Animal {
///     #[serde(default)]
///     id: u64,
///     name: String,
///     legs: Option<u8>,
/// }
/// ```
///
/// The macro supports:
/// - `#[record(path = "...")]`: static collection path override
/// - `#[record(name = "...")]`: declared type name (defaults to the struct name)
/// - `#[record(id)]` on a `u64` field: identifier field (defaults to the field named `id`)
///
/// Field descriptors are generated from each field's Rust type and named by
/// the key serde writes: `#[serde(rename)]` first, then the container's
/// `#[serde(rename_all)]`. Skipped fields are left out. The identifier field
/// must serialize as `id`.
#[proc_macro_derive(Record, attributes(record))]
pub fn derive_record(input: TokenStream) -> TokenStream {
    record::derive_record(input)
}
