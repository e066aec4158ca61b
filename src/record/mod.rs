//! Records - Plain Old Rust Structs persisted as one collection per type.
//!
//! A record type declares its name, an optional static path override and a
//! field table. The `#[derive(Record)]` macro generates all of it.
//!
//! ## Example
//!
//! ```ignore
//! use firebase_orm::Record;
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Clone, Debug, Default, Serialize, Deserialize, Record)]
//! #[record(path = "/creatures")]
//! struct Animal {
//!     #[serde(default)]
//!     id: u64,
//!     name: String,
//! }
//!
//! assert_eq!(firebase_orm::resolve_collection_path::<Animal>(), "creatures");
//! ```

mod schema;

use serde::{de::DeserializeOwned, Serialize};

pub use schema::{FieldDescriptor, FieldKind, Schema};

/// Name of the identifier field every record carries in its JSON form.
/// `#[derive(Record)]` rejects an identifier field serialized under any other name.
pub const ID_FIELD: &str = "id";

/// Trait for types that can be persisted as records of a collection.
pub trait Record: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// The declared type name (e.g., "Animal").
    const NAME: &'static str;

    /// Static collection path override. Used instead of the lower-cased name.
    const PATH: Option<&'static str> = None;

    /// Statically declared field table, in declaration order.
    fn fields() -> &'static [FieldDescriptor];

    /// Returns the record identifier. Zero means not yet allocated.
    fn id(&self) -> u64;

    /// Assigns the record identifier.
    fn set_id(&mut self, id: u64);

    /// Whether this record has been through a successful create.
    fn is_persisted(&self) -> bool {
        self.id() != 0
    }
}

/// Resolves the collection path segment for a record type.
///
/// An explicit override wins, minus any leading separator; otherwise the
/// declared name lower-cased.
pub fn resolve_collection_path<R: Record>() -> String {
    match R::PATH {
        Some(path) => path.trim_start_matches('/').to_string(),
        None => R::NAME.to_lowercase(),
    }
}

/// Describes a record type: its name, collection path and fields.
pub fn schema_of<R: Record>() -> Schema {
    Schema {
        name: R::NAME,
        path: resolve_collection_path::<R>(),
        fields: R::fields(),
    }
}
