//! DocumentStore - Abstract JSON document storage addressed by path.
//!
//! Paths are relative to the store root and carry the document suffix
//! (e.g., `"animal.json"`, `"uuid.json"`), mirroring the Firebase REST layout.

#[cfg(feature = "http")]
mod http;
mod in_memory;
mod writer;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;

#[cfg(feature = "http")]
pub use http::HttpStore;
pub use in_memory::InMemoryStore;
pub(crate) use writer::Writer;

/// Suffix appended to a collection path to address its JSON document.
pub const DOCUMENT_SUFFIX: &str = ".json";

/// Builds the document path for a collection path segment.
pub fn document_path(collection: &str) -> String {
    format!("{}{}", collection, DOCUMENT_SUFFIX)
}

/// Abstract JSON document storage.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Read the document at `path`. An absent document (JSON `null`) is `None`.
    async fn get(&self, path: &str) -> Result<Option<Value>>;

    /// Overwrite the document at `path`.
    async fn put(&self, path: &str, value: &Value) -> Result<()>;

    /// Merge the children of `value` into the document at `path`.
    async fn patch(&self, path: &str, value: &Value) -> Result<()>;

    /// Remove the document at `path`.
    async fn delete(&self, path: &str) -> Result<()>;
}
