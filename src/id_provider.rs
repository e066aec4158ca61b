//! IdProvider - hands out record identifiers from a shared counter document.
//!
//! The counter lives at `uuid.json` as `{ "uuid": <last allocated id> }`.
//! Counter writes are always confirmed, whatever the connection's write mode.
//! Allocation is a plain read-modify-write: two concurrent callers against the
//! same store can read the same value and receive duplicate identifiers.

use serde_json::{json, Value};
use tracing::info;

use crate::error::{OrmError, Result};
use crate::store::Writer;

/// Document path of the identifier pool.
pub const ID_POOL_PATH: &str = "uuid.json";

/// Field holding the last allocated identifier.
pub const ID_POOL_FIELD: &str = "uuid";

/// Allocates monotonically increasing identifiers for one store connection.
pub struct IdProvider {
    writer: Writer,
}

impl IdProvider {
    pub(crate) fn new(writer: &Writer) -> Self {
        Self {
            writer: writer.confirmed(),
        }
    }

    /// Allocate the next identifier. The first allocation on an empty store is 1.
    pub async fn next(&self) -> Result<u64> {
        let current = match self.writer.get(ID_POOL_PATH).await? {
            None => None,
            Some(doc) => Some(Self::read_counter(&doc)?),
        };

        let id = match current {
            None => {
                self.writer
                    .patch(ID_POOL_PATH, json!({ ID_POOL_FIELD: 1 }))
                    .await?;
                1
            }
            Some(last) => {
                let next = last.checked_add(1).ok_or_else(|| {
                    OrmError::malformed(ID_POOL_PATH, "identifier counter exhausted")
                })?;
                self.writer
                    .put(ID_POOL_PATH, json!({ ID_POOL_FIELD: next }))
                    .await?;
                next
            }
        };

        info!(id, "allocated identifier");
        Ok(id)
    }

    /// The last allocated identifier, if any, without allocating.
    pub async fn current(&self) -> Result<Option<u64>> {
        match self.writer.get(ID_POOL_PATH).await? {
            None => Ok(None),
            Some(doc) => Self::read_counter(&doc).map(Some),
        }
    }

    fn read_counter(doc: &Value) -> Result<u64> {
        doc.get(ID_POOL_FIELD)
            .and_then(Value::as_u64)
            .ok_or_else(|| {
                OrmError::malformed(ID_POOL_PATH, format!("missing integer `{ID_POOL_FIELD}`"))
            })
    }
}
