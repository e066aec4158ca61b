//! Dao - per-type data access object over one collection document.
//!
//! Every read fetches the whole collection and replaces the local cache.
//! Every write pushes the whole local cache back, overwriting the remote
//! collection. Operations on the same `Dao` are not mutually excluded: two
//! interleaved saves can lose an update (last full push wins).

use std::sync::{Arc, OnceLock, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde_json::Value;
use tracing::{debug, info};

use crate::error::{OrmError, Result};
use crate::id_provider::IdProvider;
use crate::record::{resolve_collection_path, schema_of, Record, Schema};
use crate::store::{document_path, Writer};

/// Data access object for records of type `R`.
pub struct Dao<R: Record> {
    writer: Writer,
    ids: Arc<IdProvider>,
    collection_path: OnceLock<String>,
    cache: RwLock<Vec<R>>,
}

impl<R: Record> Dao<R> {
    pub(crate) fn new(writer: Writer, ids: Arc<IdProvider>) -> Self {
        Self {
            writer,
            ids,
            collection_path: OnceLock::new(),
            cache: RwLock::new(Vec::new()),
        }
    }

    /// Collection path segment, resolved once on first use.
    pub fn collection_path(&self) -> &str {
        self.collection_path
            .get_or_init(resolve_collection_path::<R>)
    }

    /// Document path of the collection (path plus `.json`).
    pub fn document_path(&self) -> String {
        document_path(self.collection_path())
    }

    pub fn schema(&self) -> Schema {
        schema_of::<R>()
    }

    /// Snapshot of the local cache as of the last read or write. No round trip.
    pub fn cached(&self) -> Vec<R> {
        self.cache_read().clone()
    }

    /// Fetch every record of the collection, replacing the local cache.
    pub async fn find_all(&self) -> Result<Vec<R>> {
        let path = self.document_path();
        let records = match self.writer.get(&path).await? {
            None => Vec::new(),
            Some(doc) => decode_collection::<R>(&path, doc)?,
        };
        debug!(collection = %path, records = records.len(), "loaded collection");

        *self.cache_write() = records.clone();
        Ok(records)
    }

    pub async fn find_by_id(&self, id: u64) -> Result<Option<R>> {
        Ok(self.find_all().await?.into_iter().find(|r| r.id() == id))
    }

    pub async fn first(&self) -> Result<Option<R>> {
        Ok(self.find_all().await?.into_iter().next())
    }

    pub async fn last(&self) -> Result<Option<R>> {
        Ok(self.find_all().await?.pop())
    }

    pub async fn count(&self) -> Result<usize> {
        Ok(self.find_all().await?.len())
    }

    pub async fn is_empty(&self) -> Result<bool> {
        Ok(self.count().await? == 0)
    }

    pub async fn is_not_empty(&self) -> Result<bool> {
        Ok(!self.is_empty().await?)
    }

    /// Whether a record with the same identifier exists remotely.
    pub async fn contains(&self, record: &R) -> Result<bool> {
        Ok(self.find_by_id(record.id()).await?.is_some())
    }

    /// Create or update a record.
    ///
    /// A persisted record whose identifier is in the local cache replaces that
    /// entry. Anything else refreshes the cache first; if the identifier is
    /// still unknown, a new one is allocated and assigned to `record` in place
    /// before the record is appended. Either way the full cache is pushed.
    pub async fn save(&self, record: &mut R) -> Result<R> {
        if self.replace_cached(record) {
            self.push().await?;
            return Ok(record.clone());
        }

        self.find_all().await?;
        if self.replace_cached(record) {
            self.push().await?;
            return Ok(record.clone());
        }

        let id = self.ids.next().await?;
        record.set_id(id);
        self.cache_write().push(record.clone());
        self.push().await?;
        Ok(record.clone())
    }

    /// Remove the record with the same identifier as `record`, if present.
    ///
    /// Returns the argument, not the removed cache entry. An unknown
    /// identifier leaves the store untouched.
    pub async fn delete(&self, record: &R) -> Result<R> {
        self.find_all().await?;

        let removed = {
            let mut cache = self.cache_write();
            match cache.iter().position(|cached| cached.id() == record.id()) {
                Some(index) => {
                    cache.remove(index);
                    true
                }
                None => false,
            }
        };

        if removed {
            self.push().await?;
        } else {
            debug!(collection = %self.collection_path(), id = record.id(), "delete: no such record");
        }
        Ok(record.clone())
    }

    /// Delete the whole collection document and clear the local cache.
    /// The identifier pool is left alone.
    pub async fn delete_all(&self) -> Result<()> {
        let path = self.document_path();
        self.writer.delete(&path).await?;
        self.cache_write().clear();
        info!(collection = %path, "deleted collection");
        Ok(())
    }

    fn replace_cached(&self, record: &R) -> bool {
        if !record.is_persisted() {
            return false;
        }
        let mut cache = self.cache_write();
        match cache.iter_mut().find(|cached| cached.id() == record.id()) {
            Some(slot) => {
                *slot = record.clone();
                true
            }
            None => false,
        }
    }

    async fn push(&self) -> Result<()> {
        let path = self.document_path();
        let (body, records) = {
            let cache = self.cache_read();
            (serde_json::to_value(&*cache)?, cache.len())
        };
        self.writer.put(&path, body).await?;
        info!(collection = %path, records, "pushed collection");
        Ok(())
    }

    // Poisoning is ignored: the cache is rebuilt wholesale on the next read.
    fn cache_read(&self) -> RwLockReadGuard<'_, Vec<R>> {
        self.cache.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn cache_write(&self) -> RwLockWriteGuard<'_, Vec<R>> {
        self.cache.write().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Decode a collection document into records, in document order.
///
/// Accepts a key-to-record object or an array (Firebase returns arrays for
/// collections keyed by consecutive integers); `null` entries are skipped.
fn decode_collection<R: Record>(path: &str, doc: Value) -> Result<Vec<R>> {
    let entries: Vec<Value> = match doc {
        Value::Object(map) => map.into_iter().map(|(_, entry)| entry).collect(),
        Value::Array(items) => items,
        other => {
            return Err(OrmError::malformed(
                path,
                format!("expected object or array, found {other}"),
            ))
        }
    };

    entries
        .into_iter()
        .filter(|entry| !entry.is_null())
        .map(|entry| serde_json::from_value(entry).map_err(OrmError::from))
        .collect()
}
