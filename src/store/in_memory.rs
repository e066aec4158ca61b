//! InMemoryStore - HashMap-backed document store for testing and development.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use serde_json::Value;

use super::DocumentStore;
use crate::error::{OrmError, Result};

/// In-memory document store keyed by document path.
///
/// PATCH merges object children like the Firebase REST API does; a `null`
/// child removes the key. Clone-friendly via Arc; clones share documents.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    documents: Arc<RwLock<HashMap<String, Value>>>,
    requests: Arc<RwLock<Vec<(&'static str, String)>>>,
}

impl InMemoryStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every request served so far, as `(method, path)` pairs.
    pub fn requests(&self) -> Vec<(&'static str, String)> {
        self.requests
            .read()
            .map(|log| log.clone())
            .unwrap_or_default()
    }

    /// Read a document without recording a request.
    pub fn peek(&self, path: &str) -> Option<Value> {
        self.documents
            .read()
            .ok()
            .and_then(|docs| docs.get(&Self::key(path)).cloned())
    }

    fn key(path: &str) -> String {
        path.trim_start_matches('/').to_string()
    }

    fn record(&self, method: &'static str, path: &str) -> Result<()> {
        self.requests
            .write()
            .map_err(|_| OrmError::LockPoisoned("request log"))?
            .push((method, Self::key(path)));
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for InMemoryStore {
    async fn get(&self, path: &str) -> Result<Option<Value>> {
        self.record("GET", path)?;
        let docs = self
            .documents
            .read()
            .map_err(|_| OrmError::LockPoisoned("get"))?;
        Ok(docs.get(&Self::key(path)).cloned())
    }

    async fn put(&self, path: &str, value: &Value) -> Result<()> {
        self.record("PUT", path)?;
        let mut docs = self
            .documents
            .write()
            .map_err(|_| OrmError::LockPoisoned("put"))?;
        if value.is_null() {
            docs.remove(&Self::key(path));
        } else {
            docs.insert(Self::key(path), value.clone());
        }
        Ok(())
    }

    async fn patch(&self, path: &str, value: &Value) -> Result<()> {
        self.record("PATCH", path)?;
        let children = value
            .as_object()
            .ok_or_else(|| OrmError::malformed(path, "PATCH body must be an object"))?;

        let mut docs = self
            .documents
            .write()
            .map_err(|_| OrmError::LockPoisoned("patch"))?;

        let entry = docs
            .entry(Self::key(path))
            .or_insert_with(|| Value::Object(Default::default()));
        if !entry.is_object() {
            *entry = Value::Object(Default::default());
        }
        if let Value::Object(target) = entry {
            for (key, child) in children {
                if child.is_null() {
                    target.remove(key);
                } else {
                    target.insert(key.clone(), child.clone());
                }
            }
        }
        Ok(())
    }

    async fn delete(&self, path: &str) -> Result<()> {
        self.record("DELETE", path)?;
        let mut docs = self
            .documents
            .write()
            .map_err(|_| OrmError::LockPoisoned("delete"))?;
        docs.remove(&Self::key(path));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn put_and_get() {
        let store = InMemoryStore::new();
        store.put("animal.json", &json!([{ "id": 1 }])).await.unwrap();

        let loaded = store.get("animal.json").await.unwrap().unwrap();
        assert_eq!(loaded, json!([{ "id": 1 }]));
    }

    #[tokio::test]
    async fn get_missing_returns_none() {
        let store = InMemoryStore::new();
        assert!(store.get("missing.json").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn patch_merges_children() {
        let store = InMemoryStore::new();
        store.patch("uuid.json", &json!({ "uuid": 1 })).await.unwrap();
        store.patch("uuid.json", &json!({ "other": true })).await.unwrap();

        let doc = store.peek("uuid.json").unwrap();
        assert_eq!(doc, json!({ "uuid": 1, "other": true }));

        store.patch("uuid.json", &json!({ "other": null })).await.unwrap();
        assert_eq!(store.peek("uuid.json").unwrap(), json!({ "uuid": 1 }));
    }

    #[tokio::test]
    async fn patch_rejects_non_object_body() {
        let store = InMemoryStore::new();
        let err = store.patch("uuid.json", &json!(3)).await.unwrap_err();
        assert!(matches!(err, OrmError::MalformedDocument { .. }));
    }

    #[tokio::test]
    async fn delete_removes_document() {
        let store = InMemoryStore::new();
        store.put("animal.json", &json!([])).await.unwrap();
        store.delete("animal.json").await.unwrap();
        assert!(store.peek("animal.json").is_none());
    }

    #[tokio::test]
    async fn clone_shares_documents_and_log() {
        let store = InMemoryStore::new();
        let clone = store.clone();

        store.put("/animal.json", &json!({ "a": 1 })).await.unwrap();
        assert_eq!(clone.get("animal.json").await.unwrap(), Some(json!({ "a": 1 })));
        assert_eq!(
            clone.requests(),
            vec![("PUT", "animal.json".to_string()), ("GET", "animal.json".to_string())]
        );
    }
}
