//! Registry - one `Dao` per record type, created on first use.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use tracing::debug;

use crate::dao::Dao;
use crate::record::{schema_of, Record, Schema};

struct Entry {
    dao: Arc<dyn Any + Send + Sync>,
    schema: Schema,
}

/// Maps record types to their data access objects. Entries are never evicted.
#[derive(Default)]
pub(crate) struct Registry {
    entries: RwLock<HashMap<TypeId, Entry>>,
}

impl Registry {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Return the `Dao` registered for `R`, building it with `make` on first request.
    pub(crate) fn resolve<R: Record>(&self, make: impl FnOnce() -> Dao<R>) -> Arc<Dao<R>> {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let entry = entries.entry(TypeId::of::<R>()).or_insert_with(|| {
            let dao = make();
            debug!(record = R::NAME, collection = %dao.collection_path(), "registered record type");
            Entry {
                dao: Arc::new(dao),
                schema: schema_of::<R>(),
            }
        });

        match Arc::clone(&entry.dao).downcast::<Dao<R>>() {
            Ok(dao) => dao,
            // Entries are keyed by `TypeId::of::<R>()`.
            Err(_) => unreachable!("registry entry for {} holds another type", R::NAME),
        }
    }

    /// Schemas of every registered record type, sorted by collection path.
    pub(crate) fn schemas(&self) -> Vec<Schema> {
        let mut schemas: Vec<Schema> = self
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .map(|entry| entry.schema.clone())
            .collect();
        schemas.sort_by(|a, b| a.path.cmp(&b.path));
        schemas
    }
}
