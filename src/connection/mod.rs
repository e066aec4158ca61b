//! Connection - a store connection plus its identifier pool and type registry.
//!
//! ## Example
//!
//! ```ignore
//! use firebase_orm::{Connection, ConnectionConfig};
//!
//! let conn = Connection::open(&ConnectionConfig::new("https://zoo.firebaseio.com"))?;
//! let animals = conn.dao::<Animal>();
//!
//! let mut elephant = Animal::named("Elephant");
//! animals.save(&mut elephant).await?;
//! assert_eq!(elephant.id, 1);
//! ```

mod registry;

use std::sync::Arc;

use crate::config::{ConnectionConfig, WriteMode};
use crate::dao::Dao;
use crate::error::Result;
use crate::id_provider::IdProvider;
use crate::record::{Record, Schema};
use crate::store::{DocumentStore, Writer};

use registry::Registry;

struct Inner {
    writer: Writer,
    ids: Arc<IdProvider>,
    registry: Registry,
}

/// Handle to one store. Clones share the identifier pool and registry.
#[derive(Clone)]
pub struct Connection {
    inner: Arc<Inner>,
}

impl Connection {
    /// Connect over HTTP using `config`.
    #[cfg(feature = "http")]
    pub fn open(config: &ConnectionConfig) -> Result<Self> {
        use crate::store::HttpStore;

        let store = match config.timeout() {
            Some(timeout) => HttpStore::with_timeout(&config.base_url, timeout)?,
            None => HttpStore::new(&config.base_url),
        };
        tracing::info!(base_url = %store.base_url(), write_mode = %config.write_mode, "opened connection");
        Ok(Self::with_store(store, config.write_mode))
    }

    /// Connect using settings from the environment (see `ConnectionConfig::from_env`).
    #[cfg(feature = "http")]
    pub fn from_env() -> Result<Self> {
        Self::open(&ConnectionConfig::from_env()?)
    }

    /// Connect to an arbitrary document store.
    pub fn with_store(store: impl DocumentStore + 'static, write_mode: WriteMode) -> Self {
        let writer = Writer::new(Arc::new(store), write_mode);
        Self {
            inner: Arc::new(Inner {
                ids: Arc::new(IdProvider::new(&writer)),
                writer,
                registry: Registry::new(),
            }),
        }
    }

    /// The data access object for `R`. The same instance is returned for
    /// every call on this connection.
    pub fn dao<R: Record>(&self) -> Arc<Dao<R>> {
        self.inner.registry.resolve(|| {
            Dao::new(self.inner.writer.clone(), Arc::clone(&self.inner.ids))
        })
    }

    /// The identifier pool shared by every record type on this connection.
    pub fn ids(&self) -> &IdProvider {
        &self.inner.ids
    }

    pub fn write_mode(&self) -> WriteMode {
        self.inner.writer.mode()
    }

    /// Schemas of the record types resolved so far.
    pub fn registered(&self) -> Vec<Schema> {
        self.inner.registry.schemas()
    }
}
