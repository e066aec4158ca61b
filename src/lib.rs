// Lets `#[derive(Record)]` expansions resolve `::firebase_orm` inside this crate.
extern crate self as firebase_orm;

mod config;
mod connection;
mod dao;
mod error;
mod id_provider;
mod record;
pub mod store;

pub use config::{ConnectionConfig, WriteMode, ENV_TIMEOUT_SECS, ENV_URL, ENV_WRITE_MODE};
pub use connection::Connection;
pub use dao::Dao;
pub use error::{OrmError, Result};
pub use id_provider::{IdProvider, ID_POOL_FIELD, ID_POOL_PATH};
pub use record::{
    resolve_collection_path, schema_of, FieldDescriptor, FieldKind, Record, Schema, ID_FIELD,
};
pub use store::{DocumentStore, InMemoryStore, DOCUMENT_SUFFIX};

#[cfg(feature = "http")]
pub use store::HttpStore;

// Re-export the derive macro alongside the trait of the same name
pub use firebase_orm_macros::Record;
