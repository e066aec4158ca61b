//! HttpStore - reqwest-backed client for the Firebase Realtime Database REST API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde_json::Value;
use tracing::debug;

use super::DocumentStore;
use crate::error::{OrmError, Result};

/// Document store speaking `GET/PUT/PATCH/DELETE {base}/{path}`.
///
/// Clone-friendly: the underlying reqwest client is reference counted.
#[derive(Clone, Debug)]
pub struct HttpStore {
    client: Client,
    base_url: String,
}

impl HttpStore {
    /// Create a store for `base_url` with a default client.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    /// Create a store whose client gives up after `timeout`.
    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, base_url))
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn check(method: &'static str, path: &str, resp: Response) -> Result<Response> {
        let status = resp.status();
        if status.is_success() {
            Ok(resp)
        } else {
            Err(OrmError::Status {
                method,
                path: path.to_string(),
                status: status.as_u16(),
            })
        }
    }
}

#[async_trait]
impl DocumentStore for HttpStore {
    async fn get(&self, path: &str) -> Result<Option<Value>> {
        debug!(%path, "GET");
        let resp = self.client.get(self.url(path)).send().await?;
        let resp = Self::check("GET", path, resp)?;
        let value: Value = resp.json().await?;
        Ok(if value.is_null() { None } else { Some(value) })
    }

    async fn put(&self, path: &str, value: &Value) -> Result<()> {
        debug!(%path, "PUT");
        let resp = self.client.put(self.url(path)).json(value).send().await?;
        Self::check("PUT", path, resp)?;
        Ok(())
    }

    async fn patch(&self, path: &str, value: &Value) -> Result<()> {
        debug!(%path, "PATCH");
        let resp = self.client.patch(self.url(path)).json(value).send().await?;
        Self::check("PATCH", path, resp)?;
        Ok(())
    }

    async fn delete(&self, path: &str) -> Result<()> {
        debug!(%path, "DELETE");
        let resp = self.client.delete(self.url(path)).send().await?;
        Self::check("DELETE", path, resp)?;
        Ok(())
    }
}
