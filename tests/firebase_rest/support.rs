//! Minimal emulation of the Firebase Realtime Database REST surface.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use firebase_orm::Record;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, Record)]
pub struct Animal {
    #[serde(default)]
    pub id: u64,
    pub name: String,
}

impl Animal {
    pub fn named(name: &str) -> Self {
        Self {
            id: 0,
            name: name.to_string(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, Record)]
#[record(path = "/creatures")]
pub struct Creature {
    #[serde(default)]
    pub id: u64,
    pub name: String,
    pub legs: Option<u8>,
}

#[derive(Clone, Default)]
pub struct FakeFirebase {
    documents: Arc<Mutex<HashMap<String, Value>>>,
    failing: Arc<AtomicBool>,
}

impl FakeFirebase {
    pub fn document(&self, path: &str) -> Option<Value> {
        self.documents.lock().unwrap().get(path).cloned()
    }

    pub fn seed(&self, path: &str, value: Value) {
        self.documents.lock().unwrap().insert(path.to_string(), value);
    }

    /// Make every subsequent request answer 503.
    pub fn fail(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }

    fn check(&self) -> Result<(), StatusCode> {
        if self.failing.load(Ordering::SeqCst) {
            Err(StatusCode::SERVICE_UNAVAILABLE)
        } else {
            Ok(())
        }
    }
}

async fn read(
    State(fb): State<FakeFirebase>,
    Path(path): Path<String>,
) -> Result<Json<Value>, StatusCode> {
    fb.check()?;
    Ok(Json(fb.document(&path).unwrap_or(Value::Null)))
}

async fn write(
    State(fb): State<FakeFirebase>,
    Path(path): Path<String>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, StatusCode> {
    fb.check()?;
    let mut docs = fb.documents.lock().unwrap();
    if body.is_null() {
        docs.remove(&path);
    } else {
        docs.insert(path, body.clone());
    }
    Ok(Json(body))
}

async fn merge(
    State(fb): State<FakeFirebase>,
    Path(path): Path<String>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, StatusCode> {
    fb.check()?;
    let children = body.as_object().cloned().ok_or(StatusCode::BAD_REQUEST)?;
    let mut docs = fb.documents.lock().unwrap();
    let entry = docs
        .entry(path)
        .or_insert_with(|| Value::Object(Default::default()));
    if let Some(target) = entry.as_object_mut() {
        target.extend(children);
    }
    Ok(Json(body))
}

async fn remove(
    State(fb): State<FakeFirebase>,
    Path(path): Path<String>,
) -> Result<Json<Value>, StatusCode> {
    fb.check()?;
    fb.documents.lock().unwrap().remove(&path);
    Ok(Json(Value::Null))
}

/// Bind to port 0 and return the emulator plus its base URL.
pub async fn start_server() -> (FakeFirebase, String) {
    let fb = FakeFirebase::default();
    let app = Router::new()
        .route("/*path", get(read).put(write).patch(merge).delete(remove))
        .with_state(fb.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (fb, format!("http://{addr}"))
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
