//! Writer - dispatches store writes according to the configured `WriteMode`.
//!
//! Best-effort writes go through one queue per connection, drained in order
//! by a single worker task. Reads made through the writer wait for the queue
//! to drain first, so a caller always observes its own earlier writes.

use std::sync::{Arc, OnceLock};

use serde_json::Value;
use tokio::runtime::Handle;
use tokio::sync::{mpsc, oneshot};
use tracing::warn;

use super::DocumentStore;
use crate::config::WriteMode;
use crate::error::Result;

#[derive(Debug, Clone, Copy)]
enum WriteOp {
    Put,
    Patch,
    Delete,
}

impl WriteOp {
    fn name(self) -> &'static str {
        match self {
            WriteOp::Put => "PUT",
            WriteOp::Patch => "PATCH",
            WriteOp::Delete => "DELETE",
        }
    }
}

enum Job {
    Write {
        op: WriteOp,
        path: String,
        value: Value,
    },
    Flush(oneshot::Sender<()>),
}

/// Shared handle to a store plus the write policy for it.
#[derive(Clone)]
pub(crate) struct Writer {
    store: Arc<dyn DocumentStore>,
    mode: WriteMode,
    queue: Arc<OnceLock<mpsc::UnboundedSender<Job>>>,
}

impl Writer {
    pub(crate) fn new(store: Arc<dyn DocumentStore>, mode: WriteMode) -> Self {
        Self {
            store,
            mode,
            queue: Arc::new(OnceLock::new()),
        }
    }

    /// A writer on the same store and queue that always awaits its writes.
    pub(crate) fn confirmed(&self) -> Self {
        Self {
            mode: WriteMode::Confirm,
            ..self.clone()
        }
    }

    pub(crate) fn mode(&self) -> WriteMode {
        self.mode
    }

    /// Read a document once every queued write has been applied.
    pub(crate) async fn get(&self, path: &str) -> Result<Option<Value>> {
        self.flush().await;
        self.store.get(path).await
    }

    pub(crate) async fn put(&self, path: &str, value: Value) -> Result<()> {
        self.dispatch(WriteOp::Put, path, value).await
    }

    pub(crate) async fn patch(&self, path: &str, value: Value) -> Result<()> {
        self.dispatch(WriteOp::Patch, path, value).await
    }

    pub(crate) async fn delete(&self, path: &str) -> Result<()> {
        self.dispatch(WriteOp::Delete, path, Value::Null).await
    }

    /// Wait until the best-effort queue is drained. No-op if it never started.
    pub(crate) async fn flush(&self) {
        let Some(queue) = self.queue.get() else {
            return;
        };
        let (done, drained) = oneshot::channel();
        if queue.send(Job::Flush(done)).is_ok() {
            let _ = drained.await;
        }
    }

    async fn dispatch(&self, op: WriteOp, path: &str, value: Value) -> Result<()> {
        if self.mode == WriteMode::Confirm {
            // Keep confirmed writes behind anything still queued.
            self.flush().await;
            return apply(self.store.as_ref(), op, path, &value).await;
        }

        // Without a runtime to host the worker, best-effort degrades to confirmed.
        let Some(queue) = self.queue() else {
            return apply(self.store.as_ref(), op, path, &value).await;
        };

        let job = Job::Write {
            op,
            path: path.to_string(),
            value,
        };
        match queue.send(job) {
            Ok(()) => Ok(()),
            // The worker's runtime has shut down.
            Err(mpsc::error::SendError(Job::Write { op, path, value })) => {
                apply(self.store.as_ref(), op, &path, &value).await
            }
            Err(_) => Ok(()),
        }
    }

    fn queue(&self) -> Option<&mpsc::UnboundedSender<Job>> {
        if let Some(queue) = self.queue.get() {
            return Some(queue);
        }
        let handle = Handle::try_current().ok()?;
        Some(self.queue.get_or_init(|| {
            let (sender, receiver) = mpsc::unbounded_channel();
            handle.spawn(drain(Arc::clone(&self.store), receiver));
            sender
        }))
    }
}

async fn drain(store: Arc<dyn DocumentStore>, mut jobs: mpsc::UnboundedReceiver<Job>) {
    while let Some(job) = jobs.recv().await {
        match job {
            Job::Write { op, path, value } => {
                if let Err(err) = apply(store.as_ref(), op, &path, &value).await {
                    warn!(%path, op = op.name(), error = %err, "best-effort write failed");
                }
            }
            Job::Flush(done) => {
                let _ = done.send(());
            }
        }
    }
}

async fn apply(store: &dyn DocumentStore, op: WriteOp, path: &str, value: &Value) -> Result<()> {
    match op {
        WriteOp::Put => store.put(path, value).await,
        WriteOp::Patch => store.patch(path, value).await,
        WriteOp::Delete => store.delete(path).await,
    }
}
