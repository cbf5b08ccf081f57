// Resource stores
//
// Read-through caches for list resources (products, orders). Items are
// replaced wholesale on success; on failure the previous items stay in
// place so the UI can show stale data with an error banner.

use serde::de::DeserializeOwned;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::classify::{classify, Operation};
use crate::error::RequestError;
use crate::http::ApiClient;
use crate::models::{ListEnvelope, Order, Product, Status};

/// Observable state of one list resource.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceState<T> {
    pub items: Vec<T>,
    pub status: Status,
    pub error: Option<String>,
}

impl<T> Default for ResourceState<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            status: Status::Idle,
            error: None,
        }
    }
}

pub struct ResourceStore<T> {
    client: Arc<ApiClient>,
    path: &'static str,
    op: Operation,
    state: RwLock<ResourceState<T>>,

    /// Sequence number of the most recently issued fetch. A completion
    /// carrying an older number belongs to a superseded request and is
    /// discarded (latest request wins).
    latest_seq: AtomicU64,
}

impl ResourceStore<Product> {
    pub fn products(client: Arc<ApiClient>) -> Self {
        Self::new(client, "/products", Operation::Products)
    }
}

impl ResourceStore<Order> {
    pub fn orders(client: Arc<ApiClient>) -> Self {
        Self::new(client, "/orders", Operation::Orders)
    }
}

impl<T> ResourceStore<T>
where
    T: DeserializeOwned + Clone + Send + Sync,
{
    fn new(client: Arc<ApiClient>, path: &'static str, op: Operation) -> Self {
        Self {
            client,
            path,
            op,
            state: RwLock::new(ResourceState::default()),
            latest_seq: AtomicU64::new(0),
        }
    }

    /// Snapshot of the current resource state.
    pub async fn state(&self) -> ResourceState<T> {
        self.state.read().await.clone()
    }

    /// Fetch the collection. Idempotent and safe to call repeatedly
    /// (e.g. pull-to-refresh); overlapping calls resolve to whichever
    /// request was issued last.
    pub async fn fetch(&self) {
        let seq = self.begin().await;
        let outcome = self.request().await;
        self.finish(seq, outcome).await;
    }

    async fn begin(&self) -> u64 {
        let seq = self.latest_seq.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.write().await.status = Status::Loading;
        seq
    }

    async fn request(&self) -> Result<Vec<T>, RequestError> {
        let value = self.client.get(self.path).await?;
        let envelope: ListEnvelope<T> =
            serde_json::from_value(value).map_err(|e| RequestError::Transport(e.to_string()))?;
        Ok(envelope.into_items())
    }

    async fn finish(&self, seq: u64, outcome: Result<Vec<T>, RequestError>) {
        let mut state = self.state.write().await;

        if self.latest_seq.load(Ordering::SeqCst) != seq {
            tracing::debug!(path = self.path, seq, "Discarding superseded response");
            return;
        }

        match outcome {
            Ok(items) => {
                state.items = items;
                state.status = Status::Succeeded;
                state.error = None;
            }
            Err(err) => {
                state.status = Status::Failed;
                state.error = Some(classify(self.op, &err));
            }
        }
    }
}
