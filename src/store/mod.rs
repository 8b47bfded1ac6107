//! Document store access layer.
//!
//! The backend is a remote document database reached through a narrow
//! contract: typed reads/writes against named collections plus live
//! snapshot subscriptions. The store client is an injected dependency
//! (`Arc<S: DocumentStore>`) so every service can run against the
//! in-memory implementation in tests.

pub mod memory;

pub use memory::MemoryStore;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tokio::sync::mpsc;

// ─── Collections ──────────────────────────────────────────────────────────────

pub const APPOINTMENTS: &str = "appointments";
pub const DOCTORS: &str = "doctors";
pub const ARTICLES: &str = "articles";
pub const POLIS: &str = "polis";
pub const USERS: &str = "users";
pub const NOTIFICATIONS: &str = "notifications";

// ─── Errors ───────────────────────────────────────────────────────────────────

#[derive(Error, Debug)]
pub enum DataError {
    #[error("Operation requires an authenticated user")]
    Unauthenticated,

    #[error("Document not found: {collection}/{id}")]
    NotFound { collection: String, id: String },

    #[error("Store operation failed: {0}")]
    Persistence(String),

    #[error("Malformed document {collection}/{id}: {reason}")]
    Parse {
        collection: String,
        id: String,
        reason: String,
    },

    #[error("Invalid enum value for {field}: {value}")]
    InvalidEnum { field: String, value: String },
}

// ─── Documents ────────────────────────────────────────────────────────────────

/// One stored document: the store-assigned id plus its JSON field map.
/// The id is never part of `fields`; decoding injects it so entity
/// structs can carry it like any other attribute.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub fields: Value,
}

impl Document {
    pub fn new(id: impl Into<String>, fields: Value) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }

    /// Decodes the document into an entity, injecting the document id.
    pub fn decode<T: DeserializeOwned>(&self, collection: &str) -> Result<T, DataError> {
        let mut fields = self.fields.clone();
        if let Value::Object(map) = &mut fields {
            map.insert("id".into(), Value::String(self.id.clone()));
        }
        serde_json::from_value(fields).map_err(|e| DataError::Parse {
            collection: collection.into(),
            id: self.id.clone(),
            reason: e.to_string(),
        })
    }
}

/// Serializes an entity to a field map, dropping the `id` field (the id
/// lives as the document key, not inside the document).
pub fn encode<T: Serialize>(entity: &T) -> Result<Value, DataError> {
    let mut value = serde_json::to_value(entity)
        .map_err(|e| DataError::Persistence(format!("serialization failed: {e}")))?;
    if let Value::Object(map) = &mut value {
        map.remove("id");
    }
    Ok(value)
}

/// Tolerant list decode: malformed documents are logged and skipped,
/// never failing the whole list.
pub fn decode_all<T: DeserializeOwned>(collection: &str, docs: &[Document]) -> Vec<T> {
    docs.iter()
        .filter_map(|doc| match doc.decode::<T>(collection) {
            Ok(entity) => Some(entity),
            Err(e) => {
                tracing::warn!("skipping malformed document: {e}");
                None
            }
        })
        .collect()
}

// ─── Queries ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    Eq(String, Value),
}

impl Filter {
    pub fn field_eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Eq(field.into(), value.into())
    }

    pub fn matches(&self, fields: &Value) -> bool {
        match self {
            Self::Eq(field, expected) => fields.get(field) == Some(expected),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderBy {
    pub field: String,
    pub direction: Direction,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    pub filters: Vec<Filter>,
    pub order_by: Option<OrderBy>,
    pub limit: Option<usize>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter_eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filters.push(Filter::field_eq(field, value));
        self
    }

    pub fn order_by(mut self, field: impl Into<String>, direction: Direction) -> Self {
        self.order_by = Some(OrderBy {
            field: field.into(),
            direction,
        });
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

// ─── Live subscriptions ───────────────────────────────────────────────────────

/// One delivery from a live subscription: a full result snapshot, or the
/// store's failure message.
pub type Snapshot = Result<Vec<Document>, DataError>;

/// Cancellable handle over a live query.
///
/// The store pushes a snapshot on registration and again after every
/// committed write to the collection. `cancel` unregisters the watcher
/// under the store's lock: once it returns, no further snapshot is
/// delivered, including ones already buffered.
pub struct Subscription {
    rx: mpsc::UnboundedReceiver<Snapshot>,
    on_cancel: Option<Box<dyn FnOnce() + Send>>,
    cancelled: bool,
}

impl Subscription {
    pub fn new(
        rx: mpsc::UnboundedReceiver<Snapshot>,
        on_cancel: impl FnOnce() + Send + 'static,
    ) -> Self {
        Self {
            rx,
            on_cancel: Some(Box::new(on_cancel)),
            cancelled: false,
        }
    }

    /// Waits for the next snapshot. Returns `None` once cancelled.
    pub async fn next(&mut self) -> Option<Snapshot> {
        if self.cancelled {
            return None;
        }
        self.rx.recv().await
    }

    /// Stops delivery deterministically. Buffered snapshots are dropped.
    pub fn cancel(&mut self) {
        if let Some(unregister) = self.on_cancel.take() {
            unregister();
        }
        self.rx.close();
        self.cancelled = true;
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(unregister) = self.on_cancel.take() {
            unregister();
        }
    }
}

// ─── Store contract ───────────────────────────────────────────────────────────

/// Narrow contract over the remote document database.
///
/// Every operation is a suspension point; writes either complete or fail
/// once, with no automatic retry. Two sequential writes are not
/// transactional: callers own any resulting partial state.
#[allow(async_fn_in_trait)]
pub trait DocumentStore: Send + Sync {
    async fn get(&self, collection: &str, id: &str) -> Result<Document, DataError>;

    async fn query(&self, collection: &str, query: &Query) -> Result<Vec<Document>, DataError>;

    /// Registers a live query. The initial snapshot is delivered before
    /// this returns.
    fn subscribe(&self, collection: &str, query: Query) -> Subscription;

    /// Adds a document with a store-assigned id; returns the id.
    async fn add(&self, collection: &str, fields: Value) -> Result<String, DataError>;

    /// Creates or fully replaces the document at `id`.
    async fn set(&self, collection: &str, id: &str, fields: Value) -> Result<(), DataError>;

    /// Merges `fields` into an existing document. `NotFound` when the id
    /// does not resolve.
    async fn update(&self, collection: &str, id: &str, fields: Value) -> Result<(), DataError>;

    async fn delete(&self, collection: &str, id: &str) -> Result<(), DataError>;

    /// Set-semantics append on an array field (no duplicate added).
    async fn array_union(
        &self,
        collection: &str,
        id: &str,
        field: &str,
        value: Value,
    ) -> Result<(), DataError>;

    /// Set-semantics removal on an array field (absent value is a no-op).
    async fn array_remove(
        &self,
        collection: &str,
        id: &str,
        field: &str,
        value: Value,
    ) -> Result<(), DataError>;
}
