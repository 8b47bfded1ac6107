//! In-memory document store.
//!
//! Backs every test suite in this crate and any embedding that does not
//! wire a real backend. Reproduces the remote store's observable
//! behavior: last-writer-wins per field, no transaction spanning two
//! writes, and full-snapshot redelivery to live subscribers after each
//! committed write. `fail_write_after` injects a single write failure so
//! tests can exercise the documented partial-failure window.

use std::cmp::Ordering as CmpOrdering;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, RwLock};

use serde_json::Value;
use tokio::sync::mpsc;
use uuid::Uuid;

use super::{DataError, Direction, Document, DocumentStore, Query, Snapshot, Subscription};

struct Watcher {
    collection: String,
    query: Query,
    tx: mpsc::UnboundedSender<Snapshot>,
}

type Collections = HashMap<String, BTreeMap<String, Value>>;

#[derive(Default)]
pub struct MemoryStore {
    collections: RwLock<Collections>,
    watchers: Arc<Mutex<HashMap<Uuid, Watcher>>>,
    // (writes to let through, failure message)
    fail_plan: Mutex<Option<(usize, String)>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next write operation fail with `message`.
    pub fn fail_next_write(&self, message: impl Into<String>) {
        self.fail_write_after(0, message);
    }

    /// Lets `skip` write operations through, then fails the next one.
    pub fn fail_write_after(&self, skip: usize, message: impl Into<String>) {
        *self.fail_plan.lock().expect("fail_plan lock") = Some((skip, message.into()));
    }

    fn check_write_fault(&self) -> Result<(), DataError> {
        let mut plan = self.fail_plan.lock().expect("fail_plan lock");
        match plan.take() {
            Some((0, message)) => Err(DataError::Persistence(message)),
            Some((skip, message)) => {
                *plan = Some((skip - 1, message));
                Ok(())
            }
            None => Ok(()),
        }
    }

    /// Number of documents currently held in `collection`.
    pub fn len(&self, collection: &str) -> usize {
        self.collections
            .read()
            .expect("collections lock")
            .get(collection)
            .map(|docs| docs.len())
            .unwrap_or(0)
    }

    pub fn is_empty(&self, collection: &str) -> bool {
        self.len(collection) == 0
    }

    /// Inserts raw fields under a fixed id, bypassing the fault hook.
    /// Test seam for seeding documents, including malformed ones.
    pub fn seed(&self, collection: &str, id: &str, fields: Value) {
        let snapshot = {
            let mut collections = self.collections.write().expect("collections lock");
            let docs = collections.entry(collection.to_string()).or_default();
            docs.insert(id.to_string(), fields);
            docs.clone()
        };
        self.notify(collection, &snapshot);
    }

    fn snapshot_of(&self, collection: &str) -> BTreeMap<String, Value> {
        self.collections
            .read()
            .expect("collections lock")
            .get(collection)
            .cloned()
            .unwrap_or_default()
    }

    fn notify(&self, collection: &str, docs: &BTreeMap<String, Value>) {
        let mut watchers = self.watchers.lock().expect("watchers lock");
        watchers.retain(|_, watcher| {
            if watcher.collection != collection {
                return true;
            }
            let snapshot = run_query(docs, &watcher.query);
            watcher.tx.send(Ok(snapshot)).is_ok()
        });
    }

    /// Runs `mutate` against the collection under the write lock, then
    /// redelivers snapshots to that collection's watchers.
    fn write<R>(
        &self,
        collection: &str,
        mutate: impl FnOnce(&mut BTreeMap<String, Value>) -> Result<R, DataError>,
    ) -> Result<R, DataError> {
        self.check_write_fault()?;
        let (result, snapshot) = {
            let mut collections = self.collections.write().expect("collections lock");
            let docs = collections.entry(collection.to_string()).or_default();
            let result = mutate(docs)?;
            (result, docs.clone())
        };
        self.notify(collection, &snapshot);
        Ok(result)
    }
}

impl DocumentStore for MemoryStore {
    async fn get(&self, collection: &str, id: &str) -> Result<Document, DataError> {
        self.collections
            .read()
            .expect("collections lock")
            .get(collection)
            .and_then(|docs| docs.get(id))
            .map(|fields| Document::new(id, fields.clone()))
            .ok_or_else(|| DataError::NotFound {
                collection: collection.into(),
                id: id.into(),
            })
    }

    async fn query(&self, collection: &str, query: &Query) -> Result<Vec<Document>, DataError> {
        Ok(run_query(&self.snapshot_of(collection), query))
    }

    fn subscribe(&self, collection: &str, query: Query) -> Subscription {
        let (tx, rx) = mpsc::unbounded_channel();
        let watcher_id = Uuid::new_v4();

        // Snapshot and registration happen under the collections lock:
        // a write can only commit strictly before (caught by the initial
        // snapshot) or strictly after (redelivered to the registered
        // watcher). A duplicate delivery is harmless, a lost one is not.
        {
            let collections = self.collections.read().expect("collections lock");
            let initial = collections
                .get(collection)
                .map(|docs| run_query(docs, &query))
                .unwrap_or_default();
            let _ = tx.send(Ok(initial));
            self.watchers.lock().expect("watchers lock").insert(
                watcher_id,
                Watcher {
                    collection: collection.to_string(),
                    query,
                    tx,
                },
            );
        }

        let registry = Arc::clone(&self.watchers);
        Subscription::new(rx, move || {
            registry.lock().expect("watchers lock").remove(&watcher_id);
        })
    }

    async fn add(&self, collection: &str, fields: Value) -> Result<String, DataError> {
        let id = Uuid::new_v4().to_string();
        self.write(collection, |docs| {
            docs.insert(id.clone(), fields);
            Ok(())
        })?;
        Ok(id)
    }

    async fn set(&self, collection: &str, id: &str, fields: Value) -> Result<(), DataError> {
        self.write(collection, |docs| {
            docs.insert(id.to_string(), fields);
            Ok(())
        })
    }

    async fn update(&self, collection: &str, id: &str, fields: Value) -> Result<(), DataError> {
        self.write(collection, |docs| {
            let existing = docs.get_mut(id).ok_or_else(|| DataError::NotFound {
                collection: collection.into(),
                id: id.into(),
            })?;
            merge_fields(existing, fields);
            Ok(())
        })
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), DataError> {
        self.write(collection, |docs| {
            docs.remove(id);
            Ok(())
        })
    }

    async fn array_union(
        &self,
        collection: &str,
        id: &str,
        field: &str,
        value: Value,
    ) -> Result<(), DataError> {
        self.write(collection, |docs| {
            let existing = docs.get_mut(id).ok_or_else(|| DataError::NotFound {
                collection: collection.into(),
                id: id.into(),
            })?;
            let array = array_field(existing, field);
            if !array.contains(&value) {
                array.push(value);
            }
            Ok(())
        })
    }

    async fn array_remove(
        &self,
        collection: &str,
        id: &str,
        field: &str,
        value: Value,
    ) -> Result<(), DataError> {
        self.write(collection, |docs| {
            let existing = docs.get_mut(id).ok_or_else(|| DataError::NotFound {
                collection: collection.into(),
                id: id.into(),
            })?;
            array_field(existing, field).retain(|item| item != &value);
            Ok(())
        })
    }
}

fn merge_fields(existing: &mut Value, fields: Value) {
    match (existing, fields) {
        (Value::Object(current), Value::Object(updates)) => {
            for (key, value) in updates {
                current.insert(key, value);
            }
        }
        (existing, fields) => *existing = fields,
    }
}

fn array_field<'a>(fields: &'a mut Value, field: &str) -> &'a mut Vec<Value> {
    if let Value::Object(map) = fields {
        let entry = map
            .entry(field.to_string())
            .or_insert_with(|| Value::Array(Vec::new()));
        if !entry.is_array() {
            *entry = Value::Array(Vec::new());
        }
        entry.as_array_mut().expect("array field")
    } else {
        unreachable!("documents are always JSON objects")
    }
}

fn run_query(docs: &BTreeMap<String, Value>, query: &Query) -> Vec<Document> {
    let mut results: Vec<Document> = docs
        .iter()
        .filter(|(_, fields)| query.filters.iter().all(|f| f.matches(fields)))
        .map(|(id, fields)| Document::new(id.clone(), fields.clone()))
        .collect();

    if let Some(order) = &query.order_by {
        results.sort_by(|a, b| {
            let ordering = compare_values(a.fields.get(&order.field), b.fields.get(&order.field));
            match order.direction {
                Direction::Ascending => ordering,
                Direction::Descending => ordering.reverse(),
            }
        });
    }

    if let Some(limit) = query.limit {
        results.truncate(limit);
    }

    results
}

/// Total order over field values: null < bool < number < string; other
/// shapes compare equal. Date strings (`yyyy-MM-dd`) order
/// chronologically under the string branch.
fn compare_values(a: Option<&Value>, b: Option<&Value>) -> CmpOrdering {
    fn rank(value: Option<&Value>) -> u8 {
        match value {
            None | Some(Value::Null) => 0,
            Some(Value::Bool(_)) => 1,
            Some(Value::Number(_)) => 2,
            Some(Value::String(_)) => 3,
            Some(_) => 4,
        }
    }
    match (a, b) {
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(CmpOrdering::Equal),
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        _ => rank(a).cmp(&rank(b)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn add_assigns_unique_ids() {
        let store = MemoryStore::new();
        let a = store.add("appointments", json!({ "n": 1 })).await.unwrap();
        let b = store.add("appointments", json!({ "n": 2 })).await.unwrap();
        assert_ne!(a, b);
        assert!(!a.is_empty());
        assert_eq!(store.len("appointments"), 2);
    }

    #[tokio::test]
    async fn get_missing_is_not_found() {
        let store = MemoryStore::new();
        let err = store.get("doctors", "nope").await.unwrap_err();
        assert!(matches!(err, DataError::NotFound { .. }));
    }

    #[tokio::test]
    async fn set_creates_and_replaces() {
        let store = MemoryStore::new();
        store
            .set("users", "u1", json!({ "name": "Budi", "phone": "0812" }))
            .await
            .unwrap();
        store.set("users", "u1", json!({ "name": "Budi S." })).await.unwrap();

        let doc = store.get("users", "u1").await.unwrap();
        assert_eq!(doc.fields, json!({ "name": "Budi S." }));
    }

    #[tokio::test]
    async fn update_merges_partial_fields() {
        let store = MemoryStore::new();
        store
            .set("appointments", "a1", json!({ "date": "2025-12-16", "time": "10.00", "status": "upcoming" }))
            .await
            .unwrap();
        store
            .update("appointments", "a1", json!({ "date": "2025-12-20", "time": "11.00" }))
            .await
            .unwrap();

        let doc = store.get("appointments", "a1").await.unwrap();
        assert_eq!(doc.fields.get("date"), Some(&json!("2025-12-20")));
        assert_eq!(doc.fields.get("status"), Some(&json!("upcoming")));
    }

    #[tokio::test]
    async fn update_missing_is_not_found() {
        let store = MemoryStore::new();
        let err = store
            .update("appointments", "ghost", json!({ "status": "cancelled" }))
            .await
            .unwrap_err();
        assert!(matches!(err, DataError::NotFound { .. }));
    }

    #[tokio::test]
    async fn delete_removes_document() {
        let store = MemoryStore::new();
        store.set("articles", "art1", json!({ "title": "x" })).await.unwrap();
        store.delete("articles", "art1").await.unwrap();
        assert!(store.get("articles", "art1").await.is_err());
    }

    #[tokio::test]
    async fn array_union_is_idempotent() {
        let store = MemoryStore::new();
        store.set("users", "u1", json!({ "favoriteDoctors": [] })).await.unwrap();
        store
            .array_union("users", "u1", "favoriteDoctors", json!("docA"))
            .await
            .unwrap();
        store
            .array_union("users", "u1", "favoriteDoctors", json!("docA"))
            .await
            .unwrap();

        let doc = store.get("users", "u1").await.unwrap();
        assert_eq!(doc.fields.get("favoriteDoctors"), Some(&json!(["docA"])));
    }

    #[tokio::test]
    async fn array_remove_absent_value_is_noop() {
        let store = MemoryStore::new();
        store.set("users", "u1", json!({ "favoriteDoctors": ["docA"] })).await.unwrap();
        store
            .array_remove("users", "u1", "favoriteDoctors", json!("docB"))
            .await
            .unwrap();
        store
            .array_remove("users", "u1", "favoriteDoctors", json!("docA"))
            .await
            .unwrap();

        let doc = store.get("users", "u1").await.unwrap();
        assert_eq!(doc.fields.get("favoriteDoctors"), Some(&json!([])));
    }

    #[tokio::test]
    async fn array_union_on_missing_field_creates_it() {
        let store = MemoryStore::new();
        store.set("users", "u1", json!({ "name": "Budi" })).await.unwrap();
        store
            .array_union("users", "u1", "favoriteDoctors", json!("docA"))
            .await
            .unwrap();

        let doc = store.get("users", "u1").await.unwrap();
        assert_eq!(doc.fields.get("favoriteDoctors"), Some(&json!(["docA"])));
    }

    #[tokio::test]
    async fn query_filters_orders_and_limits() {
        let store = MemoryStore::new();
        for (id, date, user) in [
            ("a1", "2025-12-20", "u1"),
            ("a2", "2025-12-16", "u1"),
            ("a3", "2025-12-18", "u2"),
            ("a4", "2025-12-17", "u1"),
        ] {
            store
                .set("appointments", id, json!({ "date": date, "userId": user }))
                .await
                .unwrap();
        }

        let results = store
            .query(
                "appointments",
                &Query::new()
                    .filter_eq("userId", "u1")
                    .order_by("date", Direction::Ascending)
                    .limit(2),
            )
            .await
            .unwrap();

        let dates: Vec<_> = results
            .iter()
            .map(|d| d.fields.get("date").unwrap().as_str().unwrap())
            .collect();
        assert_eq!(dates, vec!["2025-12-16", "2025-12-17"]);
    }

    #[tokio::test]
    async fn query_descending_numbers() {
        let store = MemoryStore::new();
        for (id, ts) in [("n1", 100), ("n2", 300), ("n3", 200)] {
            store.set("notifications", id, json!({ "timestamp": ts })).await.unwrap();
        }
        let results = store
            .query(
                "notifications",
                &Query::new().order_by("timestamp", Direction::Descending),
            )
            .await
            .unwrap();
        let stamps: Vec<_> = results
            .iter()
            .map(|d| d.fields.get("timestamp").unwrap().as_i64().unwrap())
            .collect();
        assert_eq!(stamps, vec![300, 200, 100]);
    }

    #[tokio::test]
    async fn subscribe_delivers_initial_snapshot() {
        let store = MemoryStore::new();
        store.set("appointments", "a1", json!({ "userId": "u1" })).await.unwrap();

        let mut sub = store.subscribe("appointments", Query::new().filter_eq("userId", "u1"));
        let snapshot = sub.next().await.unwrap().unwrap();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].id, "a1");
    }

    #[tokio::test]
    async fn subscribe_redelivers_after_write() {
        let store = MemoryStore::new();
        let mut sub = store.subscribe("appointments", Query::new().filter_eq("userId", "u1"));
        assert!(sub.next().await.unwrap().unwrap().is_empty());

        store.set("appointments", "a1", json!({ "userId": "u1" })).await.unwrap();
        let snapshot = sub.next().await.unwrap().unwrap();
        assert_eq!(snapshot.len(), 1);

        // A write to another collection does not wake this watcher.
        store.set("doctors", "d1", json!({ "name": "x" })).await.unwrap();
        store.delete("appointments", "a1").await.unwrap();
        let snapshot = sub.next().await.unwrap().unwrap();
        assert!(snapshot.is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn registration_never_misses_a_concurrent_write() {
        // A write racing `subscribe` must land either in the initial
        // snapshot or in a redelivery; this loop hangs if one is lost.
        for _ in 0..100 {
            let store = Arc::new(MemoryStore::new());
            let writer = {
                let store = Arc::clone(&store);
                tokio::spawn(async move {
                    store
                        .set("appointments", "a1", json!({ "userId": "u1" }))
                        .await
                        .unwrap();
                })
            };

            let mut sub = store.subscribe("appointments", Query::new());
            writer.await.unwrap();

            loop {
                let snapshot = sub.next().await.unwrap().unwrap();
                if snapshot.iter().any(|doc| doc.id == "a1") {
                    break;
                }
            }
        }
    }

    #[tokio::test]
    async fn cancel_stops_delivery_deterministically() {
        let store = MemoryStore::new();
        let mut sub = store.subscribe("appointments", Query::new());
        sub.cancel();

        store.set("appointments", "a1", json!({ "userId": "u1" })).await.unwrap();
        assert!(sub.next().await.is_none());
    }

    #[tokio::test]
    async fn dropped_subscription_unregisters_watcher() {
        let store = MemoryStore::new();
        {
            let _sub = store.subscribe("appointments", Query::new());
            assert_eq!(store.watchers.lock().unwrap().len(), 1);
        }
        assert_eq!(store.watchers.lock().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn fail_next_write_passes_message_through() {
        let store = MemoryStore::new();
        store.fail_next_write("PERMISSION_DENIED: quota exceeded");
        let err = store.add("appointments", json!({})).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Store operation failed: PERMISSION_DENIED: quota exceeded"
        );

        // The fault is one-shot.
        store.add("appointments", json!({})).await.unwrap();
    }

    #[tokio::test]
    async fn fail_write_after_skips_writes() {
        let store = MemoryStore::new();
        store.fail_write_after(1, "network down");
        store.set("appointments", "a1", json!({})).await.unwrap();
        let err = store.set("appointments", "a2", json!({})).await.unwrap_err();
        assert!(matches!(err, DataError::Persistence(_)));
    }
}
