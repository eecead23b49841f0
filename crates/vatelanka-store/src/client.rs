//! Document-store boundary.
//!
//! The hosted document database is consumed through [`DocumentStore`]; the
//! engine never touches an SDK type directly. Live queries are exposed as
//! [`Subscription`]s delivering full collection snapshots (latest snapshot
//! replaces the previous one), and every subscription must be torn down
//! when its consumer goes away — dropping the handle unsubscribes.
//!
//! [`MemoryStore`] is the in-process implementation used by tests and local
//! development.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};

use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::mpsc;

use crate::error::StoreError;

/// One document: its id within the parent collection plus its JSON fields.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub data: Value,
}

impl Document {
    /// Parse the document's fields into a typed value.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Malformed`] when the fields do not match the
    /// expected shape.
    pub fn parse<T: DeserializeOwned>(&self, path: &str) -> Result<T, StoreError> {
        serde_json::from_value(self.data.clone()).map_err(|e| StoreError::Malformed {
            path: format!("{path}/{}", self.id),
            reason: e.to_string(),
        })
    }
}

/// A live snapshot feed for one collection.
///
/// Each received item is the complete current content of the collection;
/// consumers replace their previous view with it. Unsubscribes on drop.
pub struct Subscription {
    rx: mpsc::UnboundedReceiver<Vec<Document>>,
    on_cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    #[must_use]
    pub fn new(
        rx: mpsc::UnboundedReceiver<Vec<Document>>,
        on_cancel: impl FnOnce() + Send + 'static,
    ) -> Self {
        Self {
            rx,
            on_cancel: Some(Box::new(on_cancel)),
        }
    }

    /// Next full snapshot, or `None` once the feed is closed.
    pub async fn recv(&mut self) -> Option<Vec<Document>> {
        self.rx.recv().await
    }

    /// Explicit teardown. Equivalent to dropping the handle.
    pub fn unsubscribe(mut self) {
        self.cancel();
    }

    fn cancel(&mut self) {
        if let Some(cancel) = self.on_cancel.take() {
            cancel();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Generic backend SDK surface the client consumes.
///
/// Document paths are `collection/id` strings built by [`crate::paths`];
/// collection paths address whole collections. `update_doc` merges the
/// given top-level fields into an existing document.
pub trait DocumentStore: Send + Sync {
    fn get_doc(
        &self,
        path: &str,
    ) -> impl Future<Output = Result<Option<Document>, StoreError>> + Send;

    fn get_docs(
        &self,
        collection: &str,
    ) -> impl Future<Output = Result<Vec<Document>, StoreError>> + Send;

    fn set_doc(
        &self,
        path: &str,
        data: Value,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    fn update_doc(
        &self,
        path: &str,
        patch: Value,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Add a document with a generated id; returns the id.
    fn add_doc(
        &self,
        collection: &str,
        data: Value,
    ) -> impl Future<Output = Result<String, StoreError>> + Send;

    /// Start a snapshot subscription on a collection. The current snapshot
    /// is delivered immediately, then one per change.
    fn watch(
        &self,
        collection: &str,
    ) -> impl Future<Output = Result<Subscription, StoreError>> + Send;
}

fn split_doc_path(path: &str) -> Result<(&str, &str), StoreError> {
    path.rsplit_once('/')
        .filter(|(collection, id)| !collection.is_empty() && !id.is_empty())
        .ok_or_else(|| StoreError::Backend(format!("invalid document path: {path}")))
}

type Collections = HashMap<String, Vec<(String, Value)>>;
type Watchers = HashMap<String, Vec<(u64, mpsc::UnboundedSender<Vec<Document>>)>>;

#[derive(Default)]
struct MemoryInner {
    collections: Collections,
    watchers: Watchers,
    next_watcher_id: u64,
}

/// In-memory [`DocumentStore`] preserving insertion order per collection.
#[derive(Default, Clone)]
pub struct MemoryStore {
    inner: Arc<Mutex<MemoryInner>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn snapshot(collections: &Collections, collection: &str) -> Vec<Document> {
        collections
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .map(|(id, data)| Document {
                        id: id.clone(),
                        data: data.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    fn notify_watchers(inner: &mut MemoryInner, collection: &str) {
        let snapshot = Self::snapshot(&inner.collections, collection);
        if let Some(watchers) = inner.watchers.get_mut(collection) {
            watchers.retain(|(_, tx)| tx.send(snapshot.clone()).is_ok());
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MemoryInner> {
        // A poisoned lock means a panicked test; propagate the panic.
        self.inner.lock().expect("memory store lock")
    }
}

impl DocumentStore for MemoryStore {
    async fn get_doc(&self, path: &str) -> Result<Option<Document>, StoreError> {
        let (collection, id) = split_doc_path(path)?;
        let inner = self.lock();
        Ok(inner
            .collections
            .get(collection)
            .and_then(|docs| docs.iter().find(|(doc_id, _)| doc_id == id))
            .map(|(doc_id, data)| Document {
                id: doc_id.clone(),
                data: data.clone(),
            }))
    }

    async fn get_docs(&self, collection: &str) -> Result<Vec<Document>, StoreError> {
        let inner = self.lock();
        Ok(Self::snapshot(&inner.collections, collection))
    }

    async fn set_doc(&self, path: &str, data: Value) -> Result<(), StoreError> {
        let (collection, id) = split_doc_path(path)?;
        let mut inner = self.lock();
        let docs = inner.collections.entry(collection.to_string()).or_default();
        if let Some(slot) = docs.iter_mut().find(|(doc_id, _)| doc_id == id) {
            slot.1 = data;
        } else {
            docs.push((id.to_string(), data));
        }
        Self::notify_watchers(&mut inner, collection);
        Ok(())
    }

    async fn update_doc(&self, path: &str, patch: Value) -> Result<(), StoreError> {
        let (collection, id) = split_doc_path(path)?;
        let mut inner = self.lock();
        let docs = inner
            .collections
            .get_mut(collection)
            .ok_or_else(|| StoreError::NotFound(path.to_string()))?;
        let slot = docs
            .iter_mut()
            .find(|(doc_id, _)| doc_id == id)
            .ok_or_else(|| StoreError::NotFound(path.to_string()))?;

        let (Value::Object(existing), Value::Object(fields)) = (&mut slot.1, patch) else {
            return Err(StoreError::Backend(format!(
                "update_doc requires object documents: {path}"
            )));
        };
        for (key, value) in fields {
            existing.insert(key, value);
        }
        Self::notify_watchers(&mut inner, collection);
        Ok(())
    }

    async fn add_doc(&self, collection: &str, data: Value) -> Result<String, StoreError> {
        let id = uuid::Uuid::new_v4().to_string();
        let mut inner = self.lock();
        inner
            .collections
            .entry(collection.to_string())
            .or_default()
            .push((id.clone(), data));
        Self::notify_watchers(&mut inner, collection);
        Ok(id)
    }

    async fn watch(&self, collection: &str) -> Result<Subscription, StoreError> {
        let (tx, rx) = mpsc::unbounded_channel();
        let watcher_id;
        {
            let mut inner = self.lock();
            watcher_id = inner.next_watcher_id;
            inner.next_watcher_id += 1;
            let snapshot = Self::snapshot(&inner.collections, collection);
            // Initial snapshot; the receiver is still open here.
            let _ = tx.send(snapshot);
            inner
                .watchers
                .entry(collection.to_string())
                .or_default()
                .push((watcher_id, tx));
        }

        let store = self.clone();
        let collection = collection.to_string();
        Ok(Subscription::new(rx, move || {
            let mut inner = store.lock();
            if let Some(watchers) = inner.watchers.get_mut(&collection) {
                watchers.retain(|(id, _)| *id != watcher_id);
            }
        }))
    }
}
