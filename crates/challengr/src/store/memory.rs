use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use mongodb::bson::{Bson, Document, oid::ObjectId};
use tokio::sync::Mutex;

use super::DocumentStore;
use crate::{
    app::APP_NAME,
    errors::{Operation, StoreError},
};

/// In-process store with MongoDB-like id assignment.
///
/// Used to exercise the loader without a server. Faults can be injected per
/// operation and collection, and every call is recorded in order.
#[derive(Debug)]
pub struct MemoryStore {
    database: String,
    inner: Mutex<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    collections: HashMap<String, Vec<Document>>,
    faults: HashSet<(Operation, String)>,
    operations: Vec<(Operation, String)>,
    disconnected: bool,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::with_database(APP_NAME)
    }

    pub fn with_database(database: impl Into<String>) -> Self {
        Self {
            database: database.into(),
            inner: Mutex::new(Inner::default()),
        }
    }

    /// Makes every subsequent `operation` on `collection` fail.
    pub async fn inject_fault(&self, operation: Operation, collection: &str) {
        let mut inner = self.inner.lock().await;
        inner.faults.insert((operation, collection.to_string()));
    }

    pub async fn clear_faults(&self) {
        self.inner.lock().await.faults.clear();
    }

    /// Number of documents currently in `collection`.
    pub async fn count(&self, collection: &str) -> usize {
        let inner = self.inner.lock().await;
        inner.collections.get(collection).map_or(0, Vec::len)
    }

    /// Every operation attempted so far, in call order.
    pub async fn operations(&self) -> Vec<(Operation, String)> {
        self.inner.lock().await.operations.clone()
    }

    pub async fn is_connected(&self) -> bool {
        !self.inner.lock().await.disconnected
    }

    /// Reopens a disconnected store, keeping its contents.
    pub async fn reconnect(&self) {
        self.inner.lock().await.disconnected = false;
    }
}

impl Inner {
    fn begin(&mut self, operation: Operation, collection: &str) -> Result<(), StoreError> {
        if self.disconnected {
            return Err(StoreError::Disconnected);
        }
        self.operations.push((operation, collection.to_string()));
        if self.faults.contains(&(operation, collection.to_string())) {
            return Err(StoreError::Fault {
                operation,
                collection: collection.to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    fn database_name(&self) -> &str {
        &self.database
    }

    async fn delete_all(&self, collection: &str) -> Result<u64, StoreError> {
        let mut inner = self.inner.lock().await;
        inner.begin(Operation::Delete, collection)?;
        let removed = inner
            .collections
            .remove(collection)
            .map_or(0, |docs| docs.len());
        Ok(removed as u64)
    }

    async fn insert_many(
        &self,
        collection: &str,
        mut documents: Vec<Document>,
    ) -> Result<Vec<ObjectId>, StoreError> {
        let mut inner = self.inner.lock().await;
        inner.begin(Operation::Insert, collection)?;

        let mut seen: HashSet<ObjectId> = inner
            .collections
            .get(collection)
            .into_iter()
            .flatten()
            .filter_map(|doc| doc.get_object_id("_id").ok())
            .collect();

        // Validate the whole batch before touching the collection.
        let mut ids = Vec::with_capacity(documents.len());
        for doc in &mut documents {
            let id = match doc.get("_id") {
                Some(Bson::ObjectId(id)) => *id,
                Some(_) => {
                    return Err(StoreError::UnexpectedId {
                        collection: collection.to_string(),
                    });
                }
                None => {
                    let id = ObjectId::new();
                    doc.insert("_id", id);
                    id
                }
            };
            if !seen.insert(id) {
                return Err(StoreError::DuplicateId {
                    collection: collection.to_string(),
                    id: id.to_hex(),
                });
            }
            ids.push(id);
        }

        inner
            .collections
            .entry(collection.to_string())
            .or_default()
            .extend(documents);

        Ok(ids)
    }

    async fn find_all(&self, collection: &str) -> Result<Vec<Document>, StoreError> {
        let mut inner = self.inner.lock().await;
        inner.begin(Operation::Find, collection)?;
        Ok(inner.collections.get(collection).cloned().unwrap_or_default())
    }

    async fn disconnect(&self) -> Result<(), StoreError> {
        self.inner.lock().await.disconnected = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::doc;

    #[tokio::test]
    async fn test_insert_assigns_ids_in_order() {
        let store = MemoryStore::new();
        let ids = store
            .insert_many("users", vec![doc! { "username": "a" }, doc! { "username": "b" }])
            .await
            .unwrap();
        assert_eq!(ids.len(), 2);
        assert_ne!(ids[0], ids[1]);

        let docs = store.find_all("users").await.unwrap();
        assert_eq!(docs[0].get_object_id("_id").unwrap(), ids[0]);
        assert_eq!(docs[1].get_str("username").unwrap(), "b");
    }

    #[tokio::test]
    async fn test_insert_keeps_existing_id() {
        let store = MemoryStore::new();
        let id = ObjectId::new();
        let ids = store
            .insert_many("leagues", vec![doc! { "_id": id, "name": "x" }])
            .await
            .unwrap();
        assert_eq!(ids, vec![id]);
    }

    #[tokio::test]
    async fn test_duplicate_id_rejects_whole_batch() {
        let store = MemoryStore::new();
        let id = ObjectId::new();
        store
            .insert_many("leagues", vec![doc! { "_id": id }])
            .await
            .unwrap();

        let err = store
            .insert_many("leagues", vec![doc! { "name": "fresh" }, doc! { "_id": id }])
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::DuplicateId { .. }));
        assert_eq!(store.count("leagues").await, 1);
    }

    #[tokio::test]
    async fn test_delete_all_reports_count() {
        let store = MemoryStore::new();
        store
            .insert_many("games", vec![doc! {}, doc! {}, doc! {}])
            .await
            .unwrap();
        assert_eq!(store.delete_all("games").await.unwrap(), 3);
        assert_eq!(store.delete_all("games").await.unwrap(), 0);
        assert!(store.find_all("games").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_injected_fault() {
        let store = MemoryStore::new();
        store.inject_fault(Operation::Insert, "challenges").await;

        let err = store
            .insert_many("challenges", vec![doc! {}])
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            StoreError::Fault {
                operation: Operation::Insert,
                ..
            }
        ));
        assert_eq!(store.count("challenges").await, 0);

        store.clear_faults().await;
        store.insert_many("challenges", vec![doc! {}]).await.unwrap();
        assert_eq!(store.count("challenges").await, 1);
    }

    #[tokio::test]
    async fn test_disconnected_store_refuses_work() {
        let store = MemoryStore::new();
        store.disconnect().await.unwrap();
        assert!(!store.is_connected().await);
        assert!(matches!(
            store.find_all("users").await,
            Err(StoreError::Disconnected)
        ));

        store.reconnect().await;
        assert!(store.find_all("users").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_operations_are_recorded() {
        let store = MemoryStore::new();
        store.delete_all("users").await.unwrap();
        store.find_all("leagues").await.unwrap();
        assert_eq!(
            store.operations().await,
            vec![
                (Operation::Delete, "users".to_string()),
                (Operation::Find, "leagues".to_string()),
            ]
        );
    }
}
