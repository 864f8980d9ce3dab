use mongodb::bson::{self, Document, oid::ObjectId};

use crate::errors::StoreError;
use crate::models::Entity;
use crate::store::DocumentStore;

/// Typed access to a [`DocumentStore`].
#[derive(Debug, Clone)]
pub struct Database<S> {
    store: S,
}

impl<S: DocumentStore> Database<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    pub async fn clear<T: Entity>(&self) -> Result<u64, StoreError> {
        self.store.delete_all(T::COLLECTION).await
    }

    /// Inserts `items` as a single batch, returning their ids in input order.
    pub async fn insert_all<T: Entity>(&self, items: &[T]) -> Result<Vec<ObjectId>, StoreError> {
        let documents = items
            .iter()
            .map(bson::to_document)
            .collect::<Result<Vec<Document>, _>>()?;

        self.store.insert_many(T::COLLECTION, documents).await
    }

    pub async fn find_all<T: Entity>(&self) -> Result<Vec<T>, StoreError> {
        let documents = self.store.find_all(T::COLLECTION).await?;
        let items = documents
            .into_iter()
            .map(bson::from_document)
            .collect::<Result<Vec<T>, _>>()?;
        Ok(items)
    }

    pub async fn disconnect(&self) -> Result<(), StoreError> {
        self.store.disconnect().await
    }
}
