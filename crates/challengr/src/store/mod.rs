//! The document store capability surface.
//!
//! The loader needs exactly five primitives: connect (done by each backend's
//! constructor), clear a collection, bulk insert with generated ids, read a
//! whole collection back, and disconnect. No filtering, sorting or indexing.

mod memory;
mod mongo;

use async_trait::async_trait;
use mongodb::bson::{Document, oid::ObjectId};

use crate::errors::StoreError;

pub use memory::MemoryStore;
pub use mongo::MongoStore;

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Name of the database this store is bound to.
    fn database_name(&self) -> &str;

    /// Deletes every document in `collection`, returning how many were removed.
    async fn delete_all(&self, collection: &str) -> Result<u64, StoreError>;

    /// Inserts `documents` as one batch.
    ///
    /// Documents without an `_id` get one assigned by the store. The returned
    /// ids are in the same order as the input documents.
    async fn insert_many(
        &self,
        collection: &str,
        documents: Vec<Document>,
    ) -> Result<Vec<ObjectId>, StoreError>;

    /// Returns every document in `collection`.
    async fn find_all(&self, collection: &str) -> Result<Vec<Document>, StoreError>;

    /// Releases the connection. Further calls fail or are undefined.
    async fn disconnect(&self) -> Result<(), StoreError>;
}

#[async_trait]
impl<'a, T: DocumentStore + ?Sized> DocumentStore for &'a T {
    fn database_name(&self) -> &str {
        (**self).database_name()
    }

    async fn delete_all(&self, collection: &str) -> Result<u64, StoreError> {
        (**self).delete_all(collection).await
    }

    async fn insert_many(
        &self,
        collection: &str,
        documents: Vec<Document>,
    ) -> Result<Vec<ObjectId>, StoreError> {
        (**self).insert_many(collection, documents).await
    }

    async fn find_all(&self, collection: &str) -> Result<Vec<Document>, StoreError> {
        (**self).find_all(collection).await
    }

    async fn disconnect(&self) -> Result<(), StoreError> {
        (**self).disconnect().await
    }
}
