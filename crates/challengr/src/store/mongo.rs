use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    Client, Database,
    bson::{Bson, Document, doc, oid::ObjectId},
};
use tracing::info;

use super::DocumentStore;
use crate::{config::StoreConfig, errors::StoreError};

/// MongoDB-backed store.
#[derive(Clone, Debug)]
pub struct MongoStore {
    client: Client,
    db: Database,
}

impl MongoStore {
    /// Connects and pings the server so an unreachable store is reported
    /// here rather than on the first write.
    pub async fn connect(config: &StoreConfig) -> Result<Self, StoreError> {
        let client = Client::with_uri_str(&config.uri).await?;
        let db = client.database(&config.database);
        db.run_command(doc! { "ping": 1 }).await?;

        info!("Connected to Mongo! Database name: \"{}\"", db.name());

        Ok(Self { client, db })
    }

    fn collection(&self, name: &str) -> mongodb::Collection<Document> {
        self.db.collection::<Document>(name)
    }
}

#[async_trait]
impl DocumentStore for MongoStore {
    fn database_name(&self) -> &str {
        self.db.name()
    }

    async fn delete_all(&self, collection: &str) -> Result<u64, StoreError> {
        let result = self.collection(collection).delete_many(doc! {}).await?;
        Ok(result.deleted_count)
    }

    async fn insert_many(
        &self,
        collection: &str,
        documents: Vec<Document>,
    ) -> Result<Vec<ObjectId>, StoreError> {
        // The driver rejects empty batches.
        if documents.is_empty() {
            return Ok(Vec::new());
        }

        let count = documents.len();
        let result = self.collection(collection).insert_many(documents).await?;

        (0..count)
            .map(|idx| match result.inserted_ids.get(&idx) {
                Some(Bson::ObjectId(id)) => Ok(*id),
                _ => Err(StoreError::UnexpectedId {
                    collection: collection.to_string(),
                }),
            })
            .collect()
    }

    async fn find_all(&self, collection: &str) -> Result<Vec<Document>, StoreError> {
        let cursor = self.collection(collection).find(doc! {}).await?;
        let documents: Vec<Document> = cursor.try_collect().await?;
        Ok(documents)
    }

    async fn disconnect(&self) -> Result<(), StoreError> {
        self.client.clone().shutdown().await;
        Ok(())
    }
}
