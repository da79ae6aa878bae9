use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::{doc, Document};
use mongodb::options::ReturnDocument;
use mongodb::{Client, Collection};

use super::key_filter;
use super::collection::DocumentCollection;
use crate::repositories::RepositoryError;

/// A MongoDB collection. Driver errors are returned as-is; nothing here retries.
#[derive(Debug, Clone)]
pub struct MongoCollection {
    inner: Collection<Document>,
}

impl MongoCollection {
    pub fn new(
        client: &Client,
        db_name: &str,
        collection_name: &str,
    ) -> Result<Self, RepositoryError> {
        if db_name.trim().is_empty() {
            return Err(RepositoryError::InvalidArgument(
                "database name must not be empty".to_string(),
            ));
        }
        if collection_name.trim().is_empty() {
            return Err(RepositoryError::InvalidArgument(
                "collection name must not be empty".to_string(),
            ));
        }
        Ok(Self {
            inner: client.database(db_name).collection(collection_name),
        })
    }
}

#[async_trait]
impl DocumentCollection for MongoCollection {
    type Error = mongodb::error::Error;

    async fn find_all(&self) -> Result<Vec<Document>, Self::Error> {
        let cursor = self.inner.find(doc! {}).await?;
        cursor.try_collect().await
    }

    async fn find_one(&self, key: &str) -> Result<Option<Document>, Self::Error> {
        self.inner.find_one(key_filter(key)).await
    }

    async fn insert_one(&self, document: Document) -> Result<(), Self::Error> {
        self.inner.insert_one(document).await?;
        Ok(())
    }

    async fn find_one_and_set(
        &self,
        key: &str,
        fields: Document,
    ) -> Result<Option<Document>, Self::Error> {
        self.inner
            .find_one_and_update(key_filter(key), doc! { "$set": fields })
            .return_document(ReturnDocument::After)
            .await
    }

    async fn delete_one(&self, key: &str) -> Result<bool, Self::Error> {
        let result = self.inner.delete_one(key_filter(key)).await?;
        Ok(result.deleted_count == 1)
    }
}
