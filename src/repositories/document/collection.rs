use std::convert::Infallible;

use async_trait::async_trait;
use mongodb::bson::Document;
use parking_lot::RwLock;

use super::document_key;

/// The five primitives the document backend needs from a store.
///
/// `key` is always the recipe id in string form; implementations match it
/// against their primary-key field.
#[async_trait]
pub trait DocumentCollection: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    async fn find_all(&self) -> Result<Vec<Document>, Self::Error>;

    async fn find_one(&self, key: &str) -> Result<Option<Document>, Self::Error>;

    async fn insert_one(&self, document: Document) -> Result<(), Self::Error>;

    /// Sets `fields` on the matching document in a single step and returns the
    /// document as it is after the write.
    async fn find_one_and_set(
        &self,
        key: &str,
        fields: Document,
    ) -> Result<Option<Document>, Self::Error>;

    /// True only if a document was removed.
    async fn delete_one(&self, key: &str) -> Result<bool, Self::Error>;
}

/// A collection held in process memory, for running the document backend without a server.
#[derive(Debug, Default)]
pub struct LocalCollection {
    documents: RwLock<Vec<Document>>,
}

impl LocalCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from raw documents as-is, including ones the backend would reject.
    pub fn with_documents(documents: Vec<Document>) -> Self {
        Self {
            documents: RwLock::new(documents),
        }
    }

    pub fn documents(&self) -> Vec<Document> {
        self.documents.read().clone()
    }
}

#[async_trait]
impl DocumentCollection for LocalCollection {
    type Error = Infallible;

    async fn find_all(&self) -> Result<Vec<Document>, Self::Error> {
        Ok(self.documents())
    }

    async fn find_one(&self, key: &str) -> Result<Option<Document>, Self::Error> {
        Ok(self
            .documents
            .read()
            .iter()
            .find(|document| document_key(document) == Some(key))
            .cloned())
    }

    async fn insert_one(&self, document: Document) -> Result<(), Self::Error> {
        self.documents.write().push(document);
        Ok(())
    }

    async fn find_one_and_set(
        &self,
        key: &str,
        fields: Document,
    ) -> Result<Option<Document>, Self::Error> {
        let mut documents = self.documents.write();
        let Some(document) = documents
            .iter_mut()
            .find(|document| document_key(document) == Some(key))
        else {
            return Ok(None);
        };
        for (field, value) in fields {
            document.insert(field, value);
        }
        Ok(Some(document.clone()))
    }

    async fn delete_one(&self, key: &str) -> Result<bool, Self::Error> {
        let mut documents = self.documents.write();
        match documents
            .iter()
            .position(|document| document_key(document) == Some(key))
        {
            Some(index) => {
                documents.remove(index);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
