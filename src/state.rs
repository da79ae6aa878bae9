use std::sync::Arc;

use tracing::info;

use crate::chat::CompletionClient;
use crate::config::{Settings, StorageKind};
use crate::repositories::{DocumentRecipeRepository, InMemoryRecipeRepository, RecipeRepository};

/// Everything a request handler needs. Built once at startup and shared behind an `Arc`.
pub struct AppContext {
    pub settings: Settings,
    pub repository: Arc<dyn RecipeRepository>,
    pub completions: CompletionClient,
    mongo_client: Option<mongodb::Client>,
}

impl AppContext {
    /// Builds the context with the backend selected by `settings.storage`.
    pub async fn connect(settings: Settings) -> anyhow::Result<Self> {
        match settings.storage {
            StorageKind::Memory => {
                info!("Using in-memory recipe storage");
                Ok(Self::with_repository(
                    settings,
                    Arc::new(InMemoryRecipeRepository::new()),
                ))
            }
            StorageKind::Mongo => {
                let client = mongodb::Client::with_uri_str(&settings.mongodb_uri).await?;
                let repository = DocumentRecipeRepository::mongo(
                    &client,
                    &settings.mongodb_db,
                    &settings.mongodb_collection,
                )?;
                info!(
                    db = %settings.mongodb_db,
                    collection = %settings.mongodb_collection,
                    "Using MongoDB recipe storage"
                );
                let mut context = Self::with_repository(settings, Arc::new(repository));
                context.mongo_client = Some(client);
                Ok(context)
            }
        }
    }

    /// Uses the given repository as-is; nothing is opened that needs closing.
    pub fn with_repository(settings: Settings, repository: Arc<dyn RecipeRepository>) -> Self {
        let completions = CompletionClient::new(&settings.openai_base_url, &settings.openai_model);
        Self {
            settings,
            repository,
            completions,
            mongo_client: None,
        }
    }

    /// Closes the store connection, if one was opened.
    pub async fn shutdown(&self) {
        if let Some(client) = &self.mongo_client {
            info!("Closing MongoDB client");
            client.clone().shutdown().await;
        }
    }
}
