//! Document-store backend.
//!
//! Recipes are stored one document per recipe. The recipe id lives in the
//! store's primary-key field as its canonical hyphenated string, never as a
//! native binary UUID, so lookups behave the same across drivers. Reading
//! falls back to a plain `id` field for documents written in the older shape.
//!
//! This module tree is the only place that knows the primary-key field name.

mod collection;
mod mongo;

use async_trait::async_trait;
use mongodb::bson::{self, spec::BinarySubtype, Bson, Document};
use serde::Deserialize;
use tracing::debug;
use uuid::Uuid;

use super::{RecipeRepository, RepositoryError};
use crate::models::{Recipe, RecipeCreate, RecipeUpdate};

pub use collection::{DocumentCollection, LocalCollection};
pub use mongo::MongoCollection;

const PRIMARY_KEY: &str = "_id";
const LEGACY_KEY: &str = "id";

fn key_filter(key: &str) -> Document {
    let mut filter = Document::new();
    filter.insert(PRIMARY_KEY, key);
    filter
}

fn document_key(document: &Document) -> Option<&str> {
    document.get_str(PRIMARY_KEY).ok()
}

// Everything but the id, as stored.
#[derive(Debug, Deserialize)]
struct StoredFields {
    title: String,
    #[serde(default)]
    description: Option<String>,
    ingredients: Vec<String>,
    steps: Vec<String>,
    #[serde(default)]
    tags: Vec<String>,
}

fn recipe_to_document(recipe: &Recipe) -> Document {
    let mut document = Document::new();
    document.insert(PRIMARY_KEY, recipe.id.to_string());
    document.insert("title", recipe.title.as_str());
    document.insert("description", recipe.description.as_deref());
    document.insert("ingredients", recipe.ingredients.clone());
    document.insert("steps", recipe.steps.clone());
    document.insert("tags", recipe.tags.clone());
    document
}

fn document_to_recipe(mut document: Document) -> Result<Recipe, RepositoryError> {
    let primary = document.remove(PRIMARY_KEY);
    let legacy = document.remove(LEGACY_KEY);
    let raw_id = primary.or(legacy).ok_or_else(|| {
        RepositoryError::CorruptDocument("missing recipe identifier".to_string())
    })?;
    let id = parse_identifier(&raw_id)?;

    let fields: StoredFields = bson::from_document(document).map_err(|e| {
        RepositoryError::CorruptDocument(format!("recipe {id} cannot be decoded: {e}"))
    })?;

    Ok(Recipe {
        id,
        title: fields.title,
        description: fields.description,
        ingredients: fields.ingredients,
        steps: fields.steps,
        tags: fields.tags,
    })
}

fn parse_identifier(raw_id: &Bson) -> Result<Uuid, RepositoryError> {
    let parsed = match raw_id {
        Bson::String(value) => Uuid::parse_str(value).ok(),
        Bson::Binary(binary) if binary.subtype == BinarySubtype::Uuid => {
            Uuid::from_slice(&binary.bytes).ok()
        }
        _ => None,
    };
    parsed.ok_or_else(|| {
        RepositoryError::CorruptDocument(format!("recipe identifier {raw_id} is not a UUID"))
    })
}

// Present, non-null fields only; the id is never part of an update.
fn update_to_fields(recipe_in: &RecipeUpdate) -> Document {
    let mut fields = Document::new();
    if let Some(title) = &recipe_in.title {
        fields.insert("title", title.as_str());
    }
    if let Some(description) = &recipe_in.description {
        fields.insert("description", description.as_str());
    }
    if let Some(ingredients) = &recipe_in.ingredients {
        fields.insert("ingredients", ingredients.clone());
    }
    if let Some(steps) = &recipe_in.steps {
        fields.insert("steps", steps.clone());
    }
    if let Some(tags) = &recipe_in.tags {
        fields.insert("tags", tags.clone());
    }
    fields
}

/// Recipe repository over a single document collection.
pub struct DocumentRecipeRepository<C> {
    collection: C,
}

impl<C: DocumentCollection> DocumentRecipeRepository<C> {
    pub fn new(collection: C) -> Self {
        Self { collection }
    }

    pub fn collection(&self) -> &C {
        &self.collection
    }
}

impl DocumentRecipeRepository<MongoCollection> {
    /// Binds to `db_name.collection_name` on an already-configured client.
    pub fn mongo(
        client: &mongodb::Client,
        db_name: &str,
        collection_name: &str,
    ) -> Result<Self, RepositoryError> {
        Ok(Self::new(MongoCollection::new(client, db_name, collection_name)?))
    }
}

#[async_trait]
impl<C: DocumentCollection> RecipeRepository for DocumentRecipeRepository<C> {
    async fn list_recipes(&self) -> Result<Vec<Recipe>, RepositoryError> {
        let documents = self
            .collection
            .find_all()
            .await
            .map_err(RepositoryError::store)?;
        documents.into_iter().map(document_to_recipe).collect()
    }

    async fn get_recipe(&self, recipe_id: Uuid) -> Result<Option<Recipe>, RepositoryError> {
        let document = self
            .collection
            .find_one(&recipe_id.to_string())
            .await
            .map_err(RepositoryError::store)?;
        document.map(document_to_recipe).transpose()
    }

    async fn create_recipe(&self, recipe_in: RecipeCreate) -> Result<Recipe, RepositoryError> {
        let recipe = Recipe::from_create(recipe_in);
        self.collection
            .insert_one(recipe_to_document(&recipe))
            .await
            .map_err(RepositoryError::store)?;
        debug!(recipe_id = %recipe.id, "inserted recipe document");
        Ok(recipe)
    }

    async fn update_recipe(
        &self,
        recipe_id: Uuid,
        recipe_in: RecipeUpdate,
    ) -> Result<Option<Recipe>, RepositoryError> {
        let fields = update_to_fields(&recipe_in);
        if fields.is_empty() {
            return self.get_recipe(recipe_id).await;
        }
        let document = self
            .collection
            .find_one_and_set(&recipe_id.to_string(), fields)
            .await
            .map_err(RepositoryError::store)?;
        debug!(%recipe_id, matched = document.is_some(), "updated recipe document");
        document.map(document_to_recipe).transpose()
    }

    async fn delete_recipe(&self, recipe_id: Uuid) -> Result<bool, RepositoryError> {
        let removed = self
            .collection
            .delete_one(&recipe_id.to_string())
            .await
            .map_err(RepositoryError::store)?;
        debug!(%recipe_id, removed, "deleted recipe document");
        Ok(removed)
    }
}
