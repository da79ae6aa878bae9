//! Recipe persistence.
//!
//! [`RecipeRepository`] is the contract the HTTP layer talks to. Two backends
//! implement it: [`InMemoryRecipeRepository`] for tests and local runs, and
//! [`DocumentRecipeRepository`] over any [`DocumentCollection`] (MongoDB in
//! production). The backend is picked when the application context is built.
//!
//! Lookups that find nothing return `None` (or `false` for delete); errors are
//! reserved for corrupt stored data and failures of the store itself.

pub mod document;
pub mod memory;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{Recipe, RecipeCreate, RecipeUpdate};

pub use document::{DocumentCollection, DocumentRecipeRepository, LocalCollection, MongoCollection};
pub use memory::InMemoryRecipeRepository;

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum RepositoryError {
    /// A stored record has no usable identifier or cannot be rebuilt into a recipe.
    #[error("corrupt recipe document: {0}")]
    CorruptDocument(String),
    #[error("invalid repository argument: {0}")]
    InvalidArgument(String),
    /// Error raised by the storage collaborator, passed through untouched.
    #[error(transparent)]
    Store(BoxError),
}

impl RepositoryError {
    pub fn store<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        RepositoryError::Store(Box::new(err))
    }
}

#[async_trait]
pub trait RecipeRepository: Send + Sync {
    /// All stored recipes. Order is backend-defined.
    async fn list_recipes(&self) -> Result<Vec<Recipe>, RepositoryError>;

    async fn get_recipe(&self, recipe_id: Uuid) -> Result<Option<Recipe>, RepositoryError>;

    /// Assigns a fresh id, stores the recipe and returns it.
    async fn create_recipe(&self, recipe_in: RecipeCreate) -> Result<Recipe, RepositoryError>;

    /// Applies only the fields present in `recipe_in`. An update that sets nothing
    /// returns the current record unchanged.
    async fn update_recipe(
        &self,
        recipe_id: Uuid,
        recipe_in: RecipeUpdate,
    ) -> Result<Option<Recipe>, RepositoryError>;

    /// Returns whether a record existed and was removed.
    async fn delete_recipe(&self, recipe_id: Uuid) -> Result<bool, RepositoryError>;
}
