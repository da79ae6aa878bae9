use async_trait::async_trait;
use indexmap::IndexMap;
use parking_lot::RwLock;
use tracing::debug;
use uuid::Uuid;

use super::{RecipeRepository, RepositoryError};
use crate::models::{Recipe, RecipeCreate, RecipeUpdate};

/// Keeps recipes in process memory, in insertion order. Contents are lost on restart.
///
/// Concurrent writers to the same id get last-write-wins; meant for tests and
/// single-user local runs.
#[derive(Debug, Default)]
pub struct InMemoryRecipeRepository {
    recipes: RwLock<IndexMap<Uuid, Recipe>>,
}

impl InMemoryRecipeRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RecipeRepository for InMemoryRecipeRepository {
    async fn list_recipes(&self) -> Result<Vec<Recipe>, RepositoryError> {
        Ok(self.recipes.read().values().cloned().collect())
    }

    async fn get_recipe(&self, recipe_id: Uuid) -> Result<Option<Recipe>, RepositoryError> {
        Ok(self.recipes.read().get(&recipe_id).cloned())
    }

    async fn create_recipe(&self, recipe_in: RecipeCreate) -> Result<Recipe, RepositoryError> {
        let recipe = Recipe::from_create(recipe_in);
        self.recipes.write().insert(recipe.id, recipe.clone());
        debug!(recipe_id = %recipe.id, "stored recipe in memory");
        Ok(recipe)
    }

    async fn update_recipe(
        &self,
        recipe_id: Uuid,
        recipe_in: RecipeUpdate,
    ) -> Result<Option<Recipe>, RepositoryError> {
        let mut recipes = self.recipes.write();
        let Some(current) = recipes.get(&recipe_id) else {
            return Ok(None);
        };
        let updated = recipe_in.apply_to(current);
        recipes.insert(recipe_id, updated.clone());
        debug!(%recipe_id, "updated recipe in memory");
        Ok(Some(updated))
    }

    async fn delete_recipe(&self, recipe_id: Uuid) -> Result<bool, RepositoryError> {
        let removed = self.recipes.write().shift_remove(&recipe_id).is_some();
        debug!(%recipe_id, removed, "delete recipe in memory");
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(title: &str) -> RecipeCreate {
        RecipeCreate {
            title: title.to_string(),
            description: None,
            ingredients: vec!["water".into()],
            steps: vec!["boil".into()],
            tags: vec![],
        }
    }

    #[tokio::test]
    async fn test_list_keeps_insertion_order_after_delete() {
        let repo = InMemoryRecipeRepository::new();
        let first = repo.create_recipe(payload("first")).await.unwrap();
        let second = repo.create_recipe(payload("second")).await.unwrap();
        let third = repo.create_recipe(payload("third")).await.unwrap();

        assert!(repo.delete_recipe(second.id).await.unwrap());

        let titles: Vec<String> = repo
            .list_recipes()
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.title)
            .collect();
        assert_eq!(titles, vec!["first", "third"]);
        assert_ne!(first.id, third.id);
    }

    #[tokio::test]
    async fn test_update_keeps_position_and_id() {
        let repo = InMemoryRecipeRepository::new();
        let first = repo.create_recipe(payload("first")).await.unwrap();
        repo.create_recipe(payload("second")).await.unwrap();

        let update = RecipeUpdate {
            title: Some("renamed".into()),
            ..Default::default()
        };
        let updated = repo.update_recipe(first.id, update).await.unwrap().unwrap();
        assert_eq!(updated.id, first.id);

        let listed = repo.list_recipes().await.unwrap();
        assert_eq!(listed[0].title, "renamed");
    }

    #[tokio::test]
    async fn test_update_with_nothing_set_returns_current() {
        let repo = InMemoryRecipeRepository::new();
        let created = repo.create_recipe(payload("soup")).await.unwrap();
        let same = repo
            .update_recipe(created.id, RecipeUpdate::default())
            .await
            .unwrap();
        assert_eq!(same, Some(created));
    }
}
