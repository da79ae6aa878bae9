use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

pub const TITLE_MAX_CHARS: usize = 100;
pub const DESCRIPTION_MAX_CHARS: usize = 500;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("title must be between 1 and {} characters", TITLE_MAX_CHARS)]
    TitleLength,
    #[error("description must be at most {} characters", DESCRIPTION_MAX_CHARS)]
    DescriptionTooLong,
    #[error("{0} must contain at least one item")]
    EmptyList(&'static str),
    #[error("Items in ingredients, steps, and tags must be non-empty strings ({0} rejected).")]
    BlankItem(&'static str),
    #[error("At least one field must be provided for update.")]
    EmptyUpdate,
}

/// A stored recipe. The `id` is assigned by the repository on create and never changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipe {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub ingredients: Vec<String>,
    pub steps: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Recipe {
    pub fn from_create(recipe_in: RecipeCreate) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: recipe_in.title,
            description: recipe_in.description,
            ingredients: recipe_in.ingredients,
            steps: recipe_in.steps,
            tags: recipe_in.tags,
        }
    }
}

/// Payload for creating a recipe. Callers never supply the id; unknown fields are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeCreate {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub ingredients: Vec<String>,
    pub steps: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl RecipeCreate {
    /// Checks field constraints and returns the payload with list items trimmed.
    pub fn validate(self) -> Result<Self, ValidationError> {
        check_title(&self.title)?;
        if let Some(description) = &self.description {
            check_description(description)?;
        }
        Ok(Self {
            title: self.title,
            description: self.description,
            ingredients: clean_list("ingredients", self.ingredients, true)?,
            steps: clean_list("steps", self.steps, true)?,
            tags: clean_list("tags", self.tags, false)?,
        })
    }
}

/// Sparse update: `None` means "leave as is", so a description cannot be cleared through it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ingredients: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub steps: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

impl RecipeUpdate {
    pub fn validate(self) -> Result<Self, ValidationError> {
        if self.is_empty() {
            return Err(ValidationError::EmptyUpdate);
        }
        if let Some(title) = &self.title {
            check_title(title)?;
        }
        if let Some(description) = &self.description {
            check_description(description)?;
        }
        Ok(Self {
            title: self.title,
            description: self.description,
            ingredients: self
                .ingredients
                .map(|items| clean_list("ingredients", items, true))
                .transpose()?,
            steps: self
                .steps
                .map(|items| clean_list("steps", items, true))
                .transpose()?,
            tags: self
                .tags
                .map(|items| clean_list("tags", items, false))
                .transpose()?,
        })
    }

    /// True when no field would be applied.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.ingredients.is_none()
            && self.steps.is_none()
            && self.tags.is_none()
    }

    /// Copies `recipe`, overriding only the fields present here. The id is never touched.
    pub fn apply_to(&self, recipe: &Recipe) -> Recipe {
        Recipe {
            id: recipe.id,
            title: self.title.clone().unwrap_or_else(|| recipe.title.clone()),
            description: self
                .description
                .clone()
                .or_else(|| recipe.description.clone()),
            ingredients: self
                .ingredients
                .clone()
                .unwrap_or_else(|| recipe.ingredients.clone()),
            steps: self.steps.clone().unwrap_or_else(|| recipe.steps.clone()),
            tags: self.tags.clone().unwrap_or_else(|| recipe.tags.clone()),
        }
    }
}

fn check_title(title: &str) -> Result<(), ValidationError> {
    let len = title.chars().count();
    if len == 0 || len > TITLE_MAX_CHARS {
        return Err(ValidationError::TitleLength);
    }
    Ok(())
}

fn check_description(description: &str) -> Result<(), ValidationError> {
    if description.chars().count() > DESCRIPTION_MAX_CHARS {
        return Err(ValidationError::DescriptionTooLong);
    }
    Ok(())
}

// Whole-list check: one blank entry rejects the list.
fn clean_list(
    field: &'static str,
    items: Vec<String>,
    required: bool,
) -> Result<Vec<String>, ValidationError> {
    if required && items.is_empty() {
        return Err(ValidationError::EmptyList(field));
    }
    let cleaned: Vec<String> = items.iter().map(|item| item.trim().to_string()).collect();
    if cleaned.iter().any(|item| item.is_empty()) {
        return Err(ValidationError::BlankItem(field));
    }
    Ok(cleaned)
}
