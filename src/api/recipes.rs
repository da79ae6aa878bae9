use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use uuid::Uuid;

use super::{ApiError, ApiJson, ApiPath, AppState};
use crate::models::{Recipe, RecipeCreate, RecipeUpdate};

/// Routes mounted at /recipes
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_recipes).post(create_recipe))
        .route(
            "/{id}",
            get(get_recipe).put(update_recipe).delete(delete_recipe),
        )
}

pub async fn list_recipes(State(ctx): State<AppState>) -> Result<Json<Vec<Recipe>>, ApiError> {
    Ok(Json(ctx.repository.list_recipes().await?))
}

pub async fn create_recipe(
    State(ctx): State<AppState>,
    ApiJson(recipe_in): ApiJson<RecipeCreate>,
) -> Result<(StatusCode, Json<Recipe>), ApiError> {
    let recipe_in = recipe_in.validate()?;
    let recipe = ctx.repository.create_recipe(recipe_in).await?;
    Ok((StatusCode::CREATED, Json(recipe)))
}

pub async fn get_recipe(
    State(ctx): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<Recipe>, ApiError> {
    ctx.repository
        .get_recipe(id)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound)
}

pub async fn update_recipe(
    State(ctx): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(recipe_in): ApiJson<RecipeUpdate>,
) -> Result<Json<Recipe>, ApiError> {
    // Rejects an empty payload before touching storage.
    let recipe_in = recipe_in.validate()?;
    ctx.repository
        .update_recipe(id, recipe_in)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound)
}

pub async fn delete_recipe(
    State(ctx): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<StatusCode, ApiError> {
    if ctx.repository.delete_recipe(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound)
    }
}
