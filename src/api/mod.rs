pub mod chat;
pub mod recipes;

use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{FromRequest, FromRequestParts, MatchedPath};
use axum::http::{Request, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tower_http::trace::TraceLayer;
use tracing::{error, Span};

use crate::chat::ApiConnectionError;
use crate::models::ValidationError;
use crate::repositories::RepositoryError;
use crate::state::AppContext;

pub type AppState = Arc<AppContext>;

pub const MISSING_KEY_DETAIL: &str =
    "Provide X-OpenAI-Key header or RECIPES_OPENAI_API_KEY env var.";

/// Body of every error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub detail: String,
}

/// JSON body extractor whose rejections answer with an [`ErrorResponse`].
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// Path extractor whose rejections answer with an [`ErrorResponse`].
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct ApiPath<T>(pub T);

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Recipe not found.")]
    NotFound,
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("{}", .0.body_text())]
    JsonRejection(#[from] JsonRejection),
    #[error("{}", .0.body_text())]
    PathRejection(#[from] PathRejection),
    #[error("{}", MISSING_KEY_DETAIL)]
    MissingApiKey,
    #[error("OpenAI request failed: {0}")]
    Upstream(#[from] ApiConnectionError),
    #[error("Internal storage error")]
    Repository(#[from] RepositoryError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::JsonRejection(rejection) => match rejection {
                JsonRejection::MissingJsonContentType(_) | JsonRejection::BytesRejection(_) => {
                    rejection.status()
                }
                _ => StatusCode::UNPROCESSABLE_ENTITY,
            },
            ApiError::PathRejection(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::MissingApiKey => StatusCode::BAD_REQUEST,
            ApiError::Upstream(_) => StatusCode::BAD_GATEWAY,
            ApiError::Repository(err) => {
                error!(error = %err, "repository operation failed");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = ErrorResponse {
            detail: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// Full application router with request tracing.
pub fn router(state: AppState) -> Router {
    Router::new()
        .nest("/recipes", recipes::router())
        // Older clients address the collection with a trailing slash.
        .route(
            "/recipes/",
            get(recipes::list_recipes).post(recipes::create_recipe),
        )
        .nest("/chat", chat::router())
        .with_state(state)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<_>| {
                    let matched_path = request
                        .extensions()
                        .get::<MatchedPath>()
                        .map(MatchedPath::as_str)
                        .unwrap_or(request.uri().path());
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        path = %matched_path,
                    )
                })
                .on_request(|_request: &Request<_>, _span: &Span| {})
                .on_response(
                    |response: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     _span: &Span| {
                        let status = response.status().as_u16();
                        if status >= 500 {
                            tracing::error!(
                                status = %status,
                                latency_ms = %latency.as_millis(),
                                "request failed with server error"
                            );
                        } else {
                            tracing::info!(
                                status = %status,
                                latency_ms = %latency.as_millis(),
                                "request completed"
                            );
                        }
                    },
                ),
        )
}
