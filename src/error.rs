use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::models::TitleCandidate;

/// Application-level errors
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("Failed to load catalog from {source_name}: {reason}")]
    CatalogLoad { source_name: String, reason: String },

    #[error("Cache error: {0}")]
    Cache(#[from] redis::RedisError),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Title '{title}' matches {} movies", .candidates.len())]
    AmbiguousTitle {
        title: String,
        candidates: Vec<TitleCandidate>,
    },

    #[error("External API error: {0}")]
    ExternalApi(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn catalog_load(source_name: impl Into<String>, reason: impl ToString) -> Self {
        AppError::CatalogLoad {
            source_name: source_name.into(),
            reason: reason.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let AppError::AmbiguousTitle { candidates, .. } = &self {
            let body = Json(json!({
                "error": self.to_string(),
                "candidates": candidates,
            }));
            return (StatusCode::CONFLICT, body).into_response();
        }

        let (status, message) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::CatalogLoad { .. } | AppError::Cache(_) | AppError::Internal(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, self.to_string())
            }
            AppError::ExternalApi(msg) => (StatusCode::BAD_GATEWAY, msg),
            AppError::HttpClient(_) => (StatusCode::BAD_GATEWAY, self.to_string()),
            AppError::AmbiguousTitle { .. } => (StatusCode::CONFLICT, self.to_string()),
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_load_names_source() {
        let err = AppError::catalog_load("data/korean_movies.csv", "No such file or directory");
        assert_eq!(
            err.to_string(),
            "Failed to load catalog from data/korean_movies.csv: No such file or directory"
        );
    }

    #[test]
    fn test_status_codes() {
        let cases = vec![
            (AppError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (AppError::InvalidInput("x".into()), StatusCode::BAD_REQUEST),
            (AppError::ExternalApi("x".into()), StatusCode::BAD_GATEWAY),
            (
                AppError::catalog_load("a.csv", "boom"),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                AppError::AmbiguousTitle {
                    title: "Hamlet".into(),
                    candidates: vec![],
                },
                StatusCode::CONFLICT,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }
}
