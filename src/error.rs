use std::time::Duration;

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::warn;
use url::Url;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ShortyError {
    #[error("Short URL '{short_url}' is already mapped to '{existing_long_url}'")]
    Conflict {
        short_url: Url,
        existing_long_url: Url,
    },
    #[error("Short URL '{0}' was taken before it could be inserted")]
    ShortUrlTaken(Url),
    #[error("Timed out after {0:?} waiting for the URL store lock")]
    LockTimeout(Duration),
}

pub type Result<T, E = ShortyError> = std::result::Result<T, E>;

/// Errors surfaced by the HTTP layer.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("Not found")]
    NotFound,
    #[error("Invalid JSON")]
    InvalidJson(#[from] JsonRejection),
    #[error("Invalid query")]
    InvalidQuery(#[from] QueryRejection),
    #[error(transparent)]
    Shorty(#[from] ShortyError),
}

impl ApiError {
    pub fn invalid_url(field: &str, err: url::ParseError) -> Self {
        ApiError::BadRequest(format!("`{field}` is not an absolute URL: {err}"))
    }
}

#[derive(Serialize)]
struct ErrorBody {
    code: &'static str,
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        // Client errors and absence are expected and not logged; store
        // contention is logged as warn!.
        let (status, body) = match self {
            ApiError::BadRequest(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    code: "bad_request",
                    error: msg,
                    details: None,
                },
            ),
            ApiError::NotFound => (
                StatusCode::NOT_FOUND,
                ErrorBody {
                    code: "not_found",
                    error: "Resource not found".to_string(),
                    details: Some("The requested short URL does not exist".to_string()),
                },
            ),
            ApiError::InvalidJson(rejection) => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    code: "invalid_json",
                    error: "Invalid JSON in request body".to_string(),
                    details: Some(rejection.body_text()),
                },
            ),
            ApiError::InvalidQuery(rejection) => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    code: "invalid_query",
                    error: "Invalid query string".to_string(),
                    details: Some(rejection.body_text()),
                },
            ),
            ApiError::Shorty(e @ ShortyError::Conflict { .. }) => (
                StatusCode::CONFLICT,
                ErrorBody {
                    code: "conflict",
                    error: "Preferred short URL is bound to a different long URL".to_string(),
                    details: Some(e.to_string()),
                },
            ),
            ApiError::Shorty(e @ ShortyError::ShortUrlTaken(_)) => {
                warn!(error = %e, "Generated short URL collided on insert");

                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    ErrorBody {
                        code: "short_url_taken",
                        error: "Service temporarily unavailable".to_string(),
                        details: Some("Short URL was taken concurrently, please retry".to_string()),
                    },
                )
            }
            ApiError::Shorty(e @ ShortyError::LockTimeout(_)) => {
                warn!(error = %e, "URL store lock acquisition timed out");

                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    ErrorBody {
                        code: "service_unavailable",
                        error: "Service temporarily unavailable".to_string(),
                        details: Some("Please try again later".to_string()),
                    },
                )
            }
        };

        (status, Json(body)).into_response()
    }
}
