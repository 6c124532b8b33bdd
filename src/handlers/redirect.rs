use crate::{error::ApiError, AppState};
use axum::{
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
};
use std::sync::Arc;

/// GET /:code
///
/// 1. Rebuild the full short URL from the configured base and the code.
/// 2. Resolve it, which counts the redirect.
/// 3. Return a 303 See Other redirect to the long URL, or 404.
pub async fn redirect(
    State(state): State<Arc<AppState>>,
    Path(code): Path<String>,
) -> Result<Response, ApiError> {
    let short_url = state.mapper.generator().short_url_for_code(&code);

    match state.mapped.get_long_url(&short_url)? {
        Some(long_url) => Ok(Redirect::to(long_url.as_str()).into_response()),
        None => {
            tracing::debug!(code = %code, "Short link not found");
            Err(ApiError::NotFound)
        }
    }
}
