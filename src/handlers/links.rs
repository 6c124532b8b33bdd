use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

use super::parse_url;
use crate::{error::ApiError, AppState};

// ── Request / response types ───────────────────────────────────────────────

#[derive(Deserialize)]
pub struct CreateLinkRequest {
    url: String,
    #[serde(default)]
    force_new: bool,
    preferred_short_url: Option<String>,
}

#[derive(Serialize)]
pub struct CreateLinkResponse {
    short_url: Url,
    long_url: Url,
}

#[derive(Deserialize)]
pub struct LongUrlQuery {
    long_url: String,
}

#[derive(Deserialize)]
pub struct ShortUrlQuery {
    short_url: String,
}

#[derive(Serialize)]
pub struct ShortUrlsResponse {
    long_url: Url,
    short_urls: Vec<Url>,
}

#[derive(Serialize)]
pub struct StatsResponse {
    short_url: Url,
    #[serde(skip_serializing_if = "Option::is_none")]
    long_url: Option<Url>,
    usage: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    created_at: Option<DateTime<Utc>>,
}

// ── Handlers ───────────────────────────────────────────────────────────────

/// POST /links
pub async fn create_link(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CreateLinkRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(request) = payload?;

    let long_url = parse_url("url", &request.url)?;
    let preferred = request
        .preferred_short_url
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| parse_url("preferred_short_url", s))
        .transpose()?;

    let short_url = state
        .mapper
        .create_short_url(&long_url, request.force_new, preferred.as_ref())?;

    Ok((
        StatusCode::CREATED,
        Json(CreateLinkResponse {
            short_url,
            long_url,
        }),
    )
        .into_response())
}

/// GET /links?long_url=...
pub async fn list_links(
    State(state): State<Arc<AppState>>,
    query: Result<Query<LongUrlQuery>, QueryRejection>,
) -> Result<Json<ShortUrlsResponse>, ApiError> {
    let Query(query) = query?;
    let long_url = parse_url("long_url", &query.long_url)?;
    let short_urls = state.mapped.get_short_urls(&long_url)?;

    Ok(Json(ShortUrlsResponse {
        long_url,
        short_urls,
    }))
}

/// DELETE /links?short_url=...
pub async fn delete_link(
    State(state): State<Arc<AppState>>,
    query: Result<Query<ShortUrlQuery>, QueryRejection>,
) -> Result<StatusCode, ApiError> {
    let Query(query) = query?;
    let short_url = parse_url("short_url", &query.short_url)?;

    if state.mapper.delete_short_url(&short_url)? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound)
    }
}

/// GET /stats?short_url=...
///
/// Unknown short URLs report a usage of zero rather than 404, without a
/// second trip to the store.
pub async fn stats(
    State(state): State<Arc<AppState>>,
    query: Result<Query<ShortUrlQuery>, QueryRejection>,
) -> Result<Json<StatsResponse>, ApiError> {
    let Query(query) = query?;
    let short_url = parse_url("short_url", &query.short_url)?;

    let response = match state.mapped.get_stats(&short_url)? {
        Some(mapping) => StatsResponse {
            short_url: mapping.short_url,
            long_url: Some(mapping.long_url),
            usage: mapping.redirects,
            created_at: Some(mapping.created_at),
        },
        None => StatsResponse {
            short_url,
            usage: 0,
            long_url: None,
            created_at: None,
        },
    };

    Ok(Json(response))
}
