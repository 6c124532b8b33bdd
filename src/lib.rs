pub mod config;
pub mod error;
pub mod handlers;
pub mod mapped;
pub mod mapping;
pub mod models;
pub mod shortcode;
pub mod store;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use config::AppConfig;
use mapped::MappedUrls;
use mapping::UrlMapper;
use shortcode::CounterShortUrl;
use store::UrlStore;

// ── Shared application state ───────────────────────────────────────────────

pub struct AppState {
    pub config: AppConfig,
    pub mapper: UrlMapper,
    pub mapped: MappedUrls,
}

impl AppState {
    /// Wire a fresh store, generator and both services from `config`.
    pub fn new(config: AppConfig) -> Self {
        let store = match config.lock_timeout {
            Some(timeout) => UrlStore::with_lock_timeout(timeout),
            None => UrlStore::new(),
        };
        let generator = CounterShortUrl::with_seed(config.short_url_base.clone(), config.code_seed);

        Self {
            mapper: UrlMapper::new(store.clone(), generator),
            mapped: MappedUrls::new(store),
            config,
        }
    }
}

// ── Router ─────────────────────────────────────────────────────────────────

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(|| async { axum::http::StatusCode::OK }))
        .route(
            "/links",
            post(handlers::links::create_link)
                .get(handlers::links::list_links)
                .delete(handlers::links::delete_link),
        )
        .route("/stats", get(handlers::links::stats))
        // Short-link redirect, must come LAST so fixed routes take priority
        .route("/:code", get(handlers::redirect::redirect))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
