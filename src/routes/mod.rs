//! Router assembly: public and guarded API routes, static files, CORS, and
//! HTTP tracing.

use std::sync::Arc;

use axum::{
    http::{header, HeaderValue, Method},
    middleware,
    routing::{get, post, put},
    Router,
};
use tower_http::{
    cors::CorsLayer,
    services::{ServeDir, ServeFile},
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::config::AppConfig;
use crate::error::ConfigError;
use crate::state::AppState;

pub mod guard;
pub mod http;

/// Build the application router with:
/// - public routes: version, health, catalogue, create/login/logout
/// - `/api/ipa/:id/...` behind the project token guard
/// - static SPA from `cfg.static_dir` with index fallback
/// - CORS for the single configured origin, with credentials (cookie auth)
/// - HTTP trace layer (per-request spans w/ method, path, status, latency)
pub fn build_router(state: Arc<AppState>, cfg: &AppConfig) -> Result<Router, ConfigError> {
    let origin: HeaderValue = cfg
        .allowed_origin
        .parse()
        .map_err(|_| ConfigError::InvalidValue {
            field: "ALLOWED_ORIGIN",
            value: cfg.allowed_origin.clone(),
        })?;

    let static_service = ServeDir::new(&cfg.static_dir)
        .append_index_html_on_directories(true)
        .not_found_service(ServeFile::new(cfg.static_dir.join("index.html")));

    let guarded = Router::new()
        .route("/api/ipa/:id", get(http::http_get_project))
        .route(
            "/api/ipa/:id/criteria",
            get(http::http_get_project_criteria).post(http::http_post_criterion),
        )
        .route(
            "/api/ipa/:id/criteria/:criteria_id",
            put(http::http_put_criterion).delete(http::http_delete_criterion),
        )
        .route(
            "/api/ipa/:id/person-data",
            get(http::http_get_person_data).put(http::http_put_person_data),
        )
        .route("/api/ipa/:id/grade", get(http::http_get_grade))
        .route_layer(middleware::from_fn_with_state(state.clone(), guard::require_project_token));

    let router = Router::new()
        .route("/version", get(http::http_version))
        .route("/api/health", get(http::http_health))
        .route("/api/criteria", get(http::http_get_catalogue))
        .route("/api/ipa", post(http::http_post_project))
        .route("/api/ipa/login", post(http::http_post_login))
        .route("/api/ipa/logout", post(http::http_post_logout))
        .merge(guarded)
        .with_state(state)
        .layer(
            CorsLayer::new()
                .allow_origin(origin)
                .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
                .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
                .allow_credentials(true),
        )
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        // Frontend fallback
        .fallback_service(static_service);
    Ok(router)
}
