//! IPA criteria catalogue backend
//!
//! - Axum HTTP API for documenting an IPA project against the criteria
//!   catalogue and computing its grade
//! - In-memory project store with signed-cookie / bearer token auth
//! - Static SPA fallback (STATIC_DIR/index.html)
//!
//! Important env variables:
//!   PORT                : u16 (default 8080)
//!   CRITERIA_FILE_PATH  : criteria catalogue JSON (default ./criteria.json)
//!   TOKEN_SECRET        : HMAC secret for session tokens
//!   SECURE_COOKIE       : "true" to mark the auth cookie Secure
//!   ALLOWED_ORIGIN      : CORS origin (default http://localhost:5173)
//!   STATIC_DIR          : frontend bundle (default ./static)
//!   IPA_CONFIG_PATH     : optional TOML file with the same settings
//!   LOG_LEVEL           : tracing filter, e.g. "debug" or full directives
//!   LOG_FORMAT          : "pretty" (default) or "json"

mod auth;
mod catalogue;
mod classify;
mod config;
mod domain;
mod error;
mod grade;
mod logic;
mod project_id;
mod protocol;
mod routes;
mod state;
mod telemetry;

use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tracing::info;

use crate::catalogue::Catalogue;
use crate::config::AppConfig;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  telemetry::init_tracing();
  info!(target: "ipa_backend", version = env!("CARGO_PKG_VERSION"), "starting");

  let cfg = AppConfig::load()?;

  // A broken catalogue must stop startup: grades would be undefined.
  let catalogue = Catalogue::load(&cfg.criteria_file_path)?;

  let state = Arc::new(AppState::new(&cfg, catalogue));
  let app = build_router(state, &cfg)?;

  let addr = SocketAddr::from(([0, 0, 0, 0], cfg.port));
  let listener = TcpListener::bind(addr).await?;
  info!(target: "ipa_backend", %addr, "HTTP server listening");
  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await?;
  Ok(())
}

async fn shutdown_signal() {
  if let Err(e) = tokio::signal::ctrl_c().await {
    tracing::error!(target: "ipa_backend", error = %e, "cannot listen for ctrl-c");
    std::future::pending::<()>().await;
  }
  info!(target: "ipa_backend", "shutdown requested");
}
