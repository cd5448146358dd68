//! CoachLens · Study Coach Backend
//!
//! - Axum HTTP + WebSocket API
//! - Hybrid AI routing (on-device probe, cloud proxy, heuristic fallback)
//! - Content analysis and quiz synthesis for captured page text
//!
//! Important env variables:
//!   PORT              : u16 (default 8787)
//!   GEMINI_PROXY_URL  : cloud proxy endpoint, default "http://localhost:8787/gemini"
//!   COACH_CONFIG_PATH : path to TOML config (prompt overrides)
//!   LOG_LEVEL         : tracing filter, e.g. "debug" or full directives
//!   LOG_FORMAT        : "pretty" (default) or "json"

mod telemetry;
mod util;
mod domain;
mod config;
mod analysis;
mod quizgen;
mod grader;
mod validator;
mod gemini;
mod ondevice;
mod router;
mod storage;
mod library;
mod state;
mod protocol;
mod routes;

use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tracing::{info, instrument};

use crate::routes::build_router;
use crate::state::AppState;

#[instrument(level = "info", skip_all)]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  telemetry::init_tracing();

  // Build shared application state (library store, AI clients, prompts).
  let state = Arc::new(AppState::new());

  // Build the HTTP router with routes, CORS and tracing layers.
  let app = build_router(state.clone());

  // Read port from env or default to 8787.
  let addr: SocketAddr = std::env::var("PORT")
    .ok()
    .and_then(|p| p.parse::<u16>().ok())
    .map(|port| SocketAddr::from(([0, 0, 0, 0], port)))
    .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 8787)));

  let listener = TcpListener::bind(addr).await?;
  info!(target: "coachlens_backend", %addr, "HTTP server listening");
  axum::serve(listener, app).await?;
  Ok(())
}
