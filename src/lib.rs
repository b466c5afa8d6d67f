//! A small service collecting waiting list sign-ups.
//!
//! `POST /submit` validates a `{ "email", "name" }` payload and stores it unless the email is
//! already on the list. `GET /` is a liveness probe.

pub mod app;
pub mod config;
pub mod database;
mod error;
pub mod model;
pub mod web;

pub use app::{App, AppState};
pub use error::{Error, Result};
pub use web::serve;

use tracing_subscriber::{fmt::format::FmtSpan, EnvFilter};

// ###################################
// ->   TRACING
// ###################################
const DEFAULT_LOG_FILTER: &str = "waitlist=debug,tower_http=info,info";

/// Compact, timeless output with span-close events. Respects `RUST_LOG`.
pub fn init_dbg_tracing() {
    tracing_subscriber::fmt()
        .without_time()
        .with_span_events(FmtSpan::CLOSE)
        .with_target(false)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .compact()
        .init();
}

pub fn init_production_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
}
