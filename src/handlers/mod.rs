mod health;
mod metrics;
mod contact;
mod github;

pub use health::health_handler;
pub use metrics::metrics_handler;
pub use contact::{cleanup_handler, contact_handler};
pub use github::{clear_cache_handler, github_handler};

use axum::{Router, routing::{get, post}};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use crate::state::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .route("/api/contact", post(contact_handler).get(cleanup_handler))
        .route("/api/github", get(github_handler).delete(clear_cache_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
