use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(handlers::health::health))
        .route("/api/chat", post(handlers::chat::chat))
        .route(
            "/api/availability",
            get(handlers::calendar::get_availability),
        )
        .route("/api/book", post(handlers::calendar::book_meeting))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
