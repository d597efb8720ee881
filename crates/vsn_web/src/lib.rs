use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod handlers;
pub mod state;

pub use state::AppState;

/// `GET /` status and `POST /generate-sql`.
pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::status))
        .route("/generate-sql", post(handlers::generate_sql))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(Arc::new(state))
}

pub mod prelude {
    pub use crate::handlers::{QueryRequest, SqlResponse, StatusResponse};
    pub use crate::{create_app, AppState};
    pub use vsn_core::{Error, Result};
}
