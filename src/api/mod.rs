//! HTTP API
//!
//! TigerStyle: Handlers depend on the storage contract, never on a backend.
//!
//! | Method | Path                  | Handler                   |
//! |--------|-----------------------|---------------------------|
//! | POST   | `/api/students`       | [`students::create`]      |
//! | GET    | `/api/students`       | [`students::list`]        |
//! | PUT    | `/api/students`       | [`students::update`]      |
//! | GET    | `/api/students/{id}`  | [`students::get_by_id`]   |
//! | DELETE | `/api/students/{id}`  | [`students::delete_by_id`]|

pub mod error;
pub mod students;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use student_core::StudentStore;
use tower_http::trace::TraceLayer;

pub use error::{ApiError, ApiResult, ErrorResponse};

/// State shared by every handler.
#[derive(Clone)]
pub struct AppState {
    store: Arc<dyn StudentStore>,
}

impl AppState {
    /// Wrap a store.
    pub fn new(store: Arc<dyn StudentStore>) -> Self {
        Self { store }
    }
}

/// Build the router with every student route and request tracing.
pub fn router(store: Arc<dyn StudentStore>) -> Router {
    Router::new()
        .route(
            "/api/students",
            post(students::create)
                .get(students::list)
                .put(students::update),
        )
        .route(
            "/api/students/:id",
            get(students::get_by_id).delete(students::delete_by_id),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(AppState::new(store))
}
