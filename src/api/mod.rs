//! HTTP layer: router, shared state and JSON handlers.
//!
//! All routes live under `/api`. Handlers only parse input and shape responses; the
//! work happens in [`crate::core`].

use crate::{config::AppConfig, core::locks::UserLocks};
use axum::{
    Router,
    routing::{get, post},
};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub mod extract;
pub mod handlers;
pub mod input;
pub mod response;

/// State shared by every handler.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Connection pool
    pub db: DatabaseConnection,
    /// Per-user locks around totals recalculation
    pub locks: UserLocks,
    /// Loaded configuration
    pub config: Arc<AppConfig>,
}

impl AppState {
    /// Wraps a connection and configuration with a fresh lock table.
    #[must_use]
    pub fn new(db: DatabaseConnection, config: AppConfig) -> Self {
        Self {
            db,
            locks: UserLocks::new(),
            config: Arc::new(config),
        }
    }
}

/// Builds the application router.
pub fn router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/", get(handlers::status))
        .route("/users", get(handlers::users::list))
        .route("/users/register", post(handlers::users::register))
        .route("/users/login", post(handlers::users::login))
        .route(
            "/users/{user_id}",
            get(handlers::users::get).delete(handlers::users::delete),
        )
        .route(
            "/energy/{user_id}",
            get(handlers::energy::overview).put(handlers::energy::set_baseline),
        )
        .route("/consumption", post(handlers::consumption::register))
        .route("/consumption/{user_id}", get(handlers::consumption::history))
        .route("/calculator", post(handlers::calculator::estimate));

    Router::new()
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
