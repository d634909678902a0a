//! REST API for users and fence queries
//!
//! GET  /api/health              liveness
//! POST /api/v1/users/create     create a user from `{name, lat, lng}`
//! GET  /api/v1/users/           users inside the built-in fence
//! POST /api/v1/users/within     users inside a fence given in the body

pub mod response;
pub mod user_routes;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::services::FenceQueryService;
use crate::store::UserStore;

pub use response::{ApiError, ApiResponse};

/// Shared state for every route; built once per process
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserStore>,
    pub fences: Arc<FenceQueryService>,
}

impl AppState {
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self {
            fences: Arc::new(FenceQueryService::new(Arc::clone(&store))),
            users: store,
        }
    }
}

/// Build the full axum router with all routes and middleware
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(user_routes::health_check))
        .route("/api/v1/users/", get(user_routes::list_users_in_default_fence))
        .route("/api/v1/users/create", post(user_routes::create_user))
        .route("/api/v1/users/within", post(user_routes::list_users_within_fence))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(
                    CorsLayer::new()
                        .allow_origin(Any)
                        .allow_methods(Any)
                        .allow_headers(Any),
                ),
        )
        .with_state(state)
}
