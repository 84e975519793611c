// src/profile/routes.rs

use axum::{
    routing::{get, put},
    Router,
};

use super::handlers;

pub fn profile_routes() -> Router {
    Router::new()
        .route("/profile", get(handlers::profile_handler))
        .route("/admin/profile", put(handlers::update_profile_handler))
}
