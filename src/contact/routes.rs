// src/contact/routes.rs

use axum::{routing::post, Router};

use super::handlers;

pub fn contact_routes() -> Router {
    Router::new().route("/contact", post(handlers::submit_contact_form))
}
