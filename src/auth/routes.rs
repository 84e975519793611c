//! Authentication routes

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers;

/// Creates and returns the authentication router
///
/// # Routes
/// - `POST /login` - Credential login, sets the `authToken` cookie
/// - `POST /logout` - Clears the session cookie
/// - `GET /api/session` - Current session information
pub fn auth_routes() -> Router {
    Router::new()
        .route("/login", post(handlers::login_handler))
        .route("/logout", post(handlers::logout_handler))
        .route("/api/session", get(handlers::session_handler))
}
