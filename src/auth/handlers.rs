//! Authentication handlers

use axum::{
    extract::{Extension, Json},
    http::{HeaderMap, StatusCode},
    response::Response,
};
use std::sync::Arc;
use tracing::{info, warn};

use super::models::{LoginRequest, LoginResponse, Session};
use super::session::{RequestCredentials, SessionStore};
use crate::common::validation::looks_like_email;
use crate::common::{safe_email_log, ApiError, ApiOutcome, AppState};

/// POST /login
///
/// Verifies the credential pair, establishes the session and sets the
/// `authToken` cookie. Every verification failure reads the same to the caller.
pub async fn login_handler(
    Extension(state): Extension<Arc<AppState>>,
    headers: HeaderMap,
    Json(request): Json<LoginRequest>,
) -> Result<Response, ApiError> {
    if !looks_like_email(&request.email) {
        return Err(ApiError::BadRequest("Valid email is required".to_string()));
    }
    if request.password.is_empty() {
        return Err(ApiError::BadRequest("Password is required".to_string()));
    }

    let credentials = RequestCredentials::from_headers(&headers);
    let mut store = SessionStore::new(credentials, state.config.secure_cookies());

    let session = match state
        .verifier
        .verify(&request.email, &request.password)
        .await
    {
        Ok(token) => store.establish(&token).ok(),
        Err(_) => None,
    };

    let Some(session) = session else {
        warn!(email = %safe_email_log(&request.email), "Login failed");
        return Err(ApiError::Unauthorized("Authentication failed".to_string()));
    };

    info!(
        user_id = %session.user_id,
        is_admin = session.is_admin(),
        "Login succeeded"
    );

    let credentials = store.into_inner();
    Ok(credentials.apply(Json(ApiOutcome::ok(LoginResponse { session }))))
}

/// POST /logout - clears the session cookie
pub async fn logout_handler(
    Extension(state): Extension<Arc<AppState>>,
    headers: HeaderMap,
) -> Response {
    let credentials = RequestCredentials::from_headers(&headers);
    let mut store = SessionStore::new(credentials, state.config.secure_cookies());

    if let Some(session) = store.current_session() {
        info!(user_id = %session.user_id, "Signing out");
    }
    store.clear();

    let credentials = store.into_inner();
    credentials.apply(Json(ApiOutcome::ok(())))
}

/// GET /api/session - current session, if any
///
/// An expired cookie is cleared as part of answering.
pub async fn session_handler(
    Extension(state): Extension<Arc<AppState>>,
    headers: HeaderMap,
) -> Response {
    let credentials = RequestCredentials::from_headers(&headers);
    let mut store = SessionStore::new(credentials, state.config.secure_cookies());

    let session: Option<Session> = store.current_session();
    let credentials = store.into_inner();

    match session {
        Some(session) => credentials.apply(Json(ApiOutcome::ok(session))),
        None => credentials.apply((
            StatusCode::UNAUTHORIZED,
            Json(ApiOutcome::<Session>::failed("Not signed in")),
        )),
    }
}
