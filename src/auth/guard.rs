//! Route guard for the admin surface

use async_trait::async_trait;
use axum::{
    extract::{Extension, FromRequestParts},
    http::request::Parts,
    response::{IntoResponse, Redirect, Response},
};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

use super::models::Session;
use super::session::{CredentialStore, RequestCredentials, SessionStore};
use crate::common::{ApiError, AppState};

pub const LOGIN_PATH: &str = "/login";
pub const HOME_PATH: &str = "/";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardState {
    Loading,
    Unauthenticated,
    AuthenticatedNonAdmin,
    AuthenticatedAdmin,
}

impl GuardState {
    pub fn classify(session: Option<&Session>) -> Self {
        match session {
            None => GuardState::Unauthenticated,
            Some(s) if s.is_admin() => GuardState::AuthenticatedAdmin,
            Some(_) => GuardState::AuthenticatedNonAdmin,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum GuardDecision {
    /// Still loading; show a spinner.
    Pending,
    Render(Session),
    Redirect(&'static str),
}

/// Resolves whether protected content may render. Starts in `Loading` and
/// settles after one `resolve` against a session store.
#[derive(Debug)]
pub struct RouteGuard {
    state: GuardState,
    session: Option<Session>,
}

impl Default for RouteGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl RouteGuard {
    pub fn new() -> Self {
        Self {
            state: GuardState::Loading,
            session: None,
        }
    }

    pub fn state(&self) -> GuardState {
        self.state
    }

    pub fn resolve<S: CredentialStore>(&mut self, store: &mut SessionStore<S>) -> GuardDecision {
        self.resolve_at(store, chrono::Utc::now().timestamp())
    }

    pub fn resolve_at<S: CredentialStore>(
        &mut self,
        store: &mut SessionStore<S>,
        now: i64,
    ) -> GuardDecision {
        self.session = store.current_session_at(now);
        self.state = GuardState::classify(self.session.as_ref());
        self.decision()
    }

    pub fn decision(&self) -> GuardDecision {
        match (self.state, &self.session) {
            (GuardState::Loading, _) => GuardDecision::Pending,
            (GuardState::Unauthenticated, _) => GuardDecision::Redirect(LOGIN_PATH),
            (GuardState::AuthenticatedNonAdmin, _) => GuardDecision::Redirect(HOME_PATH),
            (GuardState::AuthenticatedAdmin, Some(session)) => {
                GuardDecision::Render(session.clone())
            }
            (GuardState::AuthenticatedAdmin, None) => GuardDecision::Redirect(LOGIN_PATH),
        }
    }
}

/// Checks the token signature when a verification secret is configured
pub fn verify_signature(token: &str, secret: &str) -> bool {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.required_spec_claims.clear();
    validation.validate_exp = false;

    match decode::<Value>(token, &DecodingKey::from_secret(secret.as_bytes()), &validation) {
        Ok(_) => true,
        Err(e) => {
            warn!(error = %e, "Token signature verification failed");
            false
        }
    }
}

/// Extractor for admin-only handlers
///
/// Rejects with a redirect to `/login` (no usable session) or `/` (signed in
/// without the admin role). Expired cookies are cleared on the way out.
#[derive(Debug)]
pub struct AdminSession {
    pub session: Session,
    pub token: String,
}

#[async_trait]
impl<S> FromRequestParts<S> for AdminSession
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Extension(app_state): Extension<Arc<AppState>> =
            Extension::from_request_parts(parts, state)
                .await
                .map_err(|_| {
                    ApiError::InternalServer("missing app state".to_string()).into_response()
                })?;

        let credentials = RequestCredentials::from_headers(&parts.headers);
        let mut store = SessionStore::new(credentials, app_state.config.secure_cookies());
        let mut guard = RouteGuard::new();

        let target = match guard.resolve(&mut store) {
            GuardDecision::Render(session) => match store.token() {
                Some(token) => {
                    let trusted = match &app_state.config.token_verify_secret {
                        Some(secret) => verify_signature(&token, secret),
                        None => true,
                    };

                    if trusted {
                        debug!(user_id = %session.user_id, path = %parts.uri.path(), "Admin access granted");
                        return Ok(AdminSession { session, token });
                    }

                    store.clear();
                    LOGIN_PATH
                }
                None => LOGIN_PATH,
            },
            GuardDecision::Redirect(target) => target,
            GuardDecision::Pending => LOGIN_PATH,
        };

        warn!(path = %parts.uri.path(), redirect = target, state = ?guard.state(), "Admin route guard redirecting");

        let credentials = store.into_inner();
        Err(credentials.apply(Redirect::to(target)))
    }
}
