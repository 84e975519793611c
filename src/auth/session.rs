//! Session store backed by the `authToken` cookie and the `userEmail` local value
//!
//! The store never verifies token signatures: it decodes the payload segment
//! and trusts it. Callers that need a trust boundary verify separately (see
//! [`super::guard`]).

use axum::http::{header::SET_COOKIE, HeaderMap, HeaderValue};
use axum::response::{IntoResponse, Response};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use cookie::{time::Duration as CookieDuration, Cookie, SameSite};
use serde_json::Value;
use std::collections::HashMap;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::models::Session;
use crate::common::{safe_email_log, safe_token_log};

pub const AUTH_COOKIE: &str = "authToken";
pub const DISPLAY_KEY: &str = "userEmail";
pub const SESSION_MAX_AGE_DAYS: i64 = 7;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("token is not a decodable JWT")]
    Malformed,

    #[error("token payload has no user identifier")]
    MissingIdentifier,

    #[error("token expired")]
    Expired,
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("local storage unavailable")]
    Unavailable,
}

/// Where the session's credentials live between requests
pub trait CredentialStore {
    fn cookie(&self, name: &str) -> Option<String>;
    fn set_cookie(&mut self, cookie: Cookie<'static>);
    fn remove_cookie(&mut self, name: &str);

    fn local_item(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set_local_item(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove_local_item(&mut self, key: &str) -> Result<(), StorageError>;
}

/// Decodes the payload (middle) segment of a JWT without checking its signature
pub fn decode_payload(token: &str) -> Result<Value, SessionError> {
    let mut segments = token.trim().split('.');
    let payload = match (segments.next(), segments.next(), segments.next()) {
        (Some(_), Some(payload), Some(_)) if !payload.is_empty() => payload,
        _ => return Err(SessionError::Malformed),
    };

    // Tolerate padding and the standard alphabet
    let normalized: String = payload
        .trim_end_matches('=')
        .chars()
        .map(|c| match c {
            '+' => '-',
            '/' => '_',
            other => other,
        })
        .collect();

    let bytes = URL_SAFE_NO_PAD
        .decode(normalized.as_bytes())
        .map_err(|_| SessionError::Malformed)?;

    serde_json::from_slice::<Value>(&bytes).map_err(|_| SessionError::Malformed)
}

/// Decodes a token into a session, failing on a missing identifier
pub fn decode_session(token: &str) -> Result<Session, SessionError> {
    let payload = decode_payload(token)?;
    Session::from_payload(&payload).ok_or(SessionError::MissingIdentifier)
}

pub struct SessionStore<S: CredentialStore> {
    store: S,
    secure: bool,
}

impl<S: CredentialStore> SessionStore<S> {
    pub fn new(store: S, secure: bool) -> Self {
        Self { store, secure }
    }

    pub fn establish(&mut self, token: &str) -> Result<Session, SessionError> {
        self.establish_at(token, chrono::Utc::now().timestamp())
    }

    /// Decodes `token`, persists it and returns the session it describes
    pub fn establish_at(&mut self, token: &str, now: i64) -> Result<Session, SessionError> {
        let session = decode_session(token).map_err(|e| {
            warn!(error = %e, token = %safe_token_log(token), "Refusing to establish session");
            e
        })?;

        if session.is_expired_at(now) {
            warn!(user_id = %session.user_id, "Refusing to establish session from expired token");
            return Err(SessionError::Expired);
        }

        let cookie = Cookie::build((AUTH_COOKIE, token.trim().to_string()))
            .path("/")
            .max_age(CookieDuration::days(SESSION_MAX_AGE_DAYS))
            .same_site(SameSite::Lax)
            .secure(self.secure)
            .build();
        self.store.set_cookie(cookie);

        if let Err(e) = self.store.set_local_item(DISPLAY_KEY, session.display_value()) {
            debug!(error = %e, "Skipping display value persistence");
        }

        info!(
            user_id = %session.user_id,
            email = %safe_email_log(&session.email),
            is_admin = session.is_admin(),
            "Session established"
        );

        Ok(session)
    }

    pub fn current_session(&mut self) -> Option<Session> {
        self.current_session_at(chrono::Utc::now().timestamp())
    }

    /// Re-decodes the stored token. Expired or undecodable tokens clear all
    /// stored credentials.
    pub fn current_session_at(&mut self, now: i64) -> Option<Session> {
        let token = self.store.cookie(AUTH_COOKIE)?;

        match decode_session(&token) {
            Ok(session) if session.is_expired_at(now) => {
                info!(user_id = %session.user_id, "Session token expired, clearing credentials");
                self.clear();
                None
            }
            Ok(session) => Some(session),
            Err(e) => {
                warn!(error = %e, "Stored session token is unusable, clearing credentials");
                self.clear();
                None
            }
        }
    }

    /// Raw bearer token, for attaching to mutating remote calls
    pub fn token(&self) -> Option<String> {
        self.store.cookie(AUTH_COOKIE)
    }

    #[allow(dead_code)]
    pub fn display_value(&self) -> Option<String> {
        self.store.local_item(DISPLAY_KEY).ok().flatten()
    }

    pub fn clear(&mut self) {
        self.store.remove_cookie(AUTH_COOKIE);
        if let Err(e) = self.store.remove_local_item(DISPLAY_KEY) {
            debug!(error = %e, "Skipping display value removal");
        }
    }

    pub fn into_inner(self) -> S {
        self.store
    }
}

/// In-process credential store, with local storage that can be switched off
/// to mimic private browsing
#[allow(dead_code)]
#[derive(Debug, Default)]
pub struct MemoryCredentials {
    cookies: HashMap<String, Cookie<'static>>,
    local: Option<HashMap<String, String>>,
}

#[allow(dead_code)]
impl MemoryCredentials {
    pub fn new() -> Self {
        Self {
            cookies: HashMap::new(),
            local: Some(HashMap::new()),
        }
    }

    pub fn without_local_storage() -> Self {
        Self {
            cookies: HashMap::new(),
            local: None,
        }
    }

    pub fn cookie_attributes(&self, name: &str) -> Option<&Cookie<'static>> {
        self.cookies.get(name)
    }
}

impl CredentialStore for MemoryCredentials {
    fn cookie(&self, name: &str) -> Option<String> {
        self.cookies.get(name).map(|c| c.value().to_string())
    }

    fn set_cookie(&mut self, cookie: Cookie<'static>) {
        self.cookies.insert(cookie.name().to_string(), cookie);
    }

    fn remove_cookie(&mut self, name: &str) {
        self.cookies.remove(name);
    }

    fn local_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        let local = self.local.as_ref().ok_or(StorageError::Unavailable)?;
        Ok(local.get(key).cloned())
    }

    fn set_local_item(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let local = self.local.as_mut().ok_or(StorageError::Unavailable)?;
        local.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_local_item(&mut self, key: &str) -> Result<(), StorageError> {
        let local = self.local.as_mut().ok_or(StorageError::Unavailable)?;
        local.remove(key);
        Ok(())
    }
}

/// Credentials carried by one HTTP request. Cookie changes are queued and
/// written back as `Set-Cookie` headers; there is no local storage on the
/// server side.
#[derive(Debug, Default)]
pub struct RequestCredentials {
    cookies: HashMap<String, String>,
    pending: Vec<Cookie<'static>>,
}

impl RequestCredentials {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let cookies = headers
            .get_all(axum::http::header::COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(|raw| Cookie::split_parse(raw.to_string()))
            .filter_map(Result::ok)
            .map(|c| (c.name().to_string(), c.value().to_string()))
            .collect();

        Self {
            cookies,
            pending: Vec::new(),
        }
    }

    pub fn set_cookie_headers(&self) -> Vec<HeaderValue> {
        self.pending
            .iter()
            .filter_map(|c| HeaderValue::from_str(&c.to_string()).ok())
            .collect()
    }

    /// Attaches queued cookie changes to a response
    pub fn apply(&self, response: impl IntoResponse) -> Response {
        let mut response = response.into_response();
        for value in self.set_cookie_headers() {
            response.headers_mut().append(SET_COOKIE, value);
        }
        response
    }
}

impl CredentialStore for RequestCredentials {
    fn cookie(&self, name: &str) -> Option<String> {
        self.cookies.get(name).cloned().filter(|v| !v.is_empty())
    }

    fn set_cookie(&mut self, cookie: Cookie<'static>) {
        self.cookies
            .insert(cookie.name().to_string(), cookie.value().to_string());
        self.pending.push(cookie);
    }

    fn remove_cookie(&mut self, name: &str) {
        self.cookies.remove(name);
        let mut removal = Cookie::build((name.to_string(), "")).path("/").build();
        removal.make_removal();
        self.pending.push(removal);
    }

    fn local_item(&self, _key: &str) -> Result<Option<String>, StorageError> {
        Err(StorageError::Unavailable)
    }

    fn set_local_item(&mut self, _key: &str, _value: &str) -> Result<(), StorageError> {
        Err(StorageError::Unavailable)
    }

    fn remove_local_item(&mut self, _key: &str) -> Result<(), StorageError> {
        Err(StorageError::Unavailable)
    }
}
