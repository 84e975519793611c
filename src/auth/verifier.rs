//! Credential verification against the remote login endpoint

use chrono::{Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use reqwest::Client;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{debug, error, info, warn};

use super::models::Claims;
use super::session::SESSION_MAX_AGE_DAYS;
use crate::common::config::BypassCredential;
use crate::common::safe_email_log;

/// Every failure mode collapses into one variant; the detail is only logged.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Authentication failed")]
    AuthenticationFailed,
}

pub struct CredentialVerifier {
    http: Client,
    login_url: String,
    bypass: Option<BypassCredential>,
    jwt_secret: String,
}

impl CredentialVerifier {
    pub fn new(
        http: Client,
        api_base_url: &str,
        bypass: Option<BypassCredential>,
        jwt_secret: String,
    ) -> Self {
        Self {
            http,
            login_url: format!("{}/api/auth/login", api_base_url.trim_end_matches('/')),
            bypass,
            jwt_secret,
        }
    }

    /// Returns an opaque bearer token for a valid email/password pair
    pub async fn verify(&self, email: &str, password: &str) -> Result<String, AuthError> {
        if let Some(bypass) = &self.bypass {
            if bypass.matches(email, password) {
                info!(email = %safe_email_log(email), "Bypass credential accepted");
                return self.mint_admin_token(&bypass.email);
            }
        }

        debug!(email = %safe_email_log(email), url = %self.login_url, "Posting credentials to login endpoint");

        let response = self
            .http
            .post(&self.login_url)
            .json(&json!({ "email": email.trim(), "password": password }))
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, url = %self.login_url, "Login endpoint unreachable");
                AuthError::AuthenticationFailed
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!(
                http_status = %status,
                email = %safe_email_log(email),
                "Login endpoint rejected credentials"
            );
            return Err(AuthError::AuthenticationFailed);
        }

        let body = response.json::<Value>().await.map_err(|e| {
            error!(error = %e, "Login endpoint returned an undecodable body");
            AuthError::AuthenticationFailed
        })?;

        let token = body
            .get("token")
            .or_else(|| body.get("data").and_then(|data| data.get("token")))
            .and_then(Value::as_str)
            .filter(|token| !token.is_empty())
            .map(str::to_string);

        match token {
            Some(token) => {
                info!(email = %safe_email_log(email), "Remote login succeeded");
                Ok(token)
            }
            None => {
                warn!("Login response did not contain a token");
                Err(AuthError::AuthenticationFailed)
            }
        }
    }

    fn mint_admin_token(&self, email: &str) -> Result<String, AuthError> {
        let exp = (Utc::now() + Duration::days(SESSION_MAX_AGE_DAYS)).timestamp() as usize;
        let claims = Claims {
            sub: "admin".to_string(),
            email: email.to_string(),
            name: "Administrator".to_string(),
            role: "admin".to_string(),
            exp,
        };

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )
        .map_err(|e| {
            error!(error = %e, "Failed to mint bypass token");
            AuthError::AuthenticationFailed
        })
    }
}
