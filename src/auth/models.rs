//! Authentication data models

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Claims minted for the bypass credential and checked when signature
/// verification is enabled
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Claims {
    pub sub: String,
    pub email: String,
    pub name: String,
    pub role: String,
    pub exp: usize,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    #[serde(other)]
    User,
}

impl Role {
    fn parse(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("admin") {
            Role::Admin
        } else {
            Role::User
        }
    }
}

/// Identity decoded from the bearer token payload
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub user_id: String,
    pub email: String,
    pub display_name: String,
    pub role: Role,
    /// `exp` claim in epoch seconds, absent when the token never expires
    pub token_expiry: Option<i64>,
}

impl Session {
    /// Builds a session from a decoded token payload. Returns `None` when the
    /// payload carries no usable identifier.
    pub fn from_payload(payload: &Value) -> Option<Self> {
        let user_id = ["sub", "userId", "id", "_id"]
            .iter()
            .find_map(|key| identifier(payload.get(*key)?))?;

        let email = payload
            .get("email")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        let display_name = ["name", "displayName", "username"]
            .iter()
            .find_map(|key| payload.get(*key).and_then(Value::as_str))
            .map(str::to_string)
            .unwrap_or_else(|| email.clone());

        let role = payload
            .get("role")
            .and_then(Value::as_str)
            .map(Role::parse)
            .unwrap_or(Role::User);

        let token_expiry = payload.get("exp").and_then(|exp| {
            exp.as_i64()
                .or_else(|| exp.as_f64().map(|secs| secs as i64))
        });

        Some(Self {
            user_id,
            email,
            display_name,
            role,
            token_expiry,
        })
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn is_expired_at(&self, now: i64) -> bool {
        matches!(self.token_expiry, Some(exp) if exp < now)
    }

    /// Value kept under the local `userEmail` key
    pub fn display_value(&self) -> &str {
        if self.email.is_empty() {
            &self.display_name
        } else {
            &self.email
        }
    }
}

fn identifier(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[derive(Deserialize, Debug)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize, Debug)]
pub struct LoginResponse {
    pub session: Session,
}
