// src/services/remote.rs
//! Thin JSON client for the remote content API

use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, error, warn};

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Remote API unreachable: {0}")]
    Network(#[from] reqwest::Error),

    /// 4xx and 5xx are reported alike
    #[error("Remote API returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Malformed response from remote API: {0}")]
    Decode(String),

    #[error("Project \"{title}\" has no external id; it cannot be deleted until the backend assigns one")]
    MissingExternalId { title: String },
}

impl ClientError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[derive(Clone)]
pub struct RemoteApi {
    http: Client,
    base_url: String,
}

impl RemoteApi {
    pub fn new(http: Client, base_url: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Builds a request, attaching the bearer token when one is given
    pub fn request(&self, method: Method, path: &str, token: Option<&str>) -> RequestBuilder {
        let builder = self.http.request(method, self.url(path));
        match token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Sends the request and decodes a JSON body, failing on non-2xx
    pub async fn send_json(&self, request: RequestBuilder) -> Result<Value, ClientError> {
        let response = self.send(request).await?;

        let bytes = response.bytes().await?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Value::Null);
        }

        serde_json::from_slice::<Value>(&bytes).map_err(|e| {
            error!(error = %e, "Remote API returned a body that is not JSON");
            ClientError::Decode(e.to_string())
        })
    }

    pub async fn send(&self, request: RequestBuilder) -> Result<Response, ClientError> {
        let response = request.send().await.map_err(|e| {
            error!(error = %e, "Remote API request failed");
            ClientError::Network(e)
        })?;

        let status = response.status();
        debug!(http_status = %status, url = %response.url(), "Remote API responded");

        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<Value>(&body)
            .ok()
            .and_then(|v| {
                ["message", "error"]
                    .iter()
                    .find_map(|key| v.get(*key).and_then(Value::as_str).map(str::to_string))
            })
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("error").to_string());

        warn!(http_status = %status, message = %message, "Remote API rejected request");

        Err(ClientError::Status {
            status: status.as_u16(),
            message,
        })
    }
}

/// Decodes `value`, looking through a `{key: ..}` or `{data: ..}` envelope first
pub fn decode_enveloped<T: DeserializeOwned>(value: Value, key: &str) -> Result<T, ClientError> {
    let inner = match value {
        Value::Object(mut map) if map.contains_key(key) => map.remove(key).unwrap_or(Value::Null),
        Value::Object(mut map) if map.contains_key("data") => {
            let data = map.remove("data").unwrap_or(Value::Null);
            match data {
                Value::Object(mut nested) if nested.contains_key(key) => {
                    nested.remove(key).unwrap_or(Value::Null)
                }
                other => other,
            }
        }
        other => other,
    };

    serde_json::from_value(inner).map_err(|e| ClientError::Decode(e.to_string()))
}
