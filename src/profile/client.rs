// src/profile/client.rs

use reqwest::{Client, Method};
use tracing::info;

use super::models::Profile;
use crate::services::remote::{decode_enveloped, ClientError, RemoteApi};

pub struct ProfileClient {
    api: RemoteApi,
}

impl ProfileClient {
    pub fn new(http: Client, api_base_url: &str) -> Self {
        Self {
            api: RemoteApi::new(http, api_base_url),
        }
    }

    pub async fn get(&self) -> Result<Profile, ClientError> {
        let value = self
            .api
            .send_json(self.api.request(Method::GET, "/api/profile", None))
            .await?;
        decode_enveloped(value, "profile")
    }

    /// Replaces the whole profile document; last write wins
    pub async fn replace(&self, profile: &Profile, token: &str) -> Result<Profile, ClientError> {
        let request = self
            .api
            .request(Method::PUT, "/api/profile", Some(token))
            .json(profile);

        let value = self.api.send_json(request).await?;
        let updated = if value.is_null() {
            profile.clone()
        } else {
            decode_enveloped(value, "profile")?
        };

        info!(name = %updated.name, "Profile replaced");
        Ok(updated)
    }
}
