// Application state shared across all modules

use reqwest::Client;
use std::sync::Arc;

use super::config::AppConfig;
use crate::auth::verifier::CredentialVerifier;
use crate::profile::client::ProfileClient;
use crate::projects::client::ProjectRepository;
use crate::services::mailer::ContactMailer;
use crate::services::uploader::AssetUploader;

/// Configuration, remote clients and services handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub verifier: Arc<CredentialVerifier>,
    pub projects: Arc<ProjectRepository>,
    pub profile: Arc<ProfileClient>,
    pub uploader: Arc<AssetUploader>,
    pub mailer: Arc<ContactMailer>,
}

impl AppState {
    pub fn new(config: AppConfig, http: Client, mailer: ContactMailer) -> Self {
        let verifier = CredentialVerifier::new(
            http.clone(),
            &config.api_base_url,
            config.bypass.clone(),
            config.jwt_secret.clone(),
        );
        let projects = ProjectRepository::new(http.clone(), &config.api_base_url);
        let profile = ProfileClient::new(http.clone(), &config.api_base_url);
        let uploader = AssetUploader::new(http, config.upload.clone());

        Self {
            config: Arc::new(config),
            verifier: Arc::new(verifier),
            projects: Arc::new(projects),
            profile: Arc::new(profile),
            uploader: Arc::new(uploader),
            mailer: Arc::new(mailer),
        }
    }
}
