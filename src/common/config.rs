//! Environment configuration for the site backend

use std::env;
use std::time::Duration;

use tracing::{info, warn};

use super::helpers::safe_email_log;

const DEFAULT_API_BASE_URL: &str = "http://localhost:5000";
const DEFAULT_CLOUDINARY_API_BASE: &str = "https://api.cloudinary.com";

/// Largest request body accepted on routes that take image files
pub const MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

/// Fallback credential that skips the remote login endpoint.
#[derive(Debug, Clone)]
pub struct BypassCredential {
    pub email: String,
    pub password: String,
}

impl BypassCredential {
    pub fn matches(&self, email: &str, password: &str) -> bool {
        self.email.eq_ignore_ascii_case(email.trim()) && self.password == password
    }
}

#[derive(Debug, Clone)]
pub struct UploadConfig {
    pub api_base: String,
    pub cloud_name: String,
    pub upload_preset: String,
}

#[derive(Debug, Clone)]
pub struct MailConfig {
    pub region: Option<String>,
    pub from_email: String,
    pub to_email: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub api_base_url: String,
    pub site_public_url: String,
    pub bypass: Option<BypassCredential>,
    pub jwt_secret: String,
    pub token_verify_secret: Option<String>,
    pub upload: Option<UploadConfig>,
    pub mail: Option<MailConfig>,
    pub cors_origins: Vec<String>,
    pub http_timeout: Option<Duration>,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let port = env::var("PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(8080);

        let api_base_url = env::var("API_BASE_URL")
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or_else(|_| DEFAULT_API_BASE_URL.to_string());

        let site_public_url =
            env::var("SITE_PUBLIC_URL").unwrap_or_else(|_| format!("http://localhost:{}", port));

        let bypass = match (env::var("BYPASS_EMAIL"), env::var("BYPASS_PASSWORD")) {
            (Ok(email), Ok(password)) if !email.trim().is_empty() && !password.is_empty() => {
                Some(BypassCredential {
                    email: email.trim().to_lowercase(),
                    password,
                })
            }
            _ => None,
        };

        let jwt_secret =
            env::var("JWT_SECRET").unwrap_or_else(|_| "replace_with_strong_secret".to_string());

        let token_verify_secret = env::var("TOKEN_VERIFY_SECRET")
            .ok()
            .filter(|s| !s.is_empty());

        let upload = match (
            env::var("CLOUDINARY_CLOUD_NAME"),
            env::var("CLOUDINARY_UPLOAD_PRESET"),
        ) {
            (Ok(cloud_name), Ok(upload_preset)) => Some(UploadConfig {
                api_base: env::var("CLOUDINARY_API_BASE")
                    .map(|url| url.trim_end_matches('/').to_string())
                    .unwrap_or_else(|_| DEFAULT_CLOUDINARY_API_BASE.to_string()),
                cloud_name,
                upload_preset,
            }),
            _ => None,
        };

        let mail = match (env::var("CONTACT_FROM_EMAIL"), env::var("CONTACT_TO_EMAIL")) {
            (Ok(from_email), Ok(to_email)) => Some(MailConfig {
                region: env::var("AWS_REGION").ok(),
                from_email,
                to_email,
            }),
            _ => None,
        };

        let cors_origins = env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:3000,http://localhost:5173".to_string())
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect();

        let http_timeout = env::var("HTTP_TIMEOUT_SECS")
            .ok()
            .and_then(|secs| secs.parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs);

        Self {
            port,
            api_base_url,
            site_public_url,
            bypass,
            jwt_secret,
            token_verify_secret,
            upload,
            mail,
            cors_origins,
            http_timeout,
        }
    }

    /// Cookies get the `Secure` attribute only when the site is served over HTTPS.
    pub fn secure_cookies(&self) -> bool {
        self.site_public_url.starts_with("https://")
    }

    pub fn log_summary(&self) {
        info!(
            api_base_url = %self.api_base_url,
            site_public_url = %self.site_public_url,
            secure_cookies = self.secure_cookies(),
            "Portfolio backend configuration loaded"
        );

        match &self.bypass {
            Some(bypass) => warn!(
                email = %safe_email_log(&bypass.email),
                "Bypass credential enabled for admin login"
            ),
            None => info!("Bypass credential disabled"),
        }

        if self.upload.is_none() {
            warn!("Cloudinary not configured, project image uploads will fail");
        }
        if self.mail.is_none() {
            warn!("Contact mail not configured, submissions will only be logged");
        }
        if self.token_verify_secret.is_some() {
            info!("Admin routes verify token signatures");
        }
    }
}
