// src/services/uploader.rs
//! Image uploads to Cloudinary using an unsigned upload preset

use bytes::Bytes;
use futures::future::try_join_all;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::common::config::UploadConfig;

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("Image uploads are not configured")]
    NotConfigured,

    #[error("{file_name} is not a supported image type")]
    UnsupportedType { file_name: String },

    #[error("Upload of {file_name} failed: {source}")]
    Network {
        file_name: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Upload of {file_name} was rejected with status {status}")]
    Rejected { file_name: String, status: u16 },

    #[error("Upload of {file_name} returned no secure_url")]
    MissingUrl { file_name: String },
}

/// A file picked on the client, held in memory until it is uploaded
#[derive(Debug, Clone)]
pub struct LocalFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

impl LocalFile {
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: None,
            bytes: bytes.into(),
        }
    }

    /// MIME type sniffed from content, falling back to the extension for SVG
    pub fn image_mime(&self) -> Option<&'static str> {
        let sniffed = infer::Infer::new()
            .get(&self.bytes)
            .map(|kind| kind.mime_type())
            .filter(|mime| {
                matches!(
                    *mime,
                    "image/png" | "image/jpeg" | "image/gif" | "image/webp"
                )
            });

        sniffed.or_else(|| {
            let is_svg = self.file_name.to_ascii_lowercase().ends_with(".svg")
                && String::from_utf8_lossy(&self.bytes).contains("<svg");
            is_svg.then_some("image/svg+xml")
        })
    }
}

#[derive(Deserialize)]
struct UploadResponse {
    secure_url: Option<String>,
}

pub struct AssetUploader {
    http: Client,
    config: Option<UploadConfig>,
}

impl AssetUploader {
    pub fn new(http: Client, config: Option<UploadConfig>) -> Self {
        Self { http, config }
    }

    pub fn is_configured(&self) -> bool {
        self.config.is_some()
    }

    fn endpoint(config: &UploadConfig) -> String {
        format!(
            "{}/v1_1/{}/image/upload",
            config.api_base.trim_end_matches('/'),
            config.cloud_name
        )
    }

    /// Uploads one file and returns its public URL
    pub async fn upload(&self, file: &LocalFile) -> Result<String, UploadError> {
        let config = self.config.as_ref().ok_or(UploadError::NotConfigured)?;

        let mime = file.image_mime().ok_or_else(|| {
            warn!(file_name = %file.file_name, "Rejecting upload of non-image file");
            UploadError::UnsupportedType {
                file_name: file.file_name.clone(),
            }
        })?;

        let part = Part::bytes(file.bytes.to_vec())
            .file_name(file.file_name.clone())
            .mime_str(file.content_type.as_deref().unwrap_or(mime))
            .map_err(|source| UploadError::Network {
                file_name: file.file_name.clone(),
                source,
            })?;

        let form = Form::new()
            .part("file", part)
            .text("upload_preset", config.upload_preset.clone());

        debug!(file_name = %file.file_name, size = file.bytes.len(), "Uploading image");

        let response = self
            .http
            .post(Self::endpoint(config))
            .multipart(form)
            .send()
            .await
            .map_err(|source| {
                error!(error = %source, file_name = %file.file_name, "Image upload request failed");
                UploadError::Network {
                    file_name: file.file_name.clone(),
                    source,
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            error!(http_status = %status, file_name = %file.file_name, "Image host rejected upload");
            return Err(UploadError::Rejected {
                file_name: file.file_name.clone(),
                status: status.as_u16(),
            });
        }

        let body: UploadResponse = response.json().await.map_err(|source| UploadError::Network {
            file_name: file.file_name.clone(),
            source,
        })?;

        let url = body
            .secure_url
            .filter(|url| !url.is_empty())
            .ok_or_else(|| UploadError::MissingUrl {
                file_name: file.file_name.clone(),
            })?;

        info!(file_name = %file.file_name, url = %url, "Image uploaded");
        Ok(url)
    }

    /// Uploads a batch concurrently. Any failure fails the whole batch; blobs
    /// already stored by the host stay there.
    pub async fn upload_many(&self, files: &[LocalFile]) -> Result<Vec<String>, UploadError> {
        if files.is_empty() {
            return Ok(Vec::new());
        }

        let urls = try_join_all(files.iter().map(|file| self.upload(file)))
            .await
            .map_err(|e| {
                warn!(
                    error = %e,
                    batch_size = files.len(),
                    "Image batch aborted, earlier uploads in this batch may be orphaned"
                );
                e
            })?;

        info!(count = urls.len(), "Image batch uploaded");
        Ok(urls)
    }
}
