// src/projects/validators.rs

use super::models::ProjectInput;
use crate::common::{ValidationResult, Validator};

// ============================================================================
// Project Validators
// ============================================================================

pub struct ProjectValidator;

impl Validator<ProjectInput> for ProjectValidator {
    fn validate(&self, data: &ProjectInput) -> ValidationResult {
        let mut result = ValidationResult::new();

        if data.title.trim().is_empty() {
            result.add_error("title", "Project title is required");
        } else if data.title.len() > 200 {
            result.add_error("title", "Project title must be less than 200 characters");
        }

        if data.slug.is_empty() {
            result.add_error("slug", "Slug must contain at least one letter or digit");
        }

        if let Some(short) = &data.short_description {
            if short.len() > 300 {
                result.add_error(
                    "shortDescription",
                    "Short description must be less than 300 characters",
                );
            }
        }

        for (field, url) in [("githubUrl", &data.github_url), ("liveUrl", &data.live_url)] {
            if let Some(url) = url {
                if !is_http_url(url) {
                    result.add_error(field, "Must be an http(s) URL");
                }
            }
        }

        if data.images.iter().any(|url| !is_http_url(url)) {
            result.add_error("images", "Image URLs must be http(s) URLs");
        }

        result
    }
}

fn is_http_url(url: &str) -> bool {
    let url = url.trim();
    (url.starts_with("https://") || url.starts_with("http://")) && !url.contains(char::is_whitespace)
}
