// src/profile/validators.rs

use super::models::Profile;
use crate::common::validation::looks_like_email;
use crate::common::{ValidationResult, Validator};

pub struct ProfileValidator;

impl Validator<Profile> for ProfileValidator {
    fn validate(&self, data: &Profile) -> ValidationResult {
        let mut result = ValidationResult::new();

        if data.name.trim().is_empty() {
            result.add_error("name", "Name is required");
        }

        if !data.email.trim().is_empty() && !looks_like_email(&data.email) {
            result.add_error("email", "Invalid email format");
        }

        if data.bio.len() > 5000 {
            result.add_error("bio", "Bio must be less than 5000 characters");
        }

        for (platform, url) in &data.social {
            if !(url.starts_with("https://") || url.starts_with("http://")) {
                result.add_error(&format!("social.{}", platform), "Must be an http(s) URL");
            }
        }

        for (index, education) in data.education.iter().enumerate() {
            if education.institution.trim().is_empty() {
                result.add_error(
                    &format!("education[{}].institution", index),
                    "Institution is required",
                );
            }
        }

        for (index, experience) in data.experience.iter().enumerate() {
            if experience.organization.trim().is_empty() {
                result.add_error(
                    &format!("experience[{}].organization", index),
                    "Organization is required",
                );
            }
        }

        result
    }
}
