// src/contact/validators.rs

use crate::common::validation::looks_like_email;
use crate::common::{ValidationResult, Validator};
use crate::services::mailer::ContactMessage;

const MAX_MESSAGE_LEN: usize = 5000;

pub struct ContactValidator;

impl Validator<ContactMessage> for ContactValidator {
    fn validate(&self, data: &ContactMessage) -> ValidationResult {
        let mut result = ValidationResult::new();

        if data.name.trim().is_empty() {
            result.add_error("name", "Name is required");
        } else if data.name.len() > 100 {
            result.add_error("name", "Name must be less than 100 characters");
        }

        if !looks_like_email(&data.email) {
            result.add_error("email", "Valid email is required");
        }

        if data.subject.trim().is_empty() {
            result.add_error("subject", "Subject is required");
        } else if data.subject.len() > 200 {
            result.add_error("subject", "Subject must be less than 200 characters");
        }

        if data.message.trim().is_empty() {
            result.add_error("message", "Message is required");
        } else if data.message.len() > MAX_MESSAGE_LEN {
            result.add_error("message", "Message must be less than 5000 characters");
        }

        result
    }
}
