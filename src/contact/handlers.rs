// src/contact/handlers.rs
//! Contact form handler

use axum::{extract::Extension, Json};
use std::sync::Arc;
use tracing::info;

use super::validators::ContactValidator;
use crate::common::{safe_email_log, ApiError, ApiOutcome, AppState, Validator};
use crate::services::mailer::ContactMessage;

pub const THANK_YOU: &str = "Thank you for your message! I'll get back to you soon.";

/// POST /contact - acknowledges immediately; delivery happens in the background
pub async fn submit_contact_form(
    Extension(state): Extension<Arc<AppState>>,
    Json(request): Json<ContactMessage>,
) -> Result<Json<ApiOutcome<String>>, ApiError> {
    let validation = ContactValidator.validate(&request);
    if !validation.is_valid {
        return Err(ApiError::from(validation));
    }

    let message = ContactMessage {
        name: request.name.trim().to_string(),
        email: request.email.trim().to_string(),
        subject: request.subject.trim().to_string(),
        message: request.message.trim().to_string(),
    };

    info!(
        from_email = %safe_email_log(&message.email),
        subject = %message.subject,
        "Contact form submitted"
    );

    state.mailer.dispatch(message);

    Ok(Json(ApiOutcome::ok(THANK_YOU.to_string())))
}
