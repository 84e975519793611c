//! Tests for contact module

#[cfg(test)]
mod tests {
    use super::super::*;
    use crate::common::{AppConfig, AppState, Validator};
    use crate::services::mailer::{ContactMailer, ContactMessage};
    use axum::{body::Body, http::Request, http::StatusCode, Extension, Router};
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::ServiceExt;
    use validators::ContactValidator;

    fn message() -> ContactMessage {
        ContactMessage {
            name: "Grace Hopper".to_string(),
            email: "grace@example.com".to_string(),
            subject: "Collaboration".to_string(),
            message: "Would you like to work on a cohort study together?".to_string(),
        }
    }

    fn app() -> Router {
        let mut config = AppConfig::from_env();
        config.api_base_url = "http://127.0.0.1:1".to_string();
        let state = AppState::new(config, reqwest::Client::new(), ContactMailer::disabled());

        contact_routes().layer(Extension(Arc::new(state)))
    }

    async fn post_contact(body: Value) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri("/contact")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();

        let response = app().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[test]
    fn test_contact_validation() {
        assert!(ContactValidator.validate(&message()).is_valid);

        let mut bad = message();
        bad.name = " ".to_string();
        bad.email = "grace@localhost".to_string();
        bad.message = "x".repeat(5001);

        let result = ContactValidator.validate(&bad);
        assert!(result.has_error("name"));
        assert!(result.has_error("email"));
        assert!(result.has_error("message"));
        assert!(!result.has_error("subject"));
    }

    #[tokio::test]
    async fn test_submission_is_acknowledged_without_waiting_on_delivery() {
        let (status, body) = post_contact(serde_json::to_value(message()).unwrap()).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["data"], handlers::THANK_YOU);
    }

    #[tokio::test]
    async fn test_invalid_submission_is_rejected() {
        let (status, body) = post_contact(json!({
            "name": "Grace",
            "email": "not-an-email",
            "subject": "",
            "message": "Hi"
        }))
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        let error = body["error"].as_str().unwrap();
        assert!(error.contains("email"));
        assert!(error.contains("subject"));
    }

    #[tokio::test]
    async fn test_non_ascii_email_is_logged_safely() {
        let subscriber = tracing_subscriber::fmt().with_test_writer().finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let mut message = message();
        message.email = "émile@example.com".to_string();

        let (status, body) = post_contact(serde_json::to_value(message).unwrap()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
    }
}
