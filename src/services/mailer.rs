// src/services/mailer.rs
//! Contact form mail relay via AWS SES

use aws_config::BehaviorVersion;
use aws_sdk_sesv2::config::Region;
use aws_sdk_sesv2::types::{Body as SesBody, Content, Destination, EmailContent, Message};
use aws_sdk_sesv2::Client as SesClient;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::common::config::MailConfig;
use crate::common::helpers::html_escape;
use crate::common::safe_email_log;

#[derive(Debug, Error)]
pub enum MailError {
    #[error("Mail relay not configured")]
    NotConfigured,

    #[error("SES operation failed: {0}")]
    SESError(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactMessage {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
}

struct Relay {
    client: SesClient,
    config: MailConfig,
}

pub struct ContactMailer {
    relay: Option<Relay>,
}

impl ContactMailer {
    pub async fn from_config(config: Option<MailConfig>) -> Self {
        let Some(config) = config else {
            return Self::disabled();
        };

        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(region) = &config.region {
            loader = loader.region(Region::new(region.clone()));
        }
        let client = SesClient::new(&loader.load().await);

        info!(to = %safe_email_log(&config.to_email), "Contact mailer initialized");
        Self {
            relay: Some(Relay { client, config }),
        }
    }

    pub fn disabled() -> Self {
        Self { relay: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.relay.is_some()
    }

    pub async fn send(&self, message: &ContactMessage) -> Result<(), MailError> {
        let relay = self.relay.as_ref().ok_or(MailError::NotConfigured)?;

        let subject = format!("Portfolio contact: {} - {}", message.subject, message.name);

        let subject_content = Content::builder()
            .data(subject)
            .charset("UTF-8")
            .build()
            .map_err(|e| MailError::SESError(format!("Failed to build subject: {}", e)))?;

        let html_content = Content::builder()
            .data(render_html(message))
            .charset("UTF-8")
            .build()
            .map_err(|e| MailError::SESError(format!("Failed to build body: {}", e)))?;

        let text_content = Content::builder()
            .data(render_text(message))
            .charset("UTF-8")
            .build()
            .map_err(|e| MailError::SESError(format!("Failed to build body: {}", e)))?;

        let body = SesBody::builder()
            .html(html_content)
            .text(text_content)
            .build();

        let content = EmailContent::builder()
            .simple(Message::builder().subject(subject_content).body(body).build())
            .build();

        let result = relay
            .client
            .send_email()
            .from_email_address(&relay.config.from_email)
            .destination(
                Destination::builder()
                    .to_addresses(relay.config.to_email.clone())
                    .build(),
            )
            .reply_to_addresses(message.email.clone())
            .content(content)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to send contact email via SES");
                MailError::SESError(format!("Send failed: {}", e))
            })?;

        info!(
            from_email = %safe_email_log(&message.email),
            message_id = ?result.message_id(),
            "Contact email sent"
        );
        Ok(())
    }

    /// Sends in the background; the caller never waits on delivery
    pub fn dispatch(self: &Arc<Self>, message: ContactMessage) {
        if !self.is_enabled() {
            warn!(
                from_email = %safe_email_log(&message.email),
                subject = %message.subject,
                "Contact mail not configured, dropping submission"
            );
            return;
        }

        let mailer = Arc::clone(self);
        tokio::spawn(async move {
            if let Err(e) = mailer.send(&message).await {
                error!(error = %e, "Contact email delivery failed");
            }
        });
    }
}

pub fn render_html(message: &ContactMessage) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="UTF-8">
    <style>
        body {{ font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; line-height: 1.6; color: #333; }}
        .container {{ max-width: 600px; margin: 0 auto; padding: 20px; }}
        .header {{ background-color: #1e3a8a; color: white; padding: 24px; border-radius: 8px 8px 0 0; }}
        .content {{ padding: 24px; background-color: #f9fafb; border: 1px solid #e5e7eb; border-top: none; }}
        .label {{ font-size: 12px; font-weight: 600; color: #6b7280; text-transform: uppercase; }}
        .message {{ background: white; padding: 16px; border-radius: 6px; border: 1px solid #e5e7eb; white-space: pre-wrap; }}
    </style>
</head>
<body>
    <div class="container">
        <div class="header">
            <h2>New message from the portfolio site</h2>
        </div>
        <div class="content">
            <p class="label">From</p>
            <p>{} &lt;{}&gt;</p>
            <p class="label">Subject</p>
            <p>{}</p>
            <p class="label">Message</p>
            <div class="message">{}</div>
        </div>
    </div>
</body>
</html>"#,
        html_escape(&message.name),
        html_escape(&message.email),
        html_escape(&message.subject),
        html_escape(&message.message)
    )
}

pub fn render_text(message: &ContactMessage) -> String {
    format!(
        "New message from the portfolio site\n\nFrom: {} <{}>\nSubject: {}\n\n{}\n",
        message.name, message.email, message.subject, message.message
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message() -> ContactMessage {
        ContactMessage {
            name: "Grace <script>".to_string(),
            email: "grace@example.com".to_string(),
            subject: "Collaboration".to_string(),
            message: "Hello & welcome".to_string(),
        }
    }

    #[test]
    fn test_html_template_escapes_input() {
        let html = render_html(&message());

        assert!(html.contains("Grace &lt;script&gt;"));
        assert!(html.contains("Hello &amp; welcome"));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn test_text_fallback_is_plain() {
        let text = render_text(&message());

        assert!(text.contains("From: Grace <script> <grace@example.com>"));
        assert!(text.contains("Subject: Collaboration"));
        assert!(text.ends_with("Hello & welcome\n"));
    }

    #[tokio::test]
    async fn test_disabled_mailer_refuses_to_send() {
        let mailer = ContactMailer::disabled();
        assert!(!mailer.is_enabled());
        assert!(matches!(
            mailer.send(&message()).await,
            Err(MailError::NotConfigured)
        ));

        // Dispatch on a disabled mailer returns without spawning
        Arc::new(mailer).dispatch(message());
    }
}
