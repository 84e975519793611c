// src/services/mod.rs
//
// Shared services: the remote content API client, the image host
// uploader and the contact mail relay

pub mod mailer;
pub mod remote;
pub mod uploader;

// Re-export commonly used types for convenience
pub use mailer::ContactMailer;
