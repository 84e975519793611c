//! # Auth Module
//!
//! This module handles all authentication-related functionality including:
//! - Credential verification (remote login endpoint or bypass credential)
//! - Session persistence in the `authToken` cookie
//! - The admin route guard and its `AdminSession` extractor

pub mod guard;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod session;
pub mod verifier;


pub use guard::AdminSession;
pub use routes::auth_routes;
