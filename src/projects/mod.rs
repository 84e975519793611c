//! # Projects Module
//!
//! This module handles the portfolio's project records:
//! - Remote CRUD client with the bundled fallback list
//! - Slug derivation and form validation
//! - The admin create/update workflow and optimistic list updates

pub mod client;
pub mod fallback;
pub mod form;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod slug;
pub mod validators;

#[cfg(test)]
mod tests;

pub use routes::projects_routes;
