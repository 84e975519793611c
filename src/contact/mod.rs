// src/contact/mod.rs

pub mod handlers;
pub mod routes;
pub mod validators;

#[cfg(test)]
mod tests;

pub use routes::contact_routes;
