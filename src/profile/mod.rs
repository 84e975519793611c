// src/profile/mod.rs

pub mod client;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod validators;


pub use routes::profile_routes;
