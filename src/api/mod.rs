// Chatbot REST API: wire types, typed errors and the HTTP client

mod client;
mod error;
pub mod models;

pub use client::ApiClient;
pub use error::ApiError;
pub use models::*;
