pub mod client;
pub mod endpoints;
pub mod error;
pub mod models;


pub use client::{BackendClient, DEFAULT_BACKEND_URL};
pub use error::ApiError;
pub use models::*;
