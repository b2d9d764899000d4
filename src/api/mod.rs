//! API client module

pub mod client;
pub mod models;
pub mod response;
pub mod session;

pub use client::{encode_segment, CF_API_BASE};
pub use response::ApiResponse;
pub use session::Session;
