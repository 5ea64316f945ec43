//! Outbound HTTP client shared by every provider call.

mod client;
mod response;
mod retry;

pub use client::{ConnectorClient, ConnectorClientBuilder, HttpClientConfig};
pub use response::provider_error_message;
pub use retry::BackoffPolicy;
