//! # connector-auth
//!
//! Authentication building blocks for the third-party integration connectors:
//! - Request authentication (bearer tokens, prefixed header tokens such as Discord's `Bot`)
//! - HTTP client building with timeout and retry middleware
//! - OAuth 2.0 authorization URLs and code exchange for Slack, Google, Notion and Discord
//! - Signed OAuth `state` values
//! - AES-256-GCM encryption of credentials stored at rest
//!
//! ## Usage
//!
//! ```rust,ignore
//! use connector_auth::{
//!     auth::{BearerTokenAuth, ProviderAuth},
//!     http::ConnectorClientBuilder,
//!     oauth::{providers::slack, Provider, StateSigner},
//! };
//! ```

pub mod auth;
pub mod encryption;
pub mod error;
pub mod http;
pub mod oauth;

// Re-export commonly used types
pub use error::{Error, ErrorKind};
