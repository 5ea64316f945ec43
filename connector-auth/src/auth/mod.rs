//! Request authentication for provider APIs.
//!
//! Providers disagree on how a credential travels: Slack, Google, Notion and
//! Zapier want `Authorization: Bearer <token>`, Discord bots want
//! `Authorization: Bot <token>`.

mod bearer;
mod header;

pub use bearer::BearerTokenAuth;
pub use header::HeaderTokenAuth;

use reqwest_middleware::RequestBuilder;

/// Authentication method for HTTP requests.
#[derive(Debug, Clone, PartialEq)]
pub enum AuthMethod {
    /// Standard Bearer token
    BearerToken,
    /// Custom header with optional prefix (e.g., "Authorization: Bot xxx")
    HeaderToken {
        header_name: String,
        prefix: Option<String>,
    },
}

/// Trait for authenticating outbound provider requests.
pub trait ProviderAuth: Send + Sync {
    /// Get the authentication method used.
    fn auth_method(&self) -> AuthMethod;

    /// Apply authentication to a request builder.
    fn authenticate(&self, request: RequestBuilder) -> RequestBuilder;
}
