//! OAuth 2.0 authorization-code flow.
//!
//! Provides authorize URL construction, signed `state` handling and the
//! per-provider code exchanges.

mod provider;
mod state;
mod tokens;

pub mod providers;

pub use provider::{authorization_url, ClientCredentials, Provider, ProviderKind};
pub use state::{OAuthState, StateSigner};
pub use tokens::Tokens;
