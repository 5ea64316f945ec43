//! Per-provider authorization-code exchanges.

pub mod discord;
pub mod google;
pub mod notion;
pub mod slack;

use log::*;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::error::{oauth_error, Error, ErrorKind, OAuthErrorKind};
use crate::http::provider_error_message;

/// RFC 6749 token response shared by Google and Discord.
#[derive(Debug, Deserialize)]
pub(crate) struct StandardTokenResponse {
    pub access_token: String,
    pub token_type: Option<String>,
    pub refresh_token: Option<String>,
    pub expires_in: Option<i64>,
    pub scope: Option<String>,
}

pub(crate) fn network_error(provider: &str, err: reqwest_middleware::Error) -> Error {
    warn!("Failed to reach {provider} token endpoint: {err}");
    Error {
        source: Some(Box::new(err)),
        error_kind: ErrorKind::OAuth(OAuthErrorKind::Network),
    }
}

/// Read a token endpoint response, mapping non-2xx statuses to
/// `TokenExchangeFailed` with the provider's error string.
pub(crate) async fn read_token_response<T: DeserializeOwned>(
    provider: &str,
    response: reqwest::Response,
) -> Result<T, Error> {
    let status = response.status();
    let body = response.text().await.map_err(|e| Error {
        source: Some(Box::new(e)),
        error_kind: ErrorKind::OAuth(OAuthErrorKind::Network),
    })?;

    if !status.is_success() {
        let message = provider_error_message(status.as_u16(), &body);
        warn!("{provider} token exchange rejected with {status}: {message}");
        return Err(oauth_error(OAuthErrorKind::TokenExchangeFailed, &message));
    }

    serde_json::from_str(&body).map_err(|e| {
        warn!("Failed to parse {provider} token response: {e}");
        Error {
            source: Some(Box::new(e)),
            error_kind: ErrorKind::OAuth(OAuthErrorKind::InvalidResponse),
        }
    })
}
