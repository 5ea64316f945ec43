//! Google OAuth provider, shared by Google Drive and Google Analytics.

use async_trait::async_trait;
use log::*;
use secrecy::ExposeSecret;
use serde::Serialize;

use super::{network_error, read_token_response, StandardTokenResponse};
use crate::error::Error;
use crate::http::ConnectorClient;
use crate::oauth::{ClientCredentials, ProviderKind, Tokens};

pub const DEFAULT_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

/// Request to exchange authorization code for tokens
#[derive(Debug, Serialize)]
struct TokenExchangeRequest<'a> {
    code: &'a str,
    client_id: &'a str,
    client_secret: &'a str,
    redirect_uri: &'a str,
    grant_type: &'static str,
}

/// Google OAuth provider.
pub struct Provider {
    credentials: ClientCredentials,
    token_url: String,
    http_client: ConnectorClient,
}

impl Provider {
    /// Create a new Google OAuth provider.
    ///
    /// # Arguments
    ///
    /// * `credentials` - Google OAuth client ID and secret
    /// * `token_url` - Token endpoint, normally [`DEFAULT_TOKEN_URL`]
    /// * `http_client` - Shared outbound client
    pub fn new(credentials: ClientCredentials, token_url: String, http_client: ConnectorClient) -> Self {
        Self {
            credentials,
            token_url,
            http_client,
        }
    }
}

#[async_trait]
impl crate::oauth::Provider for Provider {
    fn provider(&self) -> ProviderKind {
        ProviderKind::Google
    }

    async fn exchange_code(&self, code: &str, redirect_uri: &str) -> Result<Tokens, Error> {
        let request = TokenExchangeRequest {
            code,
            client_id: &self.credentials.client_id,
            client_secret: self.credentials.client_secret.expose_secret(),
            redirect_uri,
            grant_type: "authorization_code",
        };

        debug!("Exchanging Google OAuth code for tokens");

        let response = self
            .http_client
            .post(&self.token_url)
            .form(&request)
            .send()
            .await
            .map_err(|e| network_error("Google", e))?;

        let body: StandardTokenResponse = read_token_response("Google", response).await?;
        info!("Successfully exchanged Google OAuth code for tokens");

        Ok(Tokens::new(body.access_token, body.token_type)
            .with_refresh_token(body.refresh_token)
            .with_expires_in(body.expires_in)
            .with_scopes(body.scope.as_deref()))
    }
}
