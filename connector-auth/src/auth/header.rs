//! Token authentication through a named header with an optional scheme prefix.

use reqwest::header::HeaderValue;
use reqwest_middleware::RequestBuilder;
use secrecy::{ExposeSecret, SecretString};

use super::{AuthMethod, ProviderAuth};

/// Header token authentication.
///
/// Supports custom header names and prefixes for provider-specific schemes.
///
/// # Examples
///
/// ```rust,ignore
/// // Discord bots: Authorization: Bot xxx
/// let auth = HeaderTokenAuth::new("Authorization", Some("Bot"), SecretString::from(token));
/// ```
pub struct HeaderTokenAuth {
    header_name: String,
    prefix: Option<String>,
    token: SecretString,
}

impl HeaderTokenAuth {
    /// Create a new header token authenticator.
    ///
    /// An empty prefix is treated as no prefix.
    pub fn new(header_name: &str, prefix: Option<&str>, token: SecretString) -> Self {
        Self {
            header_name: header_name.to_string(),
            prefix: prefix.filter(|p| !p.is_empty()).map(str::to_string),
            token,
        }
    }

    /// Authenticator for Discord bot tokens.
    pub fn discord_bot(token: SecretString) -> Self {
        Self::new("Authorization", Some("Bot"), token)
    }

    fn header_value(&self) -> String {
        match &self.prefix {
            Some(prefix) => format!("{} {}", prefix, self.token.expose_secret()),
            None => self.token.expose_secret().to_string(),
        }
    }
}

impl ProviderAuth for HeaderTokenAuth {
    fn auth_method(&self) -> AuthMethod {
        AuthMethod::HeaderToken {
            header_name: self.header_name.clone(),
            prefix: self.prefix.clone(),
        }
    }

    fn authenticate(&self, request: RequestBuilder) -> RequestBuilder {
        match HeaderValue::from_str(&self.header_value()) {
            Ok(mut value) => {
                value.set_sensitive(true);
                request.header(self.header_name.as_str(), value)
            }
            // An unrepresentable token is sent without credentials; the provider
            // answers 401 and the caller reports an upstream failure.
            Err(_) => request,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::ConnectorClientBuilder;

    #[test]
    fn discord_bot_auth_uses_bot_prefix() {
        let client = ConnectorClientBuilder::new().build().unwrap();
        let auth = HeaderTokenAuth::discord_bot(SecretString::from("bot-token".to_string()));

        let request = auth
            .authenticate(client.get("https://discord.com/api/v10/users/@me"))
            .build()
            .unwrap();

        let header = request.headers().get("authorization").unwrap();
        assert_eq!(header.to_str().unwrap(), "Bot bot-token");
        assert!(header.is_sensitive());
    }

    #[test]
    fn empty_prefix_is_dropped() {
        let auth = HeaderTokenAuth::new("X-Api-Key", Some(""), SecretString::from("k".to_string()));
        assert_eq!(
            auth.auth_method(),
            AuthMethod::HeaderToken {
                header_name: "X-Api-Key".to_string(),
                prefix: None,
            }
        );
        assert_eq!(auth.header_value(), "k");
    }

    #[test]
    fn token_with_newline_is_not_sent() {
        let client = ConnectorClientBuilder::new().build().unwrap();
        let auth = HeaderTokenAuth::discord_bot(SecretString::from("bad\ntoken".to_string()));

        let request = auth
            .authenticate(client.get("https://discord.com/api/v10/users/@me"))
            .build()
            .unwrap();

        assert!(request.headers().get("authorization").is_none());
    }
}
