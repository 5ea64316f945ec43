//! Standard Bearer token authentication.

use reqwest_middleware::RequestBuilder;
use secrecy::{ExposeSecret, SecretString};

use super::{AuthMethod, ProviderAuth};

/// Standard Bearer token authentication.
///
/// Uses the standard `Authorization: Bearer <token>` header pattern.
pub struct BearerTokenAuth {
    token: SecretString,
}

impl BearerTokenAuth {
    /// Create a new Bearer token authenticator.
    pub fn new(token: SecretString) -> Self {
        Self { token }
    }
}

impl ProviderAuth for BearerTokenAuth {
    fn auth_method(&self) -> AuthMethod {
        AuthMethod::BearerToken
    }

    fn authenticate(&self, request: RequestBuilder) -> RequestBuilder {
        request.bearer_auth(self.token.expose_secret())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::ConnectorClientBuilder;

    #[test]
    fn bearer_auth_sets_authorization_header() {
        let client = ConnectorClientBuilder::new().build().unwrap();
        let auth = BearerTokenAuth::new(SecretString::from("xoxb-test".to_string()));

        let request = auth
            .authenticate(client.get("https://slack.com/api/auth.test"))
            .build()
            .unwrap();

        let header = request.headers().get("authorization").unwrap();
        assert_eq!(header.to_str().unwrap(), "Bearer xoxb-test");
        assert!(header.is_sensitive());
        assert_eq!(auth.auth_method(), AuthMethod::BearerToken);
    }
}
