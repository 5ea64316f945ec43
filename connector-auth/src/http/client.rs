//! HTTP client builder with retry middleware.

use std::time::Duration;

use reqwest_middleware::ClientBuilder;

use super::retry::{BackoffPolicy, IdempotentRetry};

/// HTTP client configuration.
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Request timeout.
    pub timeout: Duration,
    /// Maximum number of retries for transient failures of idempotent requests.
    /// Zero disables retries.
    pub max_retries: u32,
    /// User agent string.
    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            max_retries: 0,
            user_agent: format!("connector-auth/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// HTTP client used for provider API and token endpoint calls.
///
/// Cloning is cheap; clones share the underlying connection pool.
pub type ConnectorClient = reqwest_middleware::ClientWithMiddleware;

/// Builder for [`ConnectorClient`].
///
/// Authentication is applied per request through [`crate::auth::ProviderAuth`]
/// since one client serves every user and provider.
pub struct ConnectorClientBuilder {
    config: HttpClientConfig,
}

impl ConnectorClientBuilder {
    /// Create a new client builder with default configuration.
    pub fn new() -> Self {
        Self {
            config: HttpClientConfig::default(),
        }
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set the maximum number of retries.
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.config.max_retries = max_retries;
        self
    }

    /// Set the user agent string.
    pub fn with_user_agent(mut self, user_agent: String) -> Self {
        self.config.user_agent = user_agent;
        self
    }

    /// Build the configured HTTP client.
    pub fn build(self) -> Result<ConnectorClient, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(self.config.timeout)
            .user_agent(self.config.user_agent)
            .build()?;

        let retry_policy = BackoffPolicy::new(self.config.max_retries);
        Ok(ClientBuilder::new(client)
            .with(IdempotentRetry::new(retry_policy))
            .build())
    }
}

impl Default for ConnectorClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
