//! Error types for the `domain` layer.
use connector_auth::error::{
    Error as ConnectorAuthError, ErrorKind as ConnectorAuthErrorKind, HttpErrorKind,
    OAuthErrorKind,
};
use entity::provider::UnknownProvider;
use entity_api::error::{EntityApiErrorKind, Error as EntityApiError};
use std::error::Error as StdError;
use std::fmt;

/// Top-level domain error type.
/// Errors in the Domain layer are modeled as a tree structure
/// with `domain::error::Error` as the root type holding a tree of `error_kind`
/// enums that represent the kinds of errors that can occur in the domain layer or
/// in lower layers. The `source` field is used to hold the original error that caused
/// the domain error. The intent is to translate errors between layers while maintaining
/// layer boundaries. Ex. `domain` is dependent on `entity_api` and `connector-auth`, and
/// `web` is dependent on `domain`, but `web` should not be dependent, directly, on either.
/// Ultimately the various `error_kind`s are used by `web` to return appropriate HTTP
/// status codes and messages to the client.
#[derive(Debug)]
pub struct Error {
    pub source: Option<Box<dyn StdError + Send + Sync>>,
    pub error_kind: DomainErrorKind,
}

/// Enum representing the major categories of errors that can occur in the `domain` layer.
#[derive(Debug, PartialEq)]
pub enum DomainErrorKind {
    Internal(InternalErrorKind),
    External(ExternalErrorKind),
}

/// Enum representing the various kinds of internal errors that can occur in the `domain` layer.
#[derive(Debug, PartialEq)]
pub enum InternalErrorKind {
    Entity(EntityErrorKind),
    /// A required setting is missing. Holds the environment variable name.
    Config(String),
    /// A required credential field or request value is missing.
    Validation(String),
    /// The identifier names no registered integration.
    UnknownProvider(String),
    /// The integration has no implementation for the requested operation.
    Unsupported(String),
    /// The OAuth `state` was unsigned, forged, malformed or expired.
    InvalidState,
    /// Stored credentials could not be encrypted or decrypted.
    Crypto,
    Other(String),
}

/// Enum representing the various kinds of entity errors that can bubble up from the "Entity" layer (`entity_api` and `entity`).
/// These errors are translated from the `entity_api` layer to the `domain` layer and reduced to a subset of error kinds
/// that are relevant to the `domain` layer.
#[derive(Debug, PartialEq)]
pub enum EntityErrorKind {
    NotFound,
    DbTransaction,
    Other(String),
}

/// Enum representing the various kinds of external errors that can occur in the `domain` layer.
#[derive(Debug, PartialEq)]
pub enum ExternalErrorKind {
    /// The provider could not be reached.
    Network,
    /// The provider answered with a rejection. Holds the provider's message verbatim.
    Upstream(String),
}

impl Error {
    pub fn config(variable: &str) -> Self {
        Error {
            source: None,
            error_kind: DomainErrorKind::Internal(InternalErrorKind::Config(variable.to_string())),
        }
    }

    pub fn validation(message: &str) -> Self {
        Error {
            source: None,
            error_kind: DomainErrorKind::Internal(InternalErrorKind::Validation(
                message.to_string(),
            )),
        }
    }

    pub fn unsupported(provider: &str) -> Self {
        Error {
            source: None,
            error_kind: DomainErrorKind::Internal(InternalErrorKind::Unsupported(
                provider.to_string(),
            )),
        }
    }

    pub fn invalid_state() -> Self {
        Error {
            source: None,
            error_kind: DomainErrorKind::Internal(InternalErrorKind::InvalidState),
        }
    }

    pub fn upstream(message: &str) -> Self {
        Error {
            source: None,
            error_kind: DomainErrorKind::External(ExternalErrorKind::Upstream(message.to_string())),
        }
    }

    pub fn network<E>(source: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Error {
            source: Some(Box::new(source)),
            error_kind: DomainErrorKind::External(ExternalErrorKind::Network),
        }
    }

    pub fn other(message: &str) -> Self {
        Error {
            source: None,
            error_kind: DomainErrorKind::Internal(InternalErrorKind::Other(message.to_string())),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.error_kind {
            DomainErrorKind::Internal(InternalErrorKind::Config(variable)) => {
                write!(f, "Missing configuration: {variable}")
            }
            DomainErrorKind::Internal(InternalErrorKind::Validation(message)) => {
                write!(f, "{message}")
            }
            DomainErrorKind::Internal(InternalErrorKind::UnknownProvider(id)) => {
                write!(f, "Unknown integration: {id}")
            }
            DomainErrorKind::Internal(InternalErrorKind::Unsupported(id)) => {
                write!(f, "Unsupported integration: {id}")
            }
            DomainErrorKind::Internal(InternalErrorKind::InvalidState) => {
                write!(f, "Invalid OAuth state")
            }
            DomainErrorKind::External(ExternalErrorKind::Upstream(message)) => {
                write!(f, "{message}")
            }
            DomainErrorKind::External(ExternalErrorKind::Network) => {
                write!(f, "Failed to reach the integration provider")
            }
            _ => write!(f, "Domain Error: {:?}", self.error_kind),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn StdError + 'static))
    }
}

// This is where we translate errors from the `entity_api` layer to the `domain` layer.
impl From<EntityApiError> for Error {
    fn from(err: EntityApiError) -> Self {
        let entity_error_kind = match err.error_kind {
            EntityApiErrorKind::RecordNotFound => EntityErrorKind::NotFound,
            EntityApiErrorKind::SystemError => EntityErrorKind::DbTransaction,
            EntityApiErrorKind::RecordNotInserted => {
                EntityErrorKind::Other("RecordNotInserted".to_string())
            }
        };

        Error {
            source: Some(Box::new(err)),
            error_kind: DomainErrorKind::Internal(InternalErrorKind::Entity(entity_error_kind)),
        }
    }
}

impl From<UnknownProvider> for Error {
    fn from(err: UnknownProvider) -> Self {
        Error {
            error_kind: DomainErrorKind::Internal(InternalErrorKind::UnknownProvider(
                err.0.clone(),
            )),
            source: Some(Box::new(err)),
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        // Errors that result from issues building the reqwest::Client instance. This
        // type of error will occur prior to any network calls being made.
        if err.is_builder() {
            Error {
                source: Some(Box::new(err)),
                error_kind: DomainErrorKind::Internal(InternalErrorKind::Other(
                    "Failed to build reqwest client".to_string(),
                )),
            }
        // Errors that result from issues with the network call itself.
        } else {
            Error::network(err)
        }
    }
}

impl From<reqwest_middleware::Error> for Error {
    fn from(err: reqwest_middleware::Error) -> Self {
        match err {
            reqwest_middleware::Error::Reqwest(err) => err.into(),
            other => Error::network(other),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error {
            source: Some(Box::new(err)),
            error_kind: DomainErrorKind::Internal(InternalErrorKind::Other(
                "Invalid stored credentials".to_string(),
            )),
        }
    }
}

impl From<ConnectorAuthError> for Error {
    fn from(err: ConnectorAuthError) -> Self {
        let error_kind = match &err.error_kind {
            ConnectorAuthErrorKind::OAuth(OAuthErrorKind::Network) => {
                DomainErrorKind::External(ExternalErrorKind::Network)
            }
            ConnectorAuthErrorKind::OAuth(OAuthErrorKind::TokenExchangeFailed)
            | ConnectorAuthErrorKind::OAuth(OAuthErrorKind::InvalidResponse) => {
                DomainErrorKind::External(ExternalErrorKind::Upstream(
                    err.message()
                        .unwrap_or_else(|| "Token exchange failed".to_string()),
                ))
            }
            ConnectorAuthErrorKind::OAuth(OAuthErrorKind::InvalidAuthorizeUrl) => {
                DomainErrorKind::Internal(InternalErrorKind::Other(err.to_string()))
            }
            ConnectorAuthErrorKind::State(_) => {
                DomainErrorKind::Internal(InternalErrorKind::InvalidState)
            }
            ConnectorAuthErrorKind::Crypto(_) => DomainErrorKind::Internal(InternalErrorKind::Crypto),
            ConnectorAuthErrorKind::Http(HttpErrorKind::BuilderFailed) => {
                DomainErrorKind::Internal(InternalErrorKind::Other(err.to_string()))
            }
            ConnectorAuthErrorKind::Http(_) => DomainErrorKind::External(ExternalErrorKind::Network),
        };
        Error {
            source: Some(Box::new(err)),
            error_kind,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use connector_auth::error::{oauth_error, state_error, StateErrorKind};

    #[test]
    fn token_exchange_rejection_keeps_provider_message() {
        let err: Error = oauth_error(OAuthErrorKind::TokenExchangeFailed, "invalid_code").into();
        assert_eq!(
            err.error_kind,
            DomainErrorKind::External(ExternalErrorKind::Upstream("invalid_code".to_string()))
        );
        assert_eq!(err.to_string(), "invalid_code");
    }

    #[test]
    fn state_errors_map_to_invalid_state() {
        let err: Error = state_error(StateErrorKind::Expired, "expired").into();
        assert_eq!(
            err.error_kind,
            DomainErrorKind::Internal(InternalErrorKind::InvalidState)
        );
    }

    #[test]
    fn config_error_names_the_variable() {
        let err = Error::config("SLACK_CLIENT_SECRET");
        assert_eq!(err.to_string(), "Missing configuration: SLACK_CLIENT_SECRET");
    }

    #[test]
    fn unknown_provider_maps_from_parse_failure() {
        let err: Error = "myspace"
            .parse::<entity::provider::Provider>()
            .unwrap_err()
            .into();
        assert_eq!(
            err.error_kind,
            DomainErrorKind::Internal(InternalErrorKind::UnknownProvider("myspace".to_string()))
        );
    }
}
