//! Error types for the `connector-auth` crate.
//!
//! Follows the same pattern as domain::error with a root Error struct and error kind enums.

use std::error::Error as StdError;
use std::fmt;

/// Top-level error type for connector-auth crate.
/// Holds error kind and optional source for error chaining.
#[derive(Debug)]
pub struct Error {
    pub source: Option<Box<dyn StdError + Send + Sync>>,
    pub error_kind: ErrorKind,
}

/// Major categories of errors in connector-auth.
#[derive(Debug, PartialEq)]
pub enum ErrorKind {
    OAuth(OAuthErrorKind),
    State(StateErrorKind),
    Crypto(CryptoErrorKind),
    Http(HttpErrorKind),
}

/// Errors from OAuth operations.
#[derive(Debug, PartialEq)]
pub enum OAuthErrorKind {
    /// The provider rejected the authorization code. The source carries the
    /// provider's error string.
    TokenExchangeFailed,
    /// The token endpoint could not be reached.
    Network,
    /// The token endpoint answered with a body we could not interpret.
    InvalidResponse,
    /// The authorize URL could not be built.
    InvalidAuthorizeUrl,
}

/// Errors from OAuth `state` verification.
#[derive(Debug, PartialEq)]
pub enum StateErrorKind {
    Malformed,
    MissingSignature,
    InvalidSignature,
    Expired,
}

/// Errors from encrypting or decrypting stored credentials.
#[derive(Debug, PartialEq)]
pub enum CryptoErrorKind {
    InvalidKey,
    EncryptionFailed,
    DecryptionFailed,
}

/// Errors from HTTP client operations.
#[derive(Debug, PartialEq)]
pub enum HttpErrorKind {
    BuilderFailed,
    RequestFailed,
    Network,
}

impl Error {
    /// The message carried by the source error, if any.
    pub fn message(&self) -> Option<String> {
        self.source.as_ref().map(|source| source.to_string())
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.error_kind {
            ErrorKind::OAuth(kind) => write!(f, "OAuth error: {:?}", kind)?,
            ErrorKind::State(kind) => write!(f, "OAuth state error: {:?}", kind)?,
            ErrorKind::Crypto(kind) => write!(f, "Crypto error: {:?}", kind)?,
            ErrorKind::Http(kind) => write!(f, "HTTP error: {:?}", kind)?,
        }
        match &self.source {
            Some(source) => write!(f, " ({source})"),
            None => Ok(()),
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

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        let error_kind = if err.is_builder() {
            ErrorKind::Http(HttpErrorKind::BuilderFailed)
        } else if err.is_request() {
            ErrorKind::Http(HttpErrorKind::RequestFailed)
        } else {
            ErrorKind::Http(HttpErrorKind::Network)
        };

        Error {
            source: Some(Box::new(err)),
            error_kind,
        }
    }
}

impl From<reqwest_middleware::Error> for Error {
    fn from(err: reqwest_middleware::Error) -> Self {
        Error {
            source: Some(Box::new(err)),
            error_kind: ErrorKind::Http(HttpErrorKind::Network),
        }
    }
}

/// Helper function to create OAuth errors.
pub fn oauth_error(kind: OAuthErrorKind, message: &str) -> Error {
    Error {
        source: Some(message.to_string().into()),
        error_kind: ErrorKind::OAuth(kind),
    }
}

/// Helper function to create OAuth state errors.
pub fn state_error(kind: StateErrorKind, message: &str) -> Error {
    Error {
        source: Some(message.to_string().into()),
        error_kind: ErrorKind::State(kind),
    }
}

/// Helper function to create crypto errors without leaking key or payload material.
pub fn crypto_error(kind: CryptoErrorKind) -> Error {
    Error {
        source: None,
        error_kind: ErrorKind::Crypto(kind),
    }
}
