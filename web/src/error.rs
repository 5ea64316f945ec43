use std::error::Error as StdError;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use domain::error::{
    DomainErrorKind, EntityErrorKind, Error as DomainError, ExternalErrorKind, InternalErrorKind,
};

extern crate log;
use log::*;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug)]
pub struct Error(DomainError);

impl StdError for Error {}

impl std::fmt::Display for Error {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> core::result::Result<(), std::fmt::Error> {
        write!(fmt, "{}", self.0)
    }
}

impl Error {
    fn status_code(&self) -> StatusCode {
        match &self.0.error_kind {
            DomainErrorKind::Internal(internal_error_kind) => match internal_error_kind {
                InternalErrorKind::Validation(_)
                | InternalErrorKind::UnknownProvider(_)
                | InternalErrorKind::Unsupported(_)
                | InternalErrorKind::InvalidState => StatusCode::BAD_REQUEST,
                InternalErrorKind::Entity(EntityErrorKind::NotFound) => StatusCode::NOT_FOUND,
                InternalErrorKind::Entity(_)
                | InternalErrorKind::Config(_)
                | InternalErrorKind::Crypto
                | InternalErrorKind::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            DomainErrorKind::External(_) => StatusCode::BAD_GATEWAY,
        }
    }

    /// The text sent to the browser. Storage and crypto failures stay opaque.
    fn message(&self) -> String {
        match &self.0.error_kind {
            DomainErrorKind::Internal(InternalErrorKind::Entity(EntityErrorKind::NotFound)) => {
                "Not found".to_string()
            }
            DomainErrorKind::Internal(
                InternalErrorKind::Entity(_)
                | InternalErrorKind::Crypto
                | InternalErrorKind::Other(_),
            ) => "Internal server error".to_string(),
            DomainErrorKind::Internal(_)
            | DomainErrorKind::External(ExternalErrorKind::Upstream(_))
            | DomainErrorKind::External(ExternalErrorKind::Network) => self.0.to_string(),
        }
    }
}

// List of possible StatusCode variants https://docs.rs/http/latest/http/status/struct.StatusCode.html#associatedconstant.UNPROCESSABLE_ENTITY
impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!("Request failed ({status}): {}", self.0);
            if let Some(source) = self.0.source() {
                debug!("Caused by: {source}");
            }
        } else {
            warn!("Request rejected ({status}): {}", self.0);
        }

        (
            status,
            Json(json!({ "success": false, "error": self.message() })),
        )
            .into_response()
    }
}

impl<E> From<E> for Error
where
    E: Into<DomainError>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
