//! Typed errors and HTTP mapping.

use crate::response::{failure_response, Failure};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("fetcher is not defined correctly: missing name")]
    MissingName,
    #[error("invalid path prefix: '{0}' (must start with '/' and not end with '/')")]
    InvalidPrefix(String),
    #[error("config load: {0}")]
    Load(String),
}

/// Failure of a single dispatch. `NotFound` is raised by the dispatch layer itself,
/// `Handler` carries whatever the fetcher produced.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DispatchError {
    #[error("fetcher could not be found: {0}")]
    NotFound(String),
    #[error("{}", .0.message_or_default())]
    Handler(Failure),
}

impl DispatchError {
    /// Collapse into the failure shape sent over the wire.
    pub fn into_failure(self) -> Failure {
        match self {
            DispatchError::NotFound(_) => {
                Failure::new(StatusCode::NOT_FOUND.as_u16(), self.to_string())
            }
            DispatchError::Handler(failure) => failure,
        }
    }
}

impl From<Failure> for DispatchError {
    fn from(failure: Failure) -> Self {
        DispatchError::Handler(failure)
    }
}

impl IntoResponse for DispatchError {
    fn into_response(self) -> Response {
        failure_response(self.into_failure())
    }
}

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("transport: {0}")]
    Transport(String),
    #[error("decode: {0}")]
    Decode(String),
    #[error("{}", .0.message_or_default())]
    Failure(Failure),
}

impl From<serde_json::Error> for ClientError {
    fn from(e: serde_json::Error) -> Self {
        ClientError::Decode(e.to_string())
    }
}

impl From<ClientError> for Failure {
    fn from(e: ClientError) -> Self {
        match e {
            ClientError::Failure(failure) => failure,
            other => Failure {
                status_code: None,
                message: Some(other.to_string()),
                extra: Default::default(),
            },
        }
    }
}
