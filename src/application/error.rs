use thiserror::Error;

use crate::{
    config::LoadError,
    infra::{error::InfraError, http::ClientError, session::SessionError},
};

/// Top-level error of the `bridgeus` binary.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("failed to load configuration: {0}")]
    Config(#[from] LoadError),
    #[error(transparent)]
    Infra(#[from] InfraError),
    #[error(transparent)]
    Client(#[from] ClientError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error("failed to read {path}: {source}")]
    Input {
        path: String,
        source: std::io::Error,
    },
    #[error("not signed in")]
    NotSignedIn,
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl AppError {
    pub fn input(path: impl Into<String>, source: std::io::Error) -> Self {
        Self::Input {
            path: path.into(),
            source,
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::Unexpected(message.into())
    }
}
