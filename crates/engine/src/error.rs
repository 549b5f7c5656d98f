//! The module contains the error the engine can throw.
//!
//! The errors are:
//!
//! - [`InvalidRequest`] thrown when an input fails validation.
//! - [`InvalidId`] thrown when an identifier is not a well formed UUID.
//! - [`KeyNotFound`] thrown when an item is missing or not owned by the caller.
//! - [`Internal`] thrown when stored data or an arithmetic result is unusable.
//!
//!  [`InvalidRequest`]: EngineError::InvalidRequest
//!  [`InvalidId`]: EngineError::InvalidId
//!  [`KeyNotFound`]: EngineError::KeyNotFound
//!  [`Internal`]: EngineError::Internal
use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("{0}")]
    InvalidRequest(String),
    #[error("{0}")]
    InvalidId(String),
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("{0}")]
    KeyNotFound(String),
    #[error("{0}")]
    ExistingKey(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    Internal(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::InvalidRequest(a), Self::InvalidRequest(b)) => a == b,
            (Self::InvalidId(a), Self::InvalidId(b)) => a == b,
            (Self::InvalidCredentials, Self::InvalidCredentials) => true,
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::ExistingKey(a), Self::ExistingKey(b)) => a == b,
            (Self::Forbidden(a), Self::Forbidden(b)) => a == b,
            (Self::Internal(a), Self::Internal(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
