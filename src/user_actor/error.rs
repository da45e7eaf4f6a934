use thiserror::Error;

use crate::actor_framework::FrameworkError;
use crate::domain::{AddressId, UserId, ValidationError};

/// Errors that can occur during account operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum UserError {
    #[error("User not found: {0}")]
    NotFound(UserId),
    #[error("Address not found: {0}")]
    AddressNotFound(AddressId),
    #[error("Username already registered: {0}")]
    UsernameTaken(String),
    #[error("Email already registered: {0}")]
    EmailTaken(String),
    #[error("Incorrect username or password")]
    InvalidCredentials,
    #[error("Inactive user: {0}")]
    Inactive(UserId),
    #[error("User {user_id} may not modify address {address_id}")]
    Forbidden { user_id: UserId, address_id: AddressId },
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("Password hashing error: {0}")]
    PasswordHash(String),
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

impl UserError {
    /// Status a request layer should answer with.
    pub fn status_code(&self) -> u16 {
        match self {
            UserError::NotFound(_) | UserError::AddressNotFound(_) => 404,
            UserError::UsernameTaken(_) | UserError::EmailTaken(_) => 409,
            UserError::InvalidCredentials => 401,
            UserError::Inactive(_) | UserError::Validation(_) => 400,
            UserError::Forbidden { .. } => 403,
            UserError::PasswordHash(_) => 500,
            UserError::ActorCommunicationError(_) => 503,
        }
    }
}

impl From<FrameworkError<UserId>> for UserError {
    fn from(err: FrameworkError<UserId>) -> Self {
        match err {
            FrameworkError::NotFound { id, .. } => UserError::NotFound(id),
            FrameworkError::Conflict { field: "email", value, .. } => UserError::EmailTaken(value),
            FrameworkError::Conflict { value, .. } => UserError::UsernameTaken(value),
            other => UserError::ActorCommunicationError(other.to_string()),
        }
    }
}

impl From<FrameworkError<AddressId>> for UserError {
    fn from(err: FrameworkError<AddressId>) -> Self {
        match err {
            FrameworkError::NotFound { id, .. } => UserError::AddressNotFound(id),
            other => UserError::ActorCommunicationError(other.to_string()),
        }
    }
}
