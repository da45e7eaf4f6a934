use std::ops::Deref;

use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;
use validator::{Validate, ValidationErrors};

/// Input rejected before it reaches a store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("validation failed: {message}")]
pub struct ValidationError {
    pub message: String,
}

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<ValidationErrors> for ValidationError {
    fn from(errors: ValidationErrors) -> Self {
        Self::new(errors.to_string())
    }
}

/// Rules the `validator` derive cannot express (decimal bounds, nested lines).
pub trait Checked: Validate {
    fn check(&self) -> Result<(), ValidationError> {
        Ok(())
    }
}

/// A payload that passed both its field constraints and its [`Checked`] rules.
///
/// The only way to build one is [`Valid::new`], so every client operation taking a
/// `Valid<T>` can rely on the input being well-formed.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Valid<T>(T);

impl<T: Checked> Valid<T> {
    pub fn new(input: T) -> Result<Self, ValidationError> {
        input.validate()?;
        input.check()?;
        Ok(Self(input))
    }
}

impl<T> Valid<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> Deref for Valid<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.0
    }
}

pub(crate) fn ensure_positive(field: &str, value: Decimal) -> Result<(), ValidationError> {
    if value > Decimal::ZERO {
        Ok(())
    } else {
        Err(ValidationError::new(format!("{field} must be greater than zero, got {value}")))
    }
}
