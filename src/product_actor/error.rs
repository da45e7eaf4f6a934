use thiserror::Error;

use crate::actor_framework::FrameworkError;
use crate::domain::{CategoryId, ProductId, UserId, ValidationError};
use crate::user_actor::UserError;

/// Errors that can occur during catalog operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ProductError {
    #[error("Product not found: {0}")]
    NotFound(ProductId),
    #[error("Category not found: {0}")]
    CategoryNotFound(CategoryId),
    #[error("Owner not found: {0}")]
    OwnerNotFound(UserId),
    #[error("Product with SKU {0} already exists")]
    DuplicateSku(String),
    #[error("Category {0} already exists")]
    DuplicateCategory(String),
    #[error("Insufficient inventory for product {name} ({product_id}): requested {requested}, available {available}")]
    InsufficientStock {
        product_id: ProductId,
        name: String,
        requested: u32,
        available: u32,
    },
    #[error("Restocking {restock} units of product {product_id} would overflow its inventory of {inventory}")]
    InventoryOverflow {
        product_id: ProductId,
        inventory: u32,
        restock: u32,
    },
    #[error("User {user_id} is not authorized to modify product {product_id}")]
    Forbidden { product_id: ProductId, user_id: UserId },
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

impl ProductError {
    /// Status a request layer should answer with.
    pub fn status_code(&self) -> u16 {
        match self {
            ProductError::NotFound(_) | ProductError::CategoryNotFound(_) | ProductError::OwnerNotFound(_) => 404,
            ProductError::DuplicateSku(_) | ProductError::DuplicateCategory(_) | ProductError::InventoryOverflow { .. } => {
                409
            }
            ProductError::InsufficientStock { .. } | ProductError::Validation(_) => 400,
            ProductError::Forbidden { .. } => 403,
            ProductError::ActorCommunicationError(_) => 503,
        }
    }
}

impl From<FrameworkError<ProductId>> for ProductError {
    fn from(err: FrameworkError<ProductId>) -> Self {
        match err {
            FrameworkError::NotFound { id, .. } => ProductError::NotFound(id),
            FrameworkError::Conflict { value, .. } => ProductError::DuplicateSku(value),
            other => ProductError::ActorCommunicationError(other.to_string()),
        }
    }
}

impl From<FrameworkError<CategoryId>> for ProductError {
    fn from(err: FrameworkError<CategoryId>) -> Self {
        match err {
            FrameworkError::NotFound { id, .. } => ProductError::CategoryNotFound(id),
            FrameworkError::Conflict { value, .. } => ProductError::DuplicateCategory(value),
            other => ProductError::ActorCommunicationError(other.to_string()),
        }
    }
}

/// Account lookups made while checking a product's owner.
impl From<UserError> for ProductError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::NotFound(id) => ProductError::OwnerNotFound(id),
            other => ProductError::ActorCommunicationError(other.to_string()),
        }
    }
}
