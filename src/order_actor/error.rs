use thiserror::Error;

use crate::actor_framework::FrameworkError;
use crate::domain::{AddressId, OrderId, OrderStatus, ProductId, UserId, ValidationError};
use crate::product_actor::ProductError;
use crate::user_actor::UserError;

/// Errors that can occur during order operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum OrderError {
    #[error("Order not found: {0}")]
    NotFound(OrderId),
    #[error("Customer not found: {0}")]
    CustomerNotFound(UserId),
    #[error("Address not found: {0}")]
    AddressNotFound(AddressId),
    #[error("Product not found: {0}")]
    ProductNotFound(ProductId),
    #[error("Insufficient inventory for product {name} ({product_id}): requested {requested}, available {available}")]
    InsufficientInventory {
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
    #[error("Order {order_id} is {status}; cannot {attempted}")]
    InvalidState {
        order_id: OrderId,
        status: OrderStatus,
        attempted: String,
    },
    #[error("Customer {customer_id} is not authorized to access order {order_id}")]
    Forbidden { order_id: OrderId, customer_id: UserId },
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

impl OrderError {
    /// Status a request layer should answer with.
    pub fn status_code(&self) -> u16 {
        match self {
            OrderError::NotFound(_)
            | OrderError::CustomerNotFound(_)
            | OrderError::AddressNotFound(_)
            | OrderError::ProductNotFound(_) => 404,
            OrderError::InsufficientInventory { .. }
            | OrderError::InvalidState { .. }
            | OrderError::Validation(_) => 400,
            OrderError::InventoryOverflow { .. } => 409,
            OrderError::Forbidden { .. } => 403,
            OrderError::ActorCommunicationError(_) => 503,
        }
    }
}

impl From<FrameworkError<OrderId>> for OrderError {
    fn from(err: FrameworkError<OrderId>) -> Self {
        match err {
            FrameworkError::NotFound { id, .. } => OrderError::NotFound(id),
            other => OrderError::ActorCommunicationError(other.to_string()),
        }
    }
}

impl From<ProductError> for OrderError {
    fn from(err: ProductError) -> Self {
        match err {
            ProductError::NotFound(id) => OrderError::ProductNotFound(id),
            ProductError::InsufficientStock {
                product_id,
                name,
                requested,
                available,
            } => OrderError::InsufficientInventory {
                product_id,
                name,
                requested,
                available,
            },
            ProductError::InventoryOverflow {
                product_id,
                inventory,
                restock,
            } => OrderError::InventoryOverflow {
                product_id,
                inventory,
                restock,
            },
            ProductError::Validation(err) => OrderError::Validation(err),
            other => OrderError::ActorCommunicationError(other.to_string()),
        }
    }
}

impl From<UserError> for OrderError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::NotFound(id) => OrderError::CustomerNotFound(id),
            UserError::AddressNotFound(id) => OrderError::AddressNotFound(id),
            UserError::Validation(err) => OrderError::Validation(err),
            other => OrderError::ActorCommunicationError(other.to_string()),
        }
    }
}
