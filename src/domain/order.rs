use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::ids::{AddressId, OrderId, OrderItemId, ProductId, UserId};
use super::validation::{ensure_positive, Checked, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// The status a fulfilment step moves to. Cancelling is not a fulfilment step.
    pub fn next(self) -> Option<OrderStatus> {
        match self {
            OrderStatus::Pending => Some(OrderStatus::Processing),
            OrderStatus::Processing => Some(OrderStatus::Shipped),
            OrderStatus::Shipped => Some(OrderStatus::Delivered),
            OrderStatus::Delivered | OrderStatus::Cancelled => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Processing => "processing",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A line of an order. The unit price is a snapshot taken when the order was placed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: OrderItemId,
    pub product_id: ProductId,
    pub quantity: u32,
    pub unit_price: Decimal,
}

impl OrderItem {
    /// `None` when the product does not fit in a `Decimal`.
    pub fn line_total(&self) -> Option<Decimal> {
        self.unit_price.checked_mul(Decimal::from(self.quantity))
    }
}

/// Represents a customer order together with the items it owns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub customer_id: UserId,
    pub order_date: DateTime<Utc>,
    pub total_amount: Decimal,
    pub status: OrderStatus,
    pub shipping_address_id: Option<AddressId>,
    pub billing_address_id: Option<AddressId>,
    pub payment_id: Option<String>,
    pub tracking_number: Option<String>,
    pub items: Vec<OrderItem>,
}

impl Order {
    /// `(product, quantity)` pairs this order holds out of the catalog.
    pub fn stock_lines(&self) -> Vec<(ProductId, u32)> {
        self.items.iter().map(|item| (item.product_id, item.quantity)).collect()
    }
}

/// Sum of the line totals, with no intermediate rounding. `None` on overflow.
pub fn order_total(items: &[OrderItem]) -> Option<Decimal> {
    items
        .iter()
        .try_fold(Decimal::ZERO, |total, item| total.checked_add(item.line_total()?))
}

/// One requested line. Without `unit_price` the current catalog price applies.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewOrderItem {
    pub product_id: ProductId,
    #[validate(range(min = 1))]
    pub quantity: u32,
    pub unit_price: Option<Decimal>,
}

impl Checked for NewOrderItem {
    fn check(&self) -> Result<(), ValidationError> {
        self.unit_price
            .map_or(Ok(()), |price| ensure_positive("unit_price", price))
    }
}

/// Payload for placing an order.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewOrder {
    #[validate(length(min = 1, message = "Order must have at least one item"))]
    pub items: Vec<NewOrderItem>,
    pub shipping_address_id: Option<AddressId>,
    pub billing_address_id: Option<AddressId>,
}

impl Checked for NewOrder {
    fn check(&self) -> Result<(), ValidationError> {
        for (index, item) in self.items.iter().enumerate() {
            item.validate()
                .map_err(|errors| ValidationError::new(format!("items[{index}]: {errors}")))?;
            item.check()?;
        }
        Ok(())
    }
}

/// A fulfilment step, with the metadata it may record.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct OrderTransition {
    pub to: OrderStatus,
    #[validate(length(min = 1, max = 100))]
    pub payment_id: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub tracking_number: Option<String>,
}

impl Checked for OrderTransition {}

impl OrderTransition {
    pub fn to(status: OrderStatus) -> Self {
        Self {
            to: status,
            payment_id: None,
            tracking_number: None,
        }
    }
}

/// A requested line after pricing.
#[derive(Debug, Clone, PartialEq)]
pub struct PricedLine {
    pub product_id: ProductId,
    pub quantity: u32,
    pub unit_price: Decimal,
}

/// Store-side creation params.
#[derive(Debug, Clone)]
pub struct OrderCreate {
    pub customer_id: UserId,
    pub lines: Vec<PricedLine>,
    pub shipping_address_id: Option<AddressId>,
    pub billing_address_id: Option<AddressId>,
}
