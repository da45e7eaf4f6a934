use std::cmp::Ordering;

use chrono::Utc;

use crate::actor_framework::Entity;
use crate::domain::{
    order_total, Order, OrderCreate, OrderId, OrderItem, OrderItemId, OrderStatus, UserId, ValidationError,
};
use super::actions::OrderAction;
use super::error::OrderError;

/// Queries supported by the order store.
#[derive(Debug, Clone)]
pub enum OrderFilter {
    All,
    Customer(UserId),
}

impl Order {
    fn invalid_state(&self, attempted: impl Into<String>) -> OrderError {
        OrderError::InvalidState {
            order_id: self.id,
            status: self.status,
            attempted: attempted.into(),
        }
    }
}

impl Entity for Order {
    const KIND: &'static str = "order";
    type Id = OrderId;
    type CreateParams = OrderCreate;
    type Patch = (); // Orders only change through actions
    type Action = OrderAction;
    type ActionResult = Order;
    type Filter = OrderFilter;
    type Error = OrderError;

    fn id(&self) -> OrderId {
        self.id
    }

    /// Creates a pending Order from already priced lines.
    ///
    /// The total is derived from the items here, so it always equals the sum of
    /// the persisted line totals.
    fn from_create(id: OrderId, params: OrderCreate) -> Result<Self, OrderError> {
        let items: Vec<OrderItem> = params
            .lines
            .into_iter()
            .zip(1u64..)
            .map(|(line, item_id)| OrderItem {
                id: OrderItemId(item_id),
                product_id: line.product_id,
                quantity: line.quantity,
                unit_price: line.unit_price,
            })
            .collect();
        let total_amount = order_total(&items)
            .ok_or_else(|| ValidationError::new("order total exceeds the representable amount"))?;
        Ok(Self {
            id,
            customer_id: params.customer_id,
            order_date: Utc::now(),
            total_amount,
            status: OrderStatus::Pending,
            shipping_address_id: params.shipping_address_id,
            billing_address_id: params.billing_address_id,
            payment_id: None,
            tracking_number: None,
            items,
        })
    }

    fn on_update(&mut self, _patch: ()) -> Result<(), OrderError> {
        Ok(())
    }

    /// Handles order status transitions.
    ///
    /// # Errors
    /// `InvalidState` for any transition the status machine does not allow.
    fn handle_action(&mut self, action: OrderAction) -> Result<Order, OrderError> {
        match action {
            OrderAction::Cancel => {
                if self.status != OrderStatus::Pending {
                    return Err(self.invalid_state("cancel (only pending orders can be cancelled)"));
                }
                self.status = OrderStatus::Cancelled;
            }
            OrderAction::Reopen => {
                if self.status != OrderStatus::Cancelled {
                    return Err(self.invalid_state("reopen"));
                }
                self.status = OrderStatus::Pending;
            }
            OrderAction::Advance(transition) => {
                if self.status.next() != Some(transition.to) {
                    return Err(self.invalid_state(format!("move to {}", transition.to)));
                }
                self.status = transition.to;
                if let Some(payment_id) = transition.payment_id {
                    self.payment_id = Some(payment_id);
                }
                if let Some(tracking_number) = transition.tracking_number {
                    self.tracking_number = Some(tracking_number);
                }
            }
        }
        Ok(self.clone())
    }

    fn matches(&self, filter: &OrderFilter) -> bool {
        match filter {
            OrderFilter::All => true,
            OrderFilter::Customer(customer_id) => self.customer_id == *customer_id,
        }
    }

    /// Newest first.
    fn list_order(a: &Self, b: &Self) -> Ordering {
        b.order_date.cmp(&a.order_date).then_with(|| b.id.cmp(&a.id))
    }
}
