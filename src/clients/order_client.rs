use tracing::{error, info, instrument, warn};

use crate::actor_framework::{Page, ResourceClient};
use crate::domain::{NewOrder, Order, OrderCreate, OrderId, OrderTransition, PricedLine, UserId, Valid};
use crate::order_actor::{OrderAction, OrderError, OrderFilter};
use super::{ProductClient, UserClient};

/// Client for the order store.
///
/// This client handles the order transactions: it validates the customer and
/// addresses, reserves stock in the catalog, and persists the order, undoing
/// the reservation if the order cannot be stored.
#[derive(Clone)]
pub struct OrderClient {
    orders: ResourceClient<Order>,
    users: UserClient,
    products: ProductClient,
    max_page_size: usize,
}

impl_client_methods!(OrderClient, orders: Order, OrderError, order, OrderError::NotFound);

impl OrderClient {
    pub fn new(orders: ResourceClient<Order>, users: UserClient, products: ProductClient, max_page_size: usize) -> Self {
        Self {
            orders,
            users,
            products,
            max_page_size,
        }
    }

    /// Places an order for `customer_id`.
    ///
    /// Stock for every line is taken in a single catalog step, so either all
    /// lines are reserved or inventory is left untouched.
    ///
    /// # Errors
    /// - `CustomerNotFound` / `AddressNotFound` for unknown references
    /// - `ProductNotFound` / `InsufficientInventory` from the reservation
    #[instrument(skip(self, new_order), fields(lines = new_order.items.len()))]
    pub async fn create_order(&self, customer_id: UserId, new_order: Valid<NewOrder>) -> Result<Order, OrderError> {
        info!("Processing create_order request");

        // Step 1: Validate customer and addresses
        self.users.require_user(customer_id).await?;
        for address_id in [new_order.shipping_address_id, new_order.billing_address_id]
            .into_iter()
            .flatten()
        {
            self.users.owned_address(customer_id, address_id).await?;
        }

        // Step 2: Reserve stock
        let new_order = new_order.into_inner();
        let stock_lines: Vec<_> = new_order
            .items
            .iter()
            .map(|item| (item.product_id, item.quantity))
            .collect();
        let reservations = self.products.reserve(&stock_lines).await.map_err(|e| {
            warn!(error = %e, "Stock reservation failed");
            OrderError::from(e)
        })?;
        info!("Stock reserved successfully");

        // Step 3: Price the lines
        let lines = new_order
            .items
            .iter()
            .zip(reservations)
            .map(|(item, reservation)| PricedLine {
                product_id: item.product_id,
                quantity: item.quantity,
                unit_price: item.unit_price.unwrap_or(reservation.unit_price),
            })
            .collect();

        // Step 4: Persist, handing the stock back if that fails
        let created = self
            .orders
            .create(OrderCreate {
                customer_id,
                lines,
                shipping_address_id: new_order.shipping_address_id,
                billing_address_id: new_order.billing_address_id,
            })
            .await;
        match created {
            Ok(order) => {
                info!(order_id = %order.id, total = %order.total_amount, "Order created");
                Ok(order)
            }
            Err(e) => {
                error!(error = %e, "Order persist failed; releasing reserved stock");
                if let Err(restock_err) = self.products.restock(&stock_lines).await {
                    error!(error = %restock_err, "Releasing reserved stock failed");
                }
                Err(e)
            }
        }
    }

    /// Cancels a pending order and puts its items back into stock.
    ///
    /// # Errors
    /// `InvalidState` unless the order is pending.
    #[instrument(skip(self))]
    pub async fn cancel_order(&self, order_id: OrderId) -> Result<Order, OrderError> {
        // Claim the order first so that a concurrent cancel cannot restock twice
        let cancelled = self.orders.perform_action(order_id, OrderAction::Cancel).await?;

        if let Err(e) = self.products.restock(&cancelled.stock_lines()).await {
            error!(error = %e, "Restock failed; reopening order");
            if let Err(reopen_err) = self.orders.perform_action(order_id, OrderAction::Reopen).await {
                error!(error = %reopen_err, "Reopening order failed");
            }
            return Err(e.into());
        }

        info!("Order cancelled");
        Ok(cancelled)
    }

    /// [`cancel_order`](Self::cancel_order) on behalf of a customer, who must own the order.
    #[instrument(skip(self))]
    pub async fn cancel_order_for(&self, customer_id: UserId, order_id: OrderId) -> Result<Order, OrderError> {
        self.get_order_for(customer_id, order_id).await?;
        self.cancel_order(order_id).await
    }

    /// # Errors
    /// `Forbidden` when the order belongs to another customer.
    #[instrument(skip(self))]
    pub async fn get_order_for(&self, customer_id: UserId, order_id: OrderId) -> Result<Order, OrderError> {
        let order = self.require_order(order_id).await?;
        if order.customer_id != customer_id {
            warn!(owner = %order.customer_id, "Order belongs to another customer");
            return Err(OrderError::Forbidden { order_id, customer_id });
        }
        Ok(order)
    }

    /// The customer's orders, newest first.
    #[instrument(skip(self))]
    pub async fn list_orders_by_customer(&self, customer_id: UserId, page: Page) -> Result<Vec<Order>, OrderError> {
        self.orders
            .list(OrderFilter::Customer(customer_id), page.clamp(self.max_page_size))
            .await
    }

    #[instrument(skip(self))]
    pub async fn list_orders(&self, page: Page) -> Result<Vec<Order>, OrderError> {
        self.orders.list(OrderFilter::All, page.clamp(self.max_page_size)).await
    }

    /// Moves an order one fulfilment step forward.
    #[instrument(skip(self, transition), fields(to = %transition.to))]
    pub async fn advance_order(&self, order_id: OrderId, transition: Valid<OrderTransition>) -> Result<Order, OrderError> {
        let order = self
            .orders
            .perform_action(order_id, OrderAction::Advance(transition.into_inner()))
            .await?;
        info!(status = %order.status, "Order advanced");
        Ok(order)
    }

    /// Removes an order together with its items. Inventory is not touched.
    #[instrument(skip(self))]
    pub async fn delete_order(&self, order_id: OrderId) -> Result<Order, OrderError> {
        self.orders.delete(order_id).await
    }

    pub(crate) async fn shutdown(&self) -> Result<(), OrderError> {
        self.orders.shutdown().await
    }
}
