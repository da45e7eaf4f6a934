use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::actor_framework::{sequential_ids, ResourceActor};
use crate::clients::{OrderClient, ProductClient, UserClient};
use crate::config::SystemConfig;
use crate::domain::{Address, Category, Order, Product, User};
use super::SystemError;

/// The main application system that orchestrates all actors.
///
/// Responsible for starting up actors, wiring them together, and handling shutdown.
pub struct CommerceSystem {
    pub user_client: UserClient,
    pub product_client: ProductClient,
    pub order_client: OrderClient,
    handles: Vec<JoinHandle<()>>,
}

impl CommerceSystem {
    pub fn new(config: &SystemConfig) -> Self {
        let buffer = config.channel_buffer;
        let max_page_size = config.max_page_size;

        // 1. Account store
        let (user_actor, users) = ResourceActor::<User>::new(buffer, sequential_ids());
        let (address_actor, addresses) = ResourceActor::<Address>::new(buffer, sequential_ids());
        let user_client = UserClient::new(users, addresses, max_page_size);

        // 2. Catalog store
        let (product_actor, products) = ResourceActor::<Product>::new(buffer, sequential_ids());
        let (category_actor, categories) = ResourceActor::<Category>::new(buffer, sequential_ids());
        let product_client = ProductClient::new(products, categories, user_client.clone(), max_page_size);

        // 3. Orders, which talk to both stores
        let (order_actor, orders) = ResourceActor::<Order>::new(buffer, sequential_ids());
        let order_client = OrderClient::new(orders, user_client.clone(), product_client.clone(), max_page_size);

        let handles = vec![
            tokio::spawn(user_actor.run()),
            tokio::spawn(address_actor.run()),
            tokio::spawn(product_actor.run()),
            tokio::spawn(category_actor.run()),
            tokio::spawn(order_actor.run()),
        ];
        info!(actors = handles.len(), "Commerce system started");

        Self {
            user_client,
            product_client,
            order_client,
            handles,
        }
    }

    /// Stops the actors (orders first, since they depend on the stores) and waits for them.
    pub async fn shutdown(self) -> Result<(), SystemError> {
        info!("Shutting down system...");
        self.order_client
            .shutdown()
            .await
            .map_err(|e| SystemError::ShutdownSignal(e.to_string()))?;
        self.product_client
            .shutdown()
            .await
            .map_err(|e| SystemError::ShutdownSignal(e.to_string()))?;
        self.user_client
            .shutdown()
            .await
            .map_err(|e| SystemError::ShutdownSignal(e.to_string()))?;

        for handle in self.handles {
            if let Err(e) = handle.await {
                error!(error = %e, "Actor task failed");
                return Err(e.into());
            }
        }

        info!("System shutdown complete.");
        Ok(())
    }
}
