//! Start-up data: the first superuser and an optional demo catalog.

use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;
use tracing::{info, instrument};

use crate::actor_framework::Page;
use crate::app_system::CommerceSystem;
use crate::config::BootstrapConfig;
use crate::domain::{
    Address, AddressType, Category, NewAddress, NewCategory, NewOrder, NewOrderItem, NewProduct, NewUser, Order,
    OrderStatus, OrderTransition, Product, User, Valid, ValidationError,
};
use crate::order_actor::OrderError;
use crate::product_actor::ProductError;
use crate::user_actor::UserError;

#[derive(Debug, Error)]
pub enum SeedError {
    #[error(transparent)]
    User(#[from] UserError),
    #[error(transparent)]
    Product(#[from] ProductError),
    #[error(transparent)]
    Order(#[from] OrderError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Everything [`seed_sample_data`] created or found already present.
#[derive(Debug, Clone, Serialize)]
pub struct SampleData {
    pub category: Category,
    pub product: Product,
    pub address: Address,
    pub order: Order,
}

pub const SAMPLE_SKU: &str = "TEST-001";
const SAMPLE_CATEGORY: &str = "Electronics";

/// Returns the configured superuser, registering it on first start.
#[instrument(skip_all, fields(username = %config.superuser_username))]
pub async fn ensure_superuser(system: &CommerceSystem, config: &BootstrapConfig) -> Result<User, SeedError> {
    if let Some(existing) = system
        .user_client
        .get_user_by_username(&config.superuser_username)
        .await?
    {
        return Ok(existing);
    }
    let user = system
        .user_client
        .register(Valid::new(NewUser {
            username: config.superuser_username.clone(),
            email: config.superuser_email.clone(),
            password: config.superuser_password.clone(),
            is_superuser: true,
        })?)
        .await?;
    info!(user_id = %user.id, "Superuser created");
    Ok(user)
}

/// Creates a category, a product, an address and a delivered order for `owner`.
/// Each piece that already exists is reused.
#[instrument(skip_all, fields(owner_id = %owner.id))]
pub async fn seed_sample_data(system: &CommerceSystem, owner: &User) -> Result<SampleData, SeedError> {
    let products = &system.product_client;

    let category = match products.get_category_by_name(SAMPLE_CATEGORY).await? {
        Some(category) => category,
        None => {
            products
                .create_category(Valid::new(NewCategory {
                    name: SAMPLE_CATEGORY.into(),
                    description: Some("Electronic devices and accessories".into()),
                })?)
                .await?
        }
    };

    let product = match products.get_product_by_sku(SAMPLE_SKU).await? {
        Some(product) => product,
        None => {
            products
                .create_product(
                    owner.id,
                    Valid::new(NewProduct {
                        name: "Test Product".into(),
                        description: Some("A test product for demonstration".into()),
                        price: Decimal::new(2999, 2),
                        inventory: 100,
                        sku: Some(SAMPLE_SKU.into()),
                        image_url: None,
                        category_ids: vec![category.id],
                    })?,
                )
                .await?
        }
    };

    let existing_address = system.user_client.list_addresses(owner.id).await?.into_iter().next();
    let address = match existing_address {
        Some(address) => address,
        None => {
            system
                .user_client
                .add_address(
                    owner.id,
                    Valid::new(NewAddress {
                        address_type: AddressType::Shipping,
                        street_address: "123 Test Street".into(),
                        city: "Test City".into(),
                        state: Some("TS".into()),
                        postal_code: "12345".into(),
                        country: "USA".into(),
                        is_default: true,
                    })?,
                )
                .await?
        }
    };

    let existing_order = system
        .order_client
        .list_orders_by_customer(owner.id, Page::first(1))
        .await?
        .into_iter()
        .next();
    let order = match existing_order {
        Some(order) => order,
        None => deliver_demo_order(system, owner, &product, &address).await?,
    };

    info!(product_id = %product.id, order_id = %order.id, "Sample data ready");
    Ok(SampleData {
        category,
        product,
        address,
        order,
    })
}

async fn deliver_demo_order(
    system: &CommerceSystem,
    owner: &User,
    product: &Product,
    address: &Address,
) -> Result<Order, SeedError> {
    let orders = &system.order_client;
    let mut order = orders
        .create_order(
            owner.id,
            Valid::new(NewOrder {
                items: vec![NewOrderItem {
                    product_id: product.id,
                    quantity: 1,
                    unit_price: None,
                }],
                shipping_address_id: Some(address.id),
                billing_address_id: None,
            })?,
        )
        .await?;
    while let Some(next) = order.status.next() {
        let mut transition = OrderTransition::to(next);
        match next {
            OrderStatus::Processing => transition.payment_id = Some(format!("demo-payment-{}", order.id)),
            OrderStatus::Shipped => transition.tracking_number = Some(format!("DEMO{:06}", order.id.0)),
            _ => {}
        }
        order = orders.advance_order(order.id, Valid::new(transition)?).await?;
    }
    Ok(order)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SystemConfig;

    fn bootstrap() -> BootstrapConfig {
        BootstrapConfig {
            superuser_username: "admin".into(),
            superuser_email: "admin@example.com".into(),
            superuser_password: "admin123".into(),
            seed_sample_data: true,
        }
    }

    #[tokio::test]
    async fn test_superuser_is_created_once() {
        let system = CommerceSystem::new(&SystemConfig::default());
        let first = ensure_superuser(&system, &bootstrap()).await.unwrap();
        assert!(first.is_superuser);
        let second = ensure_superuser(&system, &bootstrap()).await.unwrap();
        assert_eq!(first.id, second.id);
        system.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_sample_data_is_idempotent() {
        let system = CommerceSystem::new(&SystemConfig::default());
        let admin = ensure_superuser(&system, &bootstrap()).await.unwrap();

        let sample = seed_sample_data(&system, &admin).await.unwrap();
        assert_eq!(sample.order.status, OrderStatus::Delivered);
        assert_eq!(sample.order.total_amount, Decimal::new(2999, 2));
        assert!(sample.order.payment_id.is_some());
        assert!(sample.product.category_ids.contains(&sample.category.id));
        assert_eq!(system.product_client.check_stock(sample.product.id).await.unwrap(), 99);

        let again = seed_sample_data(&system, &admin).await.unwrap();
        assert_eq!(again.order.id, sample.order.id);
        assert_eq!(again.product.id, sample.product.id);
        assert_eq!(system.product_client.check_stock(sample.product.id).await.unwrap(), 99);
        system.shutdown().await.unwrap();
    }
}
