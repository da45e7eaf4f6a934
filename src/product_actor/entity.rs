use chrono::Utc;

use crate::actor_framework::{Entity, UniqueKey};
use crate::domain::{Product, ProductCreate, ProductId, ProductPatch, UserId};
use super::actions::{ProductAction, ProductActionResult, Reservation};
use super::error::ProductError;

/// Queries supported by the product store.
#[derive(Debug, Clone)]
pub enum ProductFilter {
    All,
    /// Case-insensitive substring of name or description.
    Search(String),
    Owner(UserId),
    Sku(String),
}

impl Entity for Product {
    const KIND: &'static str = "product";
    type Id = ProductId;
    type CreateParams = ProductCreate;
    type Patch = ProductPatch;
    type Action = ProductAction;
    type ActionResult = ProductActionResult;
    type Filter = ProductFilter;
    type Error = ProductError;

    fn id(&self) -> ProductId {
        self.id
    }

    /// Creates a new Product from creation parameters.
    ///
    /// Category ids must already have been checked by the caller.
    fn from_create(id: ProductId, params: ProductCreate) -> Result<Self, ProductError> {
        let ProductCreate { owner_id, product } = params;
        Ok(Self {
            id,
            name: product.name,
            description: product.description,
            price: product.price,
            inventory: product.inventory,
            sku: product.sku,
            image_url: product.image_url,
            owner_id,
            category_ids: product.category_ids.into_iter().collect(),
            created_at: Utc::now(),
            updated_at: None,
        })
    }

    fn unique_keys(&self) -> Vec<UniqueKey> {
        self.sku
            .iter()
            .map(|sku| UniqueKey::new("sku", sku.clone()))
            .collect()
    }

    /// Updates the product's editable fields.
    ///
    /// # Fields Updated
    /// - `name`, `description`, `price`, `inventory`, `sku`, `image_url`
    fn on_update(&mut self, patch: ProductPatch) -> Result<(), ProductError> {
        let ProductPatch {
            name,
            description,
            price,
            inventory,
            sku,
            image_url,
        } = patch;
        if let Some(name) = name {
            self.name = name;
        }
        if let Some(description) = description {
            self.description = Some(description);
        }
        if let Some(price) = price {
            self.price = price;
        }
        if let Some(inventory) = inventory {
            self.inventory = inventory;
        }
        if let Some(sku) = sku {
            self.sku = Some(sku);
        }
        if let Some(image_url) = image_url {
            self.image_url = Some(image_url);
        }
        self.updated_at = Some(Utc::now());
        Ok(())
    }

    /// Handles product-specific actions.
    ///
    /// # Actions
    /// - `CheckStock`: Returns the current stock level
    /// - `Reserve(amount)`: Decrements stock by the specified amount
    /// - `Restock(amount)`: Increments stock by the specified amount
    fn handle_action(&mut self, action: ProductAction) -> Result<ProductActionResult, ProductError> {
        match action {
            ProductAction::CheckStock => Ok(ProductActionResult::StockLevel(self.inventory)),
            ProductAction::Reserve(amount) => {
                let remaining = self.inventory.checked_sub(amount).ok_or_else(|| {
                    ProductError::InsufficientStock {
                        product_id: self.id,
                        name: self.name.clone(),
                        requested: amount,
                        available: self.inventory,
                    }
                })?;
                self.inventory = remaining;
                Ok(ProductActionResult::Reserved(Reservation {
                    product_id: self.id,
                    name: self.name.clone(),
                    quantity: amount,
                    unit_price: self.price,
                    remaining,
                }))
            }
            ProductAction::Restock(amount) => {
                self.inventory = self.inventory.checked_add(amount).ok_or(ProductError::InventoryOverflow {
                    product_id: self.id,
                    inventory: self.inventory,
                    restock: amount,
                })?;
                Ok(ProductActionResult::Restocked {
                    inventory: self.inventory,
                })
            }
        }
    }

    fn matches(&self, filter: &ProductFilter) -> bool {
        match filter {
            ProductFilter::All => true,
            ProductFilter::Search(query) => self.matches_query(query),
            ProductFilter::Owner(owner_id) => self.owner_id == *owner_id,
            ProductFilter::Sku(sku) => self.sku.as_deref() == Some(sku.as_str()),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use rust_decimal::Decimal;

    use super::*;

    fn product(inventory: u32) -> Product {
        Product {
            id: ProductId(3),
            name: "Kettle".into(),
            description: None,
            price: Decimal::new(2500, 2),
            inventory,
            sku: Some("KET-1".into()),
            image_url: None,
            owner_id: UserId(1),
            category_ids: BTreeSet::new(),
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    #[test]
    fn reserve_takes_stock_and_snapshots_price() {
        let mut kettle = product(4);
        let result = kettle.handle_action(ProductAction::Reserve(3)).unwrap();
        assert_eq!(
            result,
            ProductActionResult::Reserved(Reservation {
                product_id: ProductId(3),
                name: "Kettle".into(),
                quantity: 3,
                unit_price: Decimal::new(2500, 2),
                remaining: 1,
            })
        );
        assert_eq!(kettle.inventory, 1);
    }

    #[test]
    fn reserve_more_than_available_fails_without_change() {
        let mut kettle = product(2);
        let err = kettle.handle_action(ProductAction::Reserve(5)).unwrap_err();
        assert_eq!(
            err,
            ProductError::InsufficientStock {
                product_id: ProductId(3),
                name: "Kettle".into(),
                requested: 5,
                available: 2,
            }
        );
        assert_eq!(kettle.inventory, 2);
    }

    #[test]
    fn restock_is_the_inverse_of_reserve() {
        let mut kettle = product(10);
        kettle.handle_action(ProductAction::Reserve(7)).unwrap();
        kettle.handle_action(ProductAction::Restock(7)).unwrap();
        assert_eq!(kettle.inventory, 10);
    }

    #[test]
    fn restock_past_the_limit_fails_without_change() {
        let mut kettle = product(u32::MAX - 1);
        let err = kettle.handle_action(ProductAction::Restock(2)).unwrap_err();
        assert_eq!(
            err,
            ProductError::InventoryOverflow {
                product_id: ProductId(3),
                inventory: u32::MAX - 1,
                restock: 2,
            }
        );
        assert_eq!(kettle.inventory, u32::MAX - 1);
    }

    #[test]
    fn sku_filter_and_unique_key() {
        let kettle = product(1);
        assert!(kettle.matches(&ProductFilter::Sku("KET-1".into())));
        assert!(!kettle.matches(&ProductFilter::Sku("KET-2".into())));
        assert_eq!(kettle.unique_keys(), vec![UniqueKey::new("sku", "KET-1")]);
    }
}
