use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::ids::{CategoryId, ProductId, UserId};
use super::validation::{ensure_positive, Checked, ValidationError};

/// Represents a product in the catalog.
///
/// `inventory` is unsigned, so the stock level can never go below zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub inventory: u32,
    pub sku: Option<String>,
    pub image_url: Option<String>,
    pub owner_id: UserId,
    pub category_ids: BTreeSet<CategoryId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Product {
    /// Case-insensitive substring match on name or description.
    pub fn matches_query(&self, query: &str) -> bool {
        let needle = query.to_lowercase();
        self.name.to_lowercase().contains(&needle)
            || self
                .description
                .as_deref()
                .is_some_and(|description| description.to_lowercase().contains(&needle))
    }
}

/// Payload for creating a new product.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewProduct {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub inventory: u32,
    #[validate(length(min = 1, max = 50))]
    pub sku: Option<String>,
    #[validate(length(max = 255))]
    pub image_url: Option<String>,
    #[serde(default)]
    pub category_ids: Vec<CategoryId>,
}

impl Checked for NewProduct {
    fn check(&self) -> Result<(), ValidationError> {
        ensure_positive("price", self.price)
    }
}

/// Payload for updating an existing product. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ProductPatch {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub inventory: Option<u32>,
    #[validate(length(min = 1, max = 50))]
    pub sku: Option<String>,
    #[validate(length(max = 255))]
    pub image_url: Option<String>,
}

impl Checked for ProductPatch {
    fn check(&self) -> Result<(), ValidationError> {
        self.price.map_or(Ok(()), |price| ensure_positive("price", price))
    }
}

/// Store-side creation params.
#[derive(Debug, Clone)]
pub struct ProductCreate {
    pub owner_id: UserId,
    pub product: NewProduct,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Valid;

    fn new_product(name: &str, price: Decimal, inventory: u32) -> NewProduct {
        NewProduct {
            name: name.into(),
            description: None,
            price,
            inventory,
            sku: None,
            image_url: None,
            category_ids: Vec::new(),
        }
    }

    #[test]
    fn price_must_be_positive() {
        assert!(Valid::new(new_product("Lamp", Decimal::new(1999, 2), 3)).is_ok());
        let err = Valid::new(new_product("Lamp", Decimal::ZERO, 3)).unwrap_err();
        assert!(err.message.contains("price"));

        let patch = ProductPatch {
            price: Some(Decimal::new(-1, 0)),
            ..ProductPatch::default()
        };
        assert!(Valid::new(patch).is_err());
    }

    #[test]
    fn name_and_sku_lengths() {
        assert!(Valid::new(new_product("", Decimal::ONE, 0)).is_err());
        let mut product = new_product("Lamp", Decimal::ONE, 0);
        product.sku = Some("X".repeat(51));
        assert!(Valid::new(product).is_err());
    }

    #[test]
    fn query_matches_name_or_description_ignoring_case() {
        let product = Product {
            id: ProductId(1),
            name: "Desk Lamp".into(),
            description: Some("Warm LED light".into()),
            price: Decimal::ONE,
            inventory: 1,
            sku: None,
            image_url: None,
            owner_id: UserId(1),
            category_ids: BTreeSet::new(),
            created_at: Utc::now(),
            updated_at: None,
        };
        assert!(product.matches_query("lamp"));
        assert!(product.matches_query("led"));
        assert!(!product.matches_query("chair"));
    }
}
