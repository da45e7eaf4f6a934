use rust_decimal::Decimal;

use crate::domain::ProductId;

/// Custom actions for Product entities.
///
/// These are the only ways order processing touches the catalog.
#[derive(Debug, Clone)]
pub enum ProductAction {
    /// Checks the current stock level without modifying it.
    CheckStock,
    /// Takes units out of stock.
    ///
    /// # Errors
    /// Fails if the requested amount exceeds available stock.
    Reserve(u32),
    /// Puts units back into stock.
    Restock(u32),
}

/// Results from ProductActions - variants match 1:1 with ProductAction
#[derive(Debug, Clone, PartialEq)]
pub enum ProductActionResult {
    StockLevel(u32),
    Reserved(Reservation),
    Restocked { inventory: u32 },
}

/// What a successful reservation took, priced at the moment it was taken.
#[derive(Debug, Clone, PartialEq)]
pub struct Reservation {
    pub product_id: ProductId,
    pub name: String,
    pub quantity: u32,
    pub unit_price: Decimal,
    pub remaining: u32,
}
