//! Catalog store: products with their stock levels, and categories.

mod actions;
mod category;
pub mod entity;
pub mod error;

pub use actions::*;
pub use category::CategoryFilter;
pub use entity::ProductFilter;
pub use error::*;
