//! Order store: orders with their line items and status machine.

mod actions;
pub mod entity;
pub mod error;

pub use actions::*;
pub use entity::OrderFilter;
pub use error::*;
