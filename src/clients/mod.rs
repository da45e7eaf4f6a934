//! Typed clients over the raw resource clients.
//!
//! The clients hold the cross-store orchestration (ownership checks, stock
//! reservation, compensation); the actors only ever see single-store messages.

#[macro_use]
mod macros;
pub mod order_client;
pub mod product_client;
pub mod user_client;

pub use order_client::*;
pub use product_client::*;
pub use user_client::*;
