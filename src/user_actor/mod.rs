//! Account store: users, their credentials and their addresses.

mod address;
pub mod entity;
pub mod error;
pub mod password;

pub use address::AddressFilter;
pub use entity::UserFilter;
pub use error::*;
