//! System orchestration, startup, and shutdown logic.

pub mod commerce_system;
pub mod error;
pub mod tracing;

pub use commerce_system::*;
pub use error::*;
pub use self::tracing::*;
