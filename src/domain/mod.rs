//! Plain data records and the validated payloads that create or change them.

pub mod address;
pub mod category;
pub mod ids;
pub mod order;
pub mod product;
pub mod user;
pub mod validation;

pub use address::*;
pub use category::*;
pub use ids::*;
pub use order::*;
pub use product::*;
pub use user::*;
pub use validation::*;
