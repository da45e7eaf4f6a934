use std::fmt;

use serde::{Deserialize, Serialize};

/// Declares a `u64` identifier newtype so ids of different stores cannot be mixed up.
macro_rules! define_id {
    ($($(#[$meta:meta])* $name:ident;)+) => {
        $(
            $(#[$meta])*
            #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
            #[serde(transparent)]
            pub struct $name(pub u64);

            impl From<u64> for $name {
                fn from(value: u64) -> Self {
                    Self(value)
                }
            }

            impl fmt::Display for $name {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    write!(f, "{}", self.0)
                }
            }
        )+
    };
}

define_id! {
    /// Identifies a registered user (customer or product owner).
    UserId;
    AddressId;
    CategoryId;
    ProductId;
    OrderId;
    /// Identifies a line within its order; unique per order only.
    OrderItemId;
}
