use serde::{Deserialize, Serialize};
use validator::Validate;

use super::ids::{AddressId, UserId};
use super::validation::Checked;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AddressType {
    Shipping,
    Billing,
}

/// A shipping or billing address belonging to one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Address {
    pub id: AddressId,
    pub user_id: UserId,
    pub address_type: AddressType,
    pub street_address: String,
    pub city: String,
    pub state: Option<String>,
    pub postal_code: String,
    pub country: String,
    pub is_default: bool,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewAddress {
    pub address_type: AddressType,
    #[validate(length(min = 1, max = 255))]
    pub street_address: String,
    #[validate(length(min = 1, max = 100))]
    pub city: String,
    #[validate(length(max = 100))]
    pub state: Option<String>,
    #[validate(length(min = 1, max = 20))]
    pub postal_code: String,
    #[validate(length(min = 1, max = 100))]
    pub country: String,
    #[serde(default)]
    pub is_default: bool,
}

impl Checked for NewAddress {}

#[derive(Debug, Clone)]
pub struct AddressCreate {
    pub user_id: UserId,
    pub address: NewAddress,
}
