use crate::actor_framework::Entity;
use crate::domain::{Address, AddressCreate, AddressId, UserId};
use super::error::UserError;

#[derive(Debug, Clone)]
pub enum AddressFilter {
    Owner(UserId),
}

impl Entity for Address {
    const KIND: &'static str = "address";
    type Id = AddressId;
    type CreateParams = AddressCreate;
    type Patch = ();
    type Action = ();
    type ActionResult = ();
    type Filter = AddressFilter;
    type Error = UserError;

    fn id(&self) -> AddressId {
        self.id
    }

    fn from_create(id: AddressId, params: AddressCreate) -> Result<Self, UserError> {
        let AddressCreate { user_id, address } = params;
        Ok(Self {
            id,
            user_id,
            address_type: address.address_type,
            street_address: address.street_address,
            city: address.city,
            state: address.state,
            postal_code: address.postal_code,
            country: address.country,
            is_default: address.is_default,
        })
    }

    /// Addresses are replaced rather than edited.
    fn on_update(&mut self, _patch: ()) -> Result<(), UserError> {
        Ok(())
    }

    fn handle_action(&mut self, _action: ()) -> Result<(), UserError> {
        Ok(())
    }

    fn matches(&self, filter: &AddressFilter) -> bool {
        match filter {
            AddressFilter::Owner(user_id) => self.user_id == *user_id,
        }
    }
}
