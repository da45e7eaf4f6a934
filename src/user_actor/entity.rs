use chrono::Utc;

use crate::actor_framework::{Entity, UniqueKey};
use crate::domain::{User, UserCreate, UserId, UserPatch};
use super::error::UserError;

/// Queries supported by the user store.
#[derive(Debug, Clone)]
pub enum UserFilter {
    All,
    Username(String),
    Email(String),
}

impl Entity for User {
    const KIND: &'static str = "user";
    type Id = UserId;
    type CreateParams = UserCreate;
    type Patch = UserPatch;
    type Action = ();
    type ActionResult = ();
    type Filter = UserFilter;
    type Error = UserError;

    fn id(&self) -> UserId {
        self.id
    }

    /// Creates a new User from creation parameters.
    ///
    /// New accounts start active; timestamps are taken from the store's clock.
    fn from_create(id: UserId, params: UserCreate) -> Result<Self, UserError> {
        let now = Utc::now();
        Ok(Self {
            id,
            username: params.username,
            email: params.email,
            password_hash: params.password_hash,
            is_active: true,
            is_superuser: params.is_superuser,
            created_at: now,
            updated_at: now,
        })
    }

    fn unique_keys(&self) -> Vec<UniqueKey> {
        vec![
            UniqueKey::new("username", self.username.clone()),
            UniqueKey::new("email", self.email.clone()),
        ]
    }

    /// Updates the user's profile information.
    fn on_update(&mut self, patch: UserPatch) -> Result<(), UserError> {
        if let Some(username) = patch.username {
            self.username = username;
        }
        if let Some(email) = patch.email {
            self.email = email;
        }
        if let Some(password_hash) = patch.password_hash {
            self.password_hash = password_hash;
        }
        if let Some(is_active) = patch.is_active {
            self.is_active = is_active;
        }
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Handles user-specific actions.
    ///
    /// Currently, no custom actions are defined for users.
    fn handle_action(&mut self, _action: ()) -> Result<(), UserError> {
        Ok(())
    }

    fn matches(&self, filter: &UserFilter) -> bool {
        match filter {
            UserFilter::All => true,
            UserFilter::Username(username) => &self.username == username,
            UserFilter::Email(email) => &self.email == email,
        }
    }
}
