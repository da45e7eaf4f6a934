use tracing::{debug, info, instrument, warn};

use crate::actor_framework::{Page, ResourceClient};
use crate::domain::{
    normalize_email, Address, AddressCreate, AddressId, NewAddress, NewUser, User, UserCreate, UserId, UserPatch,
    UserUpdate, Valid,
};
use crate::user_actor::password::{hash_password, verify_password};
use crate::user_actor::{AddressFilter, UserError, UserFilter};

/// Client for the account store (users and their addresses).
#[derive(Clone)]
pub struct UserClient {
    users: ResourceClient<User>,
    addresses: ResourceClient<Address>,
    max_page_size: usize,
}

impl_client_methods!(UserClient, users: User, UserError, user, UserError::NotFound);
impl_client_methods!(UserClient, addresses: Address, UserError, address, UserError::AddressNotFound);

impl UserClient {
    pub fn new(users: ResourceClient<User>, addresses: ResourceClient<Address>, max_page_size: usize) -> Self {
        Self {
            users,
            addresses,
            max_page_size,
        }
    }

    /// Registers a new account. The password is hashed before it reaches the store.
    ///
    /// # Errors
    /// `UsernameTaken` / `EmailTaken` when another account already holds them.
    #[instrument(skip(self, new_user), fields(username = %new_user.username))]
    pub async fn register(&self, new_user: Valid<NewUser>) -> Result<User, UserError> {
        let NewUser {
            username,
            email,
            password,
            is_superuser,
        } = new_user.into_inner();
        let password_hash = hash_password(password).await?;
        let user = self
            .users
            .create(UserCreate {
                username,
                email: normalize_email(&email),
                password_hash,
                is_superuser,
            })
            .await?;
        info!(user_id = %user.id, "User registered");
        Ok(user)
    }

    /// Checks a username/password pair.
    ///
    /// Unknown usernames and wrong passwords both yield `InvalidCredentials`.
    #[instrument(skip(self, password))]
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<User, UserError> {
        let Some(user) = self.get_user_by_username(username).await? else {
            warn!("Login for unknown username");
            return Err(UserError::InvalidCredentials);
        };
        if !verify_password(password.to_owned(), user.password_hash.clone()).await? {
            warn!(user_id = %user.id, "Login with wrong password");
            return Err(UserError::InvalidCredentials);
        }
        if !user.is_active {
            return Err(UserError::Inactive(user.id));
        }
        debug!(user_id = %user.id, "Authenticated");
        Ok(user)
    }

    /// Applies a profile update, re-hashing a new password.
    #[instrument(skip(self, update))]
    pub async fn update_user(&self, id: UserId, update: Valid<UserUpdate>) -> Result<User, UserError> {
        let UserUpdate {
            username,
            email,
            password,
            is_active,
        } = update.into_inner();
        let password_hash = match password {
            Some(password) => Some(hash_password(password).await?),
            None => None,
        };
        let patch = UserPatch {
            username,
            email: email.as_deref().map(normalize_email),
            password_hash,
            is_active,
        };
        self.users.update(id, patch).await
    }

    #[instrument(skip(self))]
    pub async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, UserError> {
        self.users.find(UserFilter::Username(username.to_owned())).await
    }

    #[instrument(skip(self))]
    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, UserError> {
        self.users.find(UserFilter::Email(normalize_email(email))).await
    }

    #[instrument(skip(self))]
    pub async fn list_users(&self, page: Page) -> Result<Vec<User>, UserError> {
        self.users.list(UserFilter::All, page.clamp(self.max_page_size)).await
    }

    #[instrument(skip(self, address))]
    pub async fn add_address(&self, user_id: UserId, address: Valid<NewAddress>) -> Result<Address, UserError> {
        self.require_user(user_id).await?;
        let address = self
            .addresses
            .create(AddressCreate {
                user_id,
                address: address.into_inner(),
            })
            .await?;
        debug!(address_id = %address.id, "Address added");
        Ok(address)
    }

    #[instrument(skip(self))]
    pub async fn list_addresses(&self, user_id: UserId) -> Result<Vec<Address>, UserError> {
        self.addresses
            .list(AddressFilter::Owner(user_id), Page::first(self.max_page_size))
            .await
    }

    /// Looks up an address that must belong to `user_id`.
    ///
    /// Someone else's address is reported as not found.
    #[instrument(skip(self))]
    pub async fn owned_address(&self, user_id: UserId, address_id: AddressId) -> Result<Address, UserError> {
        match self.get_address(address_id).await? {
            Some(address) if address.user_id == user_id => Ok(address),
            _ => Err(UserError::AddressNotFound(address_id)),
        }
    }

    #[instrument(skip(self))]
    pub async fn delete_address(&self, user_id: UserId, address_id: AddressId) -> Result<Address, UserError> {
        let address = self.require_address(address_id).await?;
        if address.user_id != user_id {
            return Err(UserError::Forbidden { user_id, address_id });
        }
        self.addresses.delete(address_id).await
    }

    pub(crate) async fn shutdown(&self) -> Result<(), UserError> {
        self.addresses.shutdown().await?;
        self.users.shutdown().await
    }
}
