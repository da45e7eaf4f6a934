//! Order, catalog and account stores for a small storefront, each run as an actor.
//!
//! [`app_system::CommerceSystem`] starts the actors and hands out the typed
//! clients ([`clients::UserClient`], [`clients::ProductClient`],
//! [`clients::OrderClient`]) a request layer would call.

pub mod actor_framework;
pub mod app_system;
pub mod clients;
pub mod config;
pub mod domain;
pub mod order_actor;
pub mod product_actor;
pub mod seed;
pub mod user_actor;

#[cfg(test)]
mod mock_framework;
