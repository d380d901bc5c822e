//! Frappe REST client and types.

mod auth;
mod client;
pub mod error;
mod types;

pub use auth::{has_secret, store_secret, Auth, AuthScheme};
pub use client::FrappeClient;
pub use error::ApiError;
pub use types::{field_str, ListQuery, Record};
