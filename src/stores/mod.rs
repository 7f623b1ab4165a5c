//! Storage layer for the keyboard shop. Provides storage for:
//! - The keyboard catalog with id assignment ([`CatalogStore`])
//! - User accounts with their carts and order histories ([`AccountStore`])
//!
//! Each store keeps its records in memory behind a single lock and rewrites
//! its whole JSON file after every mutation. The two stores are independent;
//! nothing is atomic across them.

mod accounts;
mod catalog;

pub use accounts::AccountStore;
pub use catalog::CatalogStore;
