//! Saved address collection.
//!
//! `AddressStore` owns the user's saved addresses, assigns their
//! identifiers and keeps the durable and session stores in step.

pub mod address_store;

pub use address_store::{AddressStore, SAVED_ADDRESSES_KEY, SESSION_ADDRESSES_KEY};
