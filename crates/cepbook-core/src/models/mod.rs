//! Data models for postal addresses.
//!
//! - `Address`: an address as looked up or entered, without identity
//! - `SavedAddress`: an address committed to the stores, with its identifier

pub mod address;

pub use address::{Address, SavedAddress};
