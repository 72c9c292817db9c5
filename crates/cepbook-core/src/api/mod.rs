//! Postal code lookup against the ViaCEP web service.
//!
//! This module provides the `CepClient`, which memoizes successful lookups
//! in an `AddressCache` and delegates cache misses to a `CepProvider`.

pub mod cache;
pub mod client;
pub mod error;

pub use cache::AddressCache;
pub use client::{CepClient, CepProvider, ViaCepProvider, DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS};
pub use error::LookupError;
