//! cepbook core library.
//!
//! Looks up Brazilian postal addresses (CEP) through the ViaCEP service,
//! memoizes the results, and keeps a locally persisted list of saved
//! addresses. Front ends drive it through `FormController` and
//! `AddressStore`.
//!
//! - `api`: memoizing lookup client and the HTTP provider
//! - `storage`: key-value persistence primitives and the typed adapter
//! - `store`: the saved address collection
//! - `form`: the form workflow
//! - `models`, `config`, `utils`: shared types and helpers

pub mod api;
pub mod config;
pub mod form;
pub mod models;
pub mod storage;
pub mod store;
pub mod utils;

pub use api::{AddressCache, CepClient, CepProvider, LookupError, ViaCepProvider};
pub use config::Config;
pub use form::{FormController, FormField, FormState};
pub use models::{Address, SavedAddress};
pub use store::AddressStore;
