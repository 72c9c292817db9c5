//! Address form state and workflow.
//!
//! - `fields`: the editable field set and per-field rules
//! - `controller`: the lookup/save state machine behind the form

pub mod controller;
pub mod fields;

pub use controller::{FormController, FormState, Notice, NoticeKind, SaveStatus, RESET_DELAY};
pub use fields::{AddressFields, FormField};
