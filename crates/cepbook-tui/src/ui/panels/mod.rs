//! Panel rendering for the two halves of the main screen.

pub mod form;
pub mod saved;
