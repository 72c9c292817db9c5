//! Utility functions for CEP formatting and string display.

pub mod format;

pub use format::{age_display, format_cep, is_complete_cep, normalize_cep, truncate, CEP_DIGITS};
