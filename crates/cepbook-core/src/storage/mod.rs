//! Local key-value persistence.
//!
//! This module provides the `KeyValueStore` primitive with two backends
//! and the typed `read`/`write` adapter on top of it:
//!
//! - `FileStore`: one JSON file per key, atomic replace on write
//! - `MemoryStore`: process-local map
//!
//! `read` never fails: missing or corrupt data falls back to a default.

pub mod kv;
pub mod persisted;

pub use kv::{FileStore, KeyValueStore, MemoryStore};
pub use persisted::{read, write};
