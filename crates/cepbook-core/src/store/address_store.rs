use std::collections::HashSet;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::config::Config;
use crate::models::{Address, SavedAddress};
use crate::storage::{self, FileStore, KeyValueStore, MemoryStore};

/// Key of the saved collection in the durable store
pub const SAVED_ADDRESSES_KEY: &str = "saved-addresses";

/// Key of the mirrored collection in the session store
pub const SESSION_ADDRESSES_KEY: &str = "session-addresses";

/// The user's saved addresses, kept in a durable store and mirrored to a
/// session-scoped store.
///
/// Every save or remove rewrites both stores as one commit: durable first,
/// then session. If the session write fails the durable store is put back,
/// so after any call that returns `Ok` both stores hold the same ids.
pub struct AddressStore {
    durable: Arc<dyn KeyValueStore>,
    session: Arc<dyn KeyValueStore>,
    saved: Vec<SavedAddress>,
    session_saved: Vec<SavedAddress>,
}

impl AddressStore {
    /// Load both collections. The durable one is authoritative; a session
    /// mirror that disagrees with it is rebuilt from it.
    pub fn open(durable: Arc<dyn KeyValueStore>, session: Arc<dyn KeyValueStore>) -> Self {
        let saved: Vec<SavedAddress> = storage::read(durable.as_ref(), SAVED_ADDRESSES_KEY, Vec::new());
        let seeded: Vec<SavedAddress> = storage::read(session.as_ref(), SESSION_ADDRESSES_KEY, Vec::new());
        debug!(saved = saved.len(), session = seeded.len(), "Address store loaded");

        let mut store = Self {
            durable,
            session,
            saved,
            session_saved: seeded,
        };

        if !same_ids(&store.saved, &store.session_saved) {
            info!(
                saved = store.saved.len(),
                session = store.session_saved.len(),
                "Session addresses out of sync, rebuilding from saved addresses"
            );
            store.session_saved = store.saved.clone();
            if let Err(e) = storage::write(store.session.as_ref(), SESSION_ADDRESSES_KEY, &store.session_saved) {
                warn!(error = %e, "Failed to rewrite session addresses");
            }
        }

        store
    }

    /// Open file-backed stores in the configured data and session directories
    pub fn from_config(config: &Config) -> Result<Self> {
        let data_dir = config.data_dir()?;
        let durable: Arc<dyn KeyValueStore> = Arc::new(
            FileStore::new(data_dir).context("Failed to open saved address store")?,
        );

        let session: Arc<dyn KeyValueStore> = match FileStore::new(config.session_dir()) {
            Ok(store) => Arc::new(store),
            Err(e) => {
                warn!(error = %e, "Session directory unavailable, keeping session addresses in memory");
                Arc::new(MemoryStore::new())
            }
        };

        Ok(Self::open(durable, session))
    }

    /// Saved addresses in insertion order
    pub fn saved_addresses(&self) -> &[SavedAddress] {
        &self.saved
    }

    /// Mirror of the saved addresses held in the session store
    pub fn session_addresses(&self) -> &[SavedAddress] {
        &self.session_saved
    }

    pub fn get(&self, id: &str) -> Option<&SavedAddress> {
        self.saved.iter().find(|a| a.id == id)
    }

    pub fn len(&self) -> usize {
        self.saved.len()
    }

    pub fn is_empty(&self) -> bool {
        self.saved.is_empty()
    }

    /// Assign a fresh identifier and append the address to both collections
    pub fn save_address(&mut self, address: Address) -> Result<SavedAddress> {
        let entry = SavedAddress::new(Uuid::new_v4().to_string(), address);

        let mut saved = self.saved.clone();
        saved.push(entry.clone());
        let mut session_saved = self.session_saved.clone();
        session_saved.push(entry.clone());

        self.commit(saved, session_saved)?;
        info!(id = %entry.id, cep = %entry.address.cep, "Address saved");
        Ok(entry)
    }

    /// Remove an address from both collections.
    /// Returns `Ok(false)` without touching either store if the id is unknown.
    pub fn remove_address(&mut self, id: &str) -> Result<bool> {
        if !self.saved.iter().any(|a| a.id == id) && !self.session_saved.iter().any(|a| a.id == id) {
            debug!(id = id, "Remove of unknown address ignored");
            return Ok(false);
        }

        let saved: Vec<SavedAddress> = self.saved.iter().filter(|a| a.id != id).cloned().collect();
        let session_saved: Vec<SavedAddress> =
            self.session_saved.iter().filter(|a| a.id != id).cloned().collect();

        self.commit(saved, session_saved)?;
        info!(id = id, "Address removed");
        Ok(true)
    }

    /// Write both stores, durable first. On a session failure the durable
    /// store is restored to the current in-memory state before returning.
    fn commit(&mut self, saved: Vec<SavedAddress>, session_saved: Vec<SavedAddress>) -> Result<()> {
        storage::write(self.durable.as_ref(), SAVED_ADDRESSES_KEY, &saved)
            .context("Failed to write saved addresses")?;

        if let Err(e) = storage::write(self.session.as_ref(), SESSION_ADDRESSES_KEY, &session_saved) {
            if let Err(rollback) = storage::write(self.durable.as_ref(), SAVED_ADDRESSES_KEY, &self.saved) {
                error!(error = %rollback, "Failed to roll back saved addresses");
            }
            return Err(e.context("Failed to write session addresses"));
        }

        self.saved = saved;
        self.session_saved = session_saved;
        Ok(())
    }
}

fn same_ids(a: &[SavedAddress], b: &[SavedAddress]) -> bool {
    let a: HashSet<&str> = a.iter().map(|s| s.id.as_str()).collect();
    let b: HashSet<&str> = b.iter().map(|s| s.id.as_str()).collect();
    a == b
}

// ============================================================================
// Tests
// ============================================================================
