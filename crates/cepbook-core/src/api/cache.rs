use std::collections::HashMap;

use parking_lot::Mutex;

use crate::models::Address;

/// In-memory memo of lookup results, keyed by digits-only CEP.
///
/// Entries live as long as the cache does: no expiry, no eviction.
/// Shared between client clones through an `Arc`, so a lookup finished
/// in a spawned task is visible to the next lookup on the UI side.
#[derive(Debug, Default)]
pub struct AddressCache {
    entries: Mutex<HashMap<String, Address>>,
}

impl AddressCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<Address> {
        self.entries.lock().get(key).cloned()
    }

    pub fn insert(&self, key: String, address: Address) {
        self.entries.lock().insert(key, address);
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.lock().contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_entry_per_key() {
        let cache = AddressCache::new();
        assert!(cache.is_empty());

        let first = Address {
            cep: "01310-100".to_string(),
            logradouro: "Avenida Paulista".to_string(),
            ..Default::default()
        };
        let second = Address {
            logradouro: "Av. Paulista".to_string(),
            ..first.clone()
        };

        cache.insert("01310100".to_string(), first);
        cache.insert("01310100".to_string(), second.clone());

        assert_eq!(cache.len(), 1);
        assert!(cache.contains("01310100"));
        assert_eq!(cache.get("01310100"), Some(second));
        assert_eq!(cache.get("70040010"), None);
    }
}
