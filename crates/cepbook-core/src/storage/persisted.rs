use anyhow::{Context, Result};
use serde::{de::DeserializeOwned, Serialize};
use tracing::warn;

use super::KeyValueStore;

/// Read and deserialize the value under `key`, or return `default`.
///
/// Missing keys, unreadable stores and values that no longer parse as `T`
/// all yield the default. The last two are logged; none reach the caller.
pub fn read<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str, default: T) -> T {
    let raw = match store.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return default,
        Err(e) => {
            warn!(key = key, error = %e, "Failed to read stored value, using default");
            return default;
        }
    };

    match serde_json::from_str(&raw) {
        Ok(value) => value,
        Err(e) => {
            warn!(key = key, error = %e, "Stored value is corrupt, using default");
            default
        }
    }
}

/// Serialize `value` and replace whatever is stored under `key`
pub fn write<T: Serialize + ?Sized>(store: &dyn KeyValueStore, key: &str, value: &T) -> Result<()> {
    let contents = serde_json::to_string(value)
        .with_context(|| format!("Failed to serialize value for {}", key))?;
    store.set(key, &contents)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Address, SavedAddress};
    use crate::storage::{FileStore, MemoryStore};

    struct BrokenStore;

    impl KeyValueStore for BrokenStore {
        fn get(&self, _key: &str) -> Result<Option<String>> {
            Err(anyhow::anyhow!("disk on fire"))
        }

        fn set(&self, _key: &str, _value: &str) -> Result<()> {
            Err(anyhow::anyhow!("disk on fire"))
        }
    }

    fn sample() -> Vec<SavedAddress> {
        vec![
            SavedAddress::new(
                "a".to_string(),
                Address {
                    cep: "01310-100".to_string(),
                    logradouro: "Avenida Paulista".to_string(),
                    bairro: "Bela Vista".to_string(),
                    localidade: "São Paulo".to_string(),
                    uf: "SP".to_string(),
                    ddd: Some("11".to_string()),
                    ..Default::default()
                },
            ),
            SavedAddress::new(
                "b".to_string(),
                Address {
                    cep: "20040-020".to_string(),
                    logradouro: "Avenida Rio Branco".to_string(),
                    complemento: "sala 301".to_string(),
                    localidade: "Rio de Janeiro".to_string(),
                    uf: "RJ".to_string(),
                    ..Default::default()
                },
            ),
        ]
    }

    #[test]
    fn test_missing_key_returns_default() {
        let store = MemoryStore::new();
        let value: Vec<SavedAddress> = read(&store, "saved-addresses", Vec::new());
        assert!(value.is_empty());
    }

    #[test]
    fn test_write_then_read_is_equal() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().to_path_buf()).unwrap();

        let items = sample();
        write(&store, "saved-addresses", &items).unwrap();
        let loaded: Vec<SavedAddress> = read(&store, "saved-addresses", Vec::new());
        assert_eq!(loaded, items);
        assert!(loaded.iter().all(|a| a.saved_at.is_some()));
    }

    #[test]
    fn test_corrupt_value_returns_default() {
        let store = MemoryStore::new();
        store.set("saved-addresses", "{not json").unwrap();

        let value: Vec<SavedAddress> = read(&store, "saved-addresses", Vec::new());
        assert!(value.is_empty());
    }

    #[test]
    fn test_schema_mismatch_returns_default() {
        let store = MemoryStore::new();
        store.set("saved-addresses", r#"{"version": 2}"#).unwrap();

        let value: Vec<SavedAddress> = read(&store, "saved-addresses", Vec::new());
        assert!(value.is_empty());
    }

    #[test]
    fn test_unreadable_store_returns_default() {
        let fallback = sample();
        let value: Vec<SavedAddress> = read(&BrokenStore, "saved-addresses", fallback.clone());
        assert_eq!(value, fallback);
    }

    #[test]
    fn test_write_failure_is_reported() {
        assert!(write(&BrokenStore, "saved-addresses", &sample()).is_err());
    }
}
