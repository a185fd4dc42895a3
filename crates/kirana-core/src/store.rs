//! # Key-Value Store
//!
//! The persistence seam. Products, customers and the transaction log are
//! each stored as one JSON value under a fixed key.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Persistence Boundary                               │
//! │                                                                         │
//! │  PosContext ──► load_or_default / save ──► dyn KeyValueStore           │
//! │                                              │                          │
//! │                         ┌────────────────────┴───────────┐             │
//! │                         ▼                                ▼              │
//! │                   MemoryStore                    kirana-db mirror       │
//! │                   (tests, embedding)             (SQLite kv_store)      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::warn;

use crate::error::{StoreError, StoreResult};

/// The fixed keys the context reads and writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StoreKey {
    Products,
    Customers,
    Transactions,
}

impl StoreKey {
    pub const ALL: [StoreKey; 3] = [StoreKey::Products, StoreKey::Customers, StoreKey::Transactions];

    pub fn as_str(&self) -> &'static str {
        match self {
            StoreKey::Products => "products",
            StoreKey::Customers => "customers",
            StoreKey::Transactions => "transactions",
        }
    }
}

impl fmt::Display for StoreKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Synchronous string key-value storage.
pub trait KeyValueStore {
    /// Returns the raw value, or `None` if the key was never written.
    fn get(&self, key: &str) -> StoreResult<Option<String>>;

    fn set(&mut self, key: &str, value: String) -> StoreResult<()>;
}

/// Reads and decodes `key`. A missing key is `T::default()`.
///
/// Fails with `Malformed` if the stored JSON does not decode, or with the
/// store's own error if the read fails.
pub fn load<S, T>(store: &S, key: StoreKey) -> StoreResult<T>
where
    S: KeyValueStore + ?Sized,
    T: DeserializeOwned + Default,
{
    match store.get(key.as_str())? {
        Some(raw) => serde_json::from_str(&raw).map_err(|source| StoreError::Malformed {
            key: key.as_str().to_string(),
            source,
        }),
        None => Ok(T::default()),
    }
}

/// Like [`load`], but falls back to `T::default()` with a warning.
pub fn load_or_default<S, T>(store: &S, key: StoreKey) -> T
where
    S: KeyValueStore + ?Sized,
    T: DeserializeOwned + Default,
{
    load(store, key).unwrap_or_else(|e| {
        warn!(key = %key, error = %e, "Stored value unreadable, using defaults");
        T::default()
    })
}

/// Encodes `value` as JSON and writes it under `key`.
pub fn save<S, T>(store: &mut S, key: StoreKey, value: &T) -> StoreResult<()>
where
    S: KeyValueStore + ?Sized,
    T: Serialize + ?Sized,
{
    let json = serde_json::to_string(value).map_err(|source| StoreError::Malformed {
        key: key.as_str().to_string(),
        source,
    })?;
    store.set(key.as_str(), json)
}

// =============================================================================
// Memory Store
// =============================================================================

/// In-memory store that remembers which keys changed since the last flush.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: BTreeMap<String, String>,
    dirty: BTreeSet<String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }

    /// Builds a clean store from existing entries.
    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        MemoryStore {
            values: entries.into_iter().collect(),
            dirty: BTreeSet::new(),
        }
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn is_dirty(&self) -> bool {
        !self.dirty.is_empty()
    }

    /// Drains the changed keys with their current values.
    pub fn take_dirty(&mut self) -> Vec<(String, String)> {
        let keys = std::mem::take(&mut self.dirty);
        keys.into_iter()
            .filter_map(|k| self.values.get(&k).map(|v| (k.clone(), v.clone())))
            .collect()
    }

    /// Marks keys dirty again, e.g. after a failed flush.
    pub fn mark_dirty<I>(&mut self, keys: I)
    where
        I: IntoIterator<Item = String>,
    {
        self.dirty.extend(keys);
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: String) -> StoreResult<()> {
        self.values.insert(key.to_string(), value);
        self.dirty.insert(key.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::tests::product;
    use crate::catalog::Catalog;

    #[test]
    fn test_missing_key_gives_default() {
        let store = MemoryStore::new();
        let catalog: Catalog = load_or_default(&store, StoreKey::Products);
        assert!(catalog.is_empty());
    }

    #[test]
    fn test_malformed_value_gives_default() {
        let mut store = MemoryStore::new();
        store.set("products", "{not json".to_string()).unwrap();

        let catalog: Catalog = load_or_default(&store, StoreKey::Products);
        assert!(catalog.is_empty());
    }

    #[test]
    fn test_strict_load_reports_malformed() {
        let mut store = MemoryStore::new();
        assert!(load::<_, Catalog>(&store, StoreKey::Products).unwrap().is_empty());

        store.set("products", "{not json".to_string()).unwrap();
        assert!(matches!(
            load::<_, Catalog>(&store, StoreKey::Products),
            Err(StoreError::Malformed { ref key, .. }) if key == "products"
        ));
    }

    #[test]
    fn test_save_then_load() {
        let mut store = MemoryStore::new();
        let catalog = Catalog::from_products(vec![product("1", 12000, 50, 500)]);

        save(&mut store, StoreKey::Products, &catalog).unwrap();
        let loaded: Catalog = load_or_default(&store, StoreKey::Products);
        assert_eq!(loaded, catalog);
    }

    #[test]
    fn test_dirty_tracking() {
        let mut store = MemoryStore::from_entries([("customers".to_string(), "[]".to_string())]);
        assert!(!store.is_dirty());

        store.set("products", "[]".to_string()).unwrap();
        let dirty = store.take_dirty();
        assert_eq!(dirty, vec![("products".to_string(), "[]".to_string())]);
        assert!(!store.is_dirty());

        store.mark_dirty(["products".to_string()]);
        assert!(store.is_dirty());
    }
}
