//! Single-slot result cache keyed by page URL, over a pluggable key-value store.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, TimeZone, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::Result;
use crate::score::ScoreReport;

/// Storage key holding the most recent entry
const CACHE_KEY: &str = "lastResult";

mod embedded {
    use refinery::embed_migrations;
    embed_migrations!("migrations");
}

/// Minimal persistent get/set surface
pub trait KeyValueStore: Send {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

/// In-process store, for tests and `--no-cache` runs
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(lock(&self.values).get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        lock(&self.values).insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// SQLite-backed store
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open or create the store at the configured location
    pub fn open() -> Result<Self> {
        Self::open_at(&Config::db_path()?)
    }

    pub fn open_at(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        Self::migrate(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::migrate(Connection::open_in_memory()?)
    }

    fn migrate(mut conn: Connection) -> Result<Self> {
        embedded::migrations::runner().run(&mut conn)?;
        Ok(Self { conn })
    }
}

impl KeyValueStore for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row("SELECT value FROM kv_store WHERE key = ?1", params![key], |row| {
                row.get::<_, String>(0)
            })
            .optional()?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT INTO kv_store (key, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![key, value, Utc::now().timestamp()],
        )?;
        Ok(())
    }
}

/// What the cache remembers about the last analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry {
    pub page_url: String,
    pub report: ScoreReport,
    #[serde(default = "epoch")]
    pub stored_at: DateTime<Utc>,
}

fn epoch() -> DateTime<Utc> {
    Utc.timestamp_opt(0, 0).single().unwrap_or_else(Utc::now)
}

/// Lock, ignoring poisoning
fn lock<T: ?Sized>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

pub struct ResultCache {
    store: Mutex<Box<dyn KeyValueStore>>,
}

impl ResultCache {
    pub fn new(store: impl KeyValueStore + 'static) -> Self {
        Self { store: Mutex::new(Box::new(store)) }
    }

    /// Cache backed by a fresh [`MemoryStore`]
    pub fn in_memory() -> Self {
        Self::new(MemoryStore::new())
    }

    /// The stored entry, whatever page it belongs to
    pub fn entry(&self) -> Result<Option<CacheEntry>> {
        let Some(raw) = lock(&self.store).get(CACHE_KEY)? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(entry) => Ok(Some(entry)),
            Err(e) => {
                tracing::warn!(error = %e, "ignoring unreadable cache entry");
                Ok(None)
            }
        }
    }

    /// Entry for exactly this URL; anything else is stale
    pub fn get_entry(&self, page_url: &str) -> Result<Option<CacheEntry>> {
        Ok(self.entry()?.filter(|entry| entry.page_url == page_url))
    }

    pub fn get(&self, page_url: &str) -> Result<Option<ScoreReport>> {
        Ok(self.get_entry(page_url)?.map(|entry| entry.report))
    }

    /// Replace the slot unconditionally
    pub fn put(&self, page_url: &str, report: &ScoreReport) -> Result<()> {
        let entry = CacheEntry {
            page_url: page_url.to_string(),
            report: report.clone(),
            stored_at: Utc::now(),
        };
        lock(&self.store).set(CACHE_KEY, &serde_json::to_string(&entry)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::score::Category;

    fn report_x() -> ScoreReport {
        ScoreReport::default()
            .with(Category::ShippingEmissions, 42, "Sea freight.")
            .with(Category::MaterialSustainability, 77, "Bamboo.")
    }

    #[test]
    fn test_round_trip() {
        let cache = ResultCache::in_memory();
        cache.put("url-1", &report_x()).unwrap();
        assert_eq!(cache.get("url-1").unwrap(), Some(report_x()));
        assert_eq!(cache.get("url-2").unwrap(), None);
    }

    #[test]
    fn test_exact_url_match_only() {
        let cache = ResultCache::in_memory();
        cache.put("https://www.amazon.com/dp/B01", &report_x()).unwrap();
        assert!(cache.get("https://www.amazon.com/dp/B01/").unwrap().is_none());
        assert!(cache.get("https://www.amazon.com/dp/B01?th=1").unwrap().is_none());
    }

    #[test]
    fn test_stale_entry_kept_until_overwritten() {
        let cache = ResultCache::in_memory();
        cache.put("url-1", &report_x()).unwrap();
        assert!(cache.get("url-2").unwrap().is_none());
        assert_eq!(cache.entry().unwrap().unwrap().page_url, "url-1");

        let other = ScoreReport::default().with(Category::CompanyPractices, 10, "");
        cache.put("url-2", &other).unwrap();
        assert!(cache.get("url-1").unwrap().is_none());
        assert_eq!(cache.get("url-2").unwrap(), Some(other));
    }

    #[test]
    fn test_corrupt_entry_treated_as_absent() {
        let store = MemoryStore::new();
        store.set(CACHE_KEY, "{broken").unwrap();
        let cache = ResultCache::new(store);
        assert!(cache.get("url-1").unwrap().is_none());
    }

    #[test]
    fn test_sqlite_store() {
        let store = SqliteStore::open_in_memory().unwrap();
        assert_eq!(store.get("k").unwrap(), None);
        store.set("k", "one").unwrap();
        store.set("k", "two").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("two"));
    }

    #[test]
    fn test_sqlite_backed_cache_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.db");
        {
            let cache = ResultCache::new(SqliteStore::open_at(&path).unwrap());
            cache.put("url-1", &report_x()).unwrap();
        }
        let cache = ResultCache::new(SqliteStore::open_at(&path).unwrap());
        assert_eq!(cache.get("url-1").unwrap(), Some(report_x()));
    }
}
