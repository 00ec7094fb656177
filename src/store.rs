//! Durable log record storage
//!
//! Records are keyed by `(severity, timestamp)` (see [`RecordKey`]). A put on
//! an existing key replaces the previous record.

use crate::error::{Result, RouterError};
use crate::types::{LogRecord, RecordKey, Severity};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Trait for durable log stores
#[async_trait]
pub trait LogStore: Send + Sync {
    /// Write a record and return it as stored
    async fn put(&self, record: &LogRecord) -> Result<LogRecord>;

    /// Load one record by key
    async fn get(&self, key: &RecordKey) -> Result<Option<LogRecord>>;

    /// Most recent records first, optionally restricted to one severity
    async fn list(&self, severity: Option<Severity>, limit: usize) -> Result<Vec<LogRecord>>;

    /// Store name (e.g., "sled", "memory")
    fn name(&self) -> &str;
}

fn newest_first(mut records: Vec<LogRecord>, limit: usize) -> Vec<LogRecord> {
    records.sort_by(|a, b| b.timestamp().cmp(&a.timestamp()));
    records.truncate(limit);
    records
}

/// Sled-backed log store
///
/// One tree holds every record under its encoded key. Each put is flushed
/// before returning.
pub struct SledLogStore {
    db: sled::Db,
    tree: sled::Tree,
}

impl SledLogStore {
    /// Open (or create) the database at `path` and the named tree
    pub fn open(path: impl AsRef<Path>, tree: &str) -> Result<Self> {
        let path = path.as_ref();
        let db = sled::open(path).map_err(|e| {
            RouterError::Persist(format!(
                "Failed to open sled database at {}: {}",
                path.display(),
                e
            ))
        })?;
        let tree = db.open_tree(tree).map_err(|e| {
            RouterError::Persist(format!("Failed to open tree '{}': {}", tree, e))
        })?;

        tracing::info!(path = %path.display(), "Log store opened");
        Ok(Self { db, tree })
    }

    /// Number of stored records
    pub fn len(&self) -> usize {
        self.tree.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// Flush every tree in the database
    pub async fn flush(&self) -> Result<()> {
        self.db
            .flush_async()
            .await
            .map_err(|e| RouterError::Persist(format!("Failed to flush database: {}", e)))?;
        Ok(())
    }

    /// Newest `limit` records under one severity prefix
    fn scan_newest(&self, severity: Severity, limit: usize) -> Result<Vec<LogRecord>> {
        let prefix = RecordKey::prefix(severity);
        let mut records = Vec::new();
        for entry in self.tree.scan_prefix(prefix.as_bytes()).rev().take(limit) {
            let (_, value) =
                entry.map_err(|e| RouterError::Persist(format!("Failed to scan: {}", e)))?;
            records.push(Self::decode(&value)?);
        }
        Ok(records)
    }

    fn decode(bytes: &[u8]) -> Result<LogRecord> {
        serde_json::from_slice(bytes)
            .map_err(|e| RouterError::Persist(format!("Corrupt log record: {}", e)))
    }
}

#[async_trait]
impl LogStore for SledLogStore {
    async fn put(&self, record: &LogRecord) -> Result<LogRecord> {
        let key = record.key().encode();
        let value = serde_json::to_vec(record)?;

        self.tree
            .insert(key.as_bytes(), value)
            .map_err(|e| RouterError::Persist(format!("Failed to write {}: {}", key, e)))?;
        self.tree
            .flush_async()
            .await
            .map_err(|e| RouterError::Persist(format!("Failed to flush {}: {}", key, e)))?;

        tracing::debug!(key = %key, "Log record stored");

        self.get(&record.key())
            .await?
            .ok_or_else(|| RouterError::Persist(format!("Record {} missing after write", key)))
    }

    async fn get(&self, key: &RecordKey) -> Result<Option<LogRecord>> {
        let key = key.encode();
        let value = self
            .tree
            .get(key.as_bytes())
            .map_err(|e| RouterError::Persist(format!("Failed to read {}: {}", key, e)))?;
        value.map(|bytes| Self::decode(&bytes)).transpose()
    }

    async fn list(&self, severity: Option<Severity>, limit: usize) -> Result<Vec<LogRecord>> {
        match severity {
            Some(severity) => self.scan_newest(severity, limit),
            None => {
                // Each severity prefix holds at most `limit` candidates
                let mut records = Vec::new();
                for severity in Severity::ALL {
                    records.extend(self.scan_newest(severity, limit)?);
                }
                Ok(newest_first(records, limit))
            }
        }
    }

    fn name(&self) -> &str {
        "sled"
    }
}

/// In-memory log store for testing
///
/// Clones share the same map.
#[derive(Clone, Default)]
pub struct MemoryLogStore {
    records: Arc<RwLock<BTreeMap<String, LogRecord>>>,
}

impl MemoryLogStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl LogStore for MemoryLogStore {
    async fn put(&self, record: &LogRecord) -> Result<LogRecord> {
        let key = record.key().encode();
        self.records.write().await.insert(key, record.clone());
        Ok(record.clone())
    }

    async fn get(&self, key: &RecordKey) -> Result<Option<LogRecord>> {
        Ok(self.records.read().await.get(&key.encode()).cloned())
    }

    async fn list(&self, severity: Option<Severity>, limit: usize) -> Result<Vec<LogRecord>> {
        let records = self.records.read().await;
        let matching: Vec<LogRecord> = records
            .values()
            .filter(|r| severity.map_or(true, |s| r.severity() == s))
            .cloned()
            .collect();
        Ok(newest_first(matching, limit))
    }

    fn name(&self) -> &str {
        "memory"
    }
}
