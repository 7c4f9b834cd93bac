/// Persistent metadata store
///
/// Records live in memory behind a lock and are written through to a JSON
/// snapshot on every mutation. Presence checks and reads are synchronous so
/// refresh decisions never wait on I/O.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tokio::fs;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::catalog::{AssetRecord, Identifier, Record, RecordKind, ShowRecord};
use crate::error::Result;

/// On-disk form of the store
#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreSnapshot {
    initialized: bool,
    saved_at: Option<DateTime<Utc>>,
    records: BTreeMap<String, Record>,
}

/// Key → record map plus the "a full refresh has completed" flag
#[derive(Debug, Clone)]
pub struct MetadataStore {
    /// Snapshot file, `None` for a purely in-memory store
    path: Option<PathBuf>,

    records: Arc<RwLock<HashMap<String, Record>>>,

    initialized: Arc<AtomicBool>,

    /// Bumped after every mutation
    generation: Arc<AtomicU64>,

    /// Serialises snapshot writes; holds the last generation written
    persisted: Arc<Mutex<u64>>,
}

impl MetadataStore {
    /// Open the store at `path`, loading the snapshot when one exists
    pub async fn open(path: PathBuf) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }

        let snapshot = Self::load_snapshot(&path).await?;
        let store = Self::from_snapshot(Some(path), snapshot);

        let stats = store.stats();
        info!(
            "📊 Metadata store opened: {} shows, {} assets, initialized={}",
            stats.shows, stats.assets, stats.initialized
        );

        Ok(store)
    }

    /// Load the snapshot at `path` without touching the file system.
    /// An unreadable snapshot is an error and is left where it is; changes
    /// made to the returned store are never written back.
    pub async fn open_read_only(path: &Path) -> Result<Self> {
        let snapshot = match fs::read_to_string(path).await {
            Ok(content) => serde_json::from_str(&content)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => StoreSnapshot::default(),
            Err(e) => return Err(e.into()),
        };
        Ok(Self::from_snapshot(None, snapshot))
    }

    /// A store that is never written to disk
    pub fn in_memory() -> Self {
        Self::from_snapshot(None, StoreSnapshot::default())
    }

    fn from_snapshot(path: Option<PathBuf>, snapshot: StoreSnapshot) -> Self {
        Self {
            path,
            records: Arc::new(RwLock::new(snapshot.records.into_iter().collect())),
            initialized: Arc::new(AtomicBool::new(snapshot.initialized)),
            generation: Arc::new(AtomicU64::new(0)),
            persisted: Arc::new(Mutex::new(0)),
        }
    }

    async fn load_snapshot(path: &Path) -> Result<StoreSnapshot> {
        let content = match fs::read_to_string(path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No store snapshot at {}, starting empty", path.display());
                return Ok(StoreSnapshot::default());
            }
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_str(&content) {
            Ok(snapshot) => Ok(snapshot),
            Err(e) => {
                let aside = path.with_extension("corrupt");
                warn!(
                    "Store snapshot {} is unreadable ({}), moving it to {}",
                    path.display(),
                    e,
                    aside.display()
                );
                fs::rename(path, &aside).await?;
                Ok(StoreSnapshot::default())
            }
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, Record>> {
        self.records.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, Record>> {
        self.records.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn has(&self, key: &str) -> bool {
        self.read().contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<Record> {
        self.read().get(key).cloned()
    }

    pub fn get_show(&self, id: &Identifier) -> Option<ShowRecord> {
        self.read()
            .get(&RecordKind::Show.key(id))
            .and_then(Record::as_show)
            .cloned()
    }

    pub fn get_asset(&self, id: &Identifier) -> Option<AssetRecord> {
        self.read()
            .get(&RecordKind::Asset.key(id))
            .and_then(Record::as_asset)
            .cloned()
    }

    /// Replace the record under `key` and write the snapshot through
    pub async fn set(&self, key: impl Into<String>, record: Record) -> Result<()> {
        let key = key.into();
        debug!("Storing record {}", key);
        self.write().insert(key, record);
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.persist(generation).await
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::SeqCst)
    }

    /// Record that a full refresh pass has completed. Never reset.
    pub async fn mark_initialized(&self) -> Result<()> {
        if self.initialized.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        info!("✅ Metadata store initialized");
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.persist(generation).await
    }

    /// Write the snapshot unless a later write already covered `generation`
    async fn persist(&self, generation: u64) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let mut persisted = self.persisted.lock().await;
        if *persisted >= generation {
            return Ok(());
        }

        let current = self.generation.load(Ordering::SeqCst);
        let snapshot = StoreSnapshot {
            initialized: self.is_initialized(),
            saved_at: Some(Utc::now()),
            records: self
                .read()
                .iter()
                .map(|(key, record)| (key.clone(), record.clone()))
                .collect(),
        };

        let temp_path = path.with_extension("json.tmp");
        fs::write(&temp_path, serde_json::to_vec_pretty(&snapshot)?).await?;
        fs::rename(&temp_path, path).await?;

        *persisted = current;
        Ok(())
    }

    /// All keys, sorted
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.read().keys().cloned().collect();
        keys.sort();
        keys
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    pub fn stats(&self) -> StoreStats {
        let records = self.read();
        let shows = records
            .values()
            .filter(|record| record.kind() == RecordKind::Show)
            .count();
        StoreStats {
            shows,
            assets: records.len() - shows,
            initialized: self.is_initialized(),
        }
    }
}

/// Store statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreStats {
    pub shows: usize,
    pub assets: usize,
    pub initialized: bool,
}
