//! Index record stores
//!
//! Records are replaced whole on every write; the last writer wins.

use crate::record::IndexRecord;
use anyhow::{anyhow, Context, Result};
use atomicwrites::{AtomicFile, OverwriteBehavior};
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Persistence for index records, keyed by index name
pub trait ConfigStore: Send + Sync {
    fn get(&self, index_name: &str) -> Result<Option<IndexRecord>>;

    /// Insert or replace a record
    fn put(&self, record: IndexRecord) -> Result<()>;

    /// Insert a record unless one exists. Returns `false` if it did.
    fn create(&self, record: IndexRecord) -> Result<bool>;

    fn list(&self) -> Result<Vec<IndexRecord>>;
}

/// Records held in process memory
#[derive(Default)]
pub struct MemoryConfigStore {
    records: RwLock<HashMap<String, IndexRecord>>,
}

impl MemoryConfigStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ConfigStore for MemoryConfigStore {
    fn get(&self, index_name: &str) -> Result<Option<IndexRecord>> {
        Ok(self.records.read().get(index_name).cloned())
    }

    fn put(&self, record: IndexRecord) -> Result<()> {
        self.records.write().insert(record.index_name.clone(), record);
        Ok(())
    }

    fn create(&self, record: IndexRecord) -> Result<bool> {
        let mut records = self.records.write();
        if records.contains_key(&record.index_name) {
            return Ok(false);
        }
        records.insert(record.index_name.clone(), record);
        Ok(true)
    }

    fn list(&self) -> Result<Vec<IndexRecord>> {
        Ok(self.records.read().values().cloned().collect())
    }
}

/// One pretty-printed JSON file per index, written atomically
pub struct FileConfigStore {
    dir: PathBuf,
    write_lock: Mutex<()>,
}

impl FileConfigStore {
    pub fn new<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)
            .with_context(|| format!("creating record directory {}", dir.display()))?;
        Ok(Self {
            dir,
            write_lock: Mutex::new(()),
        })
    }

    fn record_path(&self, index_name: &str) -> PathBuf {
        self.dir.join(format!("{index_name}.json"))
    }

    fn write(&self, record: &IndexRecord, overwrite: OverwriteBehavior) -> Result<()> {
        let data = serde_json::to_vec_pretty(record)?;
        let path = self.record_path(&record.index_name);
        AtomicFile::new(&path, overwrite)
            .write(|f| f.write_all(&data))
            .map_err(|e| anyhow!("writing {}: {}", path.display(), e))
    }

    fn read(path: &Path) -> Result<IndexRecord> {
        let data = fs::read(path)?;
        serde_json::from_slice(&data).with_context(|| format!("decoding {}", path.display()))
    }
}

impl ConfigStore for FileConfigStore {
    fn get(&self, index_name: &str) -> Result<Option<IndexRecord>> {
        let path = self.record_path(index_name);
        if !path.exists() {
            return Ok(None);
        }
        Self::read(&path).map(Some)
    }

    fn put(&self, record: IndexRecord) -> Result<()> {
        let _guard = self.write_lock.lock();
        self.write(&record, OverwriteBehavior::AllowOverwrite)
    }

    fn create(&self, record: IndexRecord) -> Result<bool> {
        let _guard = self.write_lock.lock();
        if self.record_path(&record.index_name).exists() {
            return Ok(false);
        }
        self.write(&record, OverwriteBehavior::DisallowOverwrite)?;
        Ok(true)
    }

    fn list(&self) -> Result<Vec<IndexRecord>> {
        let mut records = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().and_then(|s| s.to_str()) != Some("json") {
                continue;
            }
            match Self::read(&path) {
                Ok(record) => records.push(record),
                Err(e) => tracing::warn!(path = %path.display(), error = %e, "skipping unreadable index record"),
            }
        }
        Ok(records)
    }
}
