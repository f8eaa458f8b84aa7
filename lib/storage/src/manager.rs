use crate::record::IndexRecord;
use crate::store::{ConfigStore, FileConfigStore, MemoryConfigStore};
use itemmap_core::{Error, Result, SearchConfiguration};
use itemmap_query::{
    build_query, FieldClassification, ParsedConfiguration, QueryDocument, QueryParser,
    UnknownFieldPolicy,
};
use std::path::Path;
use std::sync::Arc;

/// Whether a name can key a record: non-empty ASCII alphanumerics, `-`, `_`
/// and `.`, not starting with a dot
pub fn is_valid_index_name(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with('.')
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}

/// Index records and their search configurations.
///
/// Reads and writes are whole-record; concurrent edits of the same index
/// are last-write-wins.
#[derive(Clone)]
pub struct StorageManager {
    store: Arc<dyn ConfigStore>,
}

impl StorageManager {
    /// File-backed manager rooted at `data_dir`
    pub fn new<P: AsRef<Path>>(data_dir: P) -> Result<Self> {
        let dir = data_dir.as_ref().join("indexes");
        let store = FileConfigStore::new(&dir).map_err(|e| Error::Storage(e.to_string()))?;
        tracing::info!(dir = %dir.display(), "index records on disk");
        Ok(Self::with_store(Arc::new(store)))
    }

    pub fn in_memory() -> Self {
        Self::with_store(Arc::new(MemoryConfigStore::new()))
    }

    pub fn with_store(store: Arc<dyn ConfigStore>) -> Self {
        Self { store }
    }

    fn check_name(index_name: &str) -> Result<()> {
        if is_valid_index_name(index_name) {
            Ok(())
        } else {
            Err(Error::InvalidConfig(format!("invalid index name '{index_name}'")))
        }
    }

    /// Register an index with its initial query.
    ///
    /// Returns `false` when the index is already registered; the existing
    /// record is left untouched.
    pub fn register_index(
        &self,
        index_name: &str,
        file_name: &str,
        user_id: &str,
        classification: &FieldClassification,
    ) -> Result<bool> {
        Self::check_name(index_name)?;
        let record = IndexRecord::new(index_name, file_name, user_id, classification);
        let created = self
            .store
            .create(record)
            .map_err(|e| Error::Storage(e.to_string()))?;

        if created {
            tracing::info!(index = index_name, user = user_id, "registered index");
        } else {
            tracing::info!(index = index_name, "index already registered");
        }
        Ok(created)
    }

    pub fn get_index(&self, index_name: &str) -> Result<IndexRecord> {
        Self::check_name(index_name)?;
        self.store
            .get(index_name)
            .map_err(|e| Error::Storage(e.to_string()))?
            .ok_or_else(|| Error::IndexNotFound(index_name.to_string()))
    }

    /// Sorted index names, optionally only those registered by `user_id`
    pub fn list_indexes(&self, user_id: Option<&str>) -> Result<Vec<String>> {
        let mut names: Vec<String> = self
            .store
            .list()
            .map_err(|e| Error::Storage(e.to_string()))?
            .into_iter()
            .filter(|r| user_id.map_or(true, |u| r.user_id == u))
            .map(|r| r.index_name)
            .collect();
        names.sort();
        Ok(names)
    }

    /// The persisted query document.
    ///
    /// A stored document that cannot be read reads as empty, so the
    /// configuration can still be opened and rebuilt.
    pub fn load_query(&self, index_name: &str) -> Result<QueryDocument> {
        let record = self.get_index(index_name)?;
        Ok(record.query_document().unwrap_or_else(|e| {
            tracing::warn!(index = index_name, error = %e, "stored query unreadable, using empty document");
            QueryDocument::empty()
        }))
    }

    /// Replace the persisted query document
    pub fn save_query(&self, index_name: &str, doc: &QueryDocument) -> Result<()> {
        let mut record = self.get_index(index_name)?;
        record.replace_query(doc);
        self.store
            .put(record)
            .map_err(|e| Error::Storage(e.to_string()))?;
        tracing::info!(index = index_name, "saved query document");
        Ok(())
    }

    /// Editable configuration of an index, seeded with its known fields
    pub fn load_configuration(
        &self,
        index_name: &str,
        policy: UnknownFieldPolicy,
    ) -> Result<ParsedConfiguration> {
        let record = self.get_index(index_name)?;
        let doc = record.query_document().unwrap_or_else(|e| {
            tracing::warn!(index = index_name, error = %e, "stored query unreadable, using empty document");
            QueryDocument::empty()
        });

        Ok(QueryParser::new()
            .index_name(index_name)
            .known_fields(record.known_fields())
            .unknown_fields(policy)
            .parse(&doc))
    }

    /// Validate, build and persist a configuration. Returns the saved document.
    pub fn save_configuration(&self, config: &SearchConfiguration) -> Result<QueryDocument> {
        config.validate()?;
        let doc = build_query(config);
        self.save_query(&config.index_name, &doc)?;
        Ok(doc)
    }
}
