//! Index records
//!
//! One record per registered index: where its data came from, which of its
//! fields can be searched, and the persisted query document.

use chrono::{SecondsFormat, Utc};
use itemmap_core::Result;
use itemmap_query::{build_query, default_search_config, FieldClassification, QueryDocument};
use serde::{Deserialize, Serialize};

/// Current UTC time as `2026-01-31T09:15:02.117Z`
pub fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct IndexRecord {
    pub index_name: String,
    #[serde(default)]
    pub file_name: String,
    #[serde(default)]
    pub vector_field_list: Vec<String>,
    #[serde(default)]
    pub exact_field_list: Vec<String>,
    #[serde(default)]
    pub user_id: String,
    /// Serialized query document
    #[serde(default)]
    pub search_config: String,
    pub created_at: String,
    pub updated_at: String,
}

impl IndexRecord {
    /// Record for a newly registered index, carrying its initial query
    pub fn new(
        index_name: impl Into<String>,
        file_name: impl Into<String>,
        user_id: impl Into<String>,
        classification: &FieldClassification,
    ) -> Self {
        let index_name = index_name.into();
        let query = build_query(&default_search_config(index_name.clone(), classification));
        let now = timestamp();

        Self {
            index_name,
            file_name: file_name.into(),
            vector_field_list: classification.vector_fields(),
            exact_field_list: classification.exact_fields(),
            user_id: user_id.into(),
            search_config: query.to_json_string(),
            created_at: now.clone(),
            updated_at: now,
        }
    }

    /// Fields the index can be searched on: vector fields, then exact fields
    pub fn known_fields(&self) -> Vec<String> {
        let mut fields = self.vector_field_list.clone();
        for field in &self.exact_field_list {
            if !fields.contains(field) {
                fields.push(field.clone());
            }
        }
        fields
    }

    /// Parse the stored query document
    pub fn query_document(&self) -> Result<QueryDocument> {
        QueryDocument::from_json_str(&self.search_config)
    }

    /// Replace the whole query document
    pub fn replace_query(&mut self, doc: &QueryDocument) {
        self.search_config = doc.to_json_string();
        self.updated_at = timestamp();
    }
}
