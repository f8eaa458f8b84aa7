//! Initial configuration for a newly registered index
//!
//! When a spreadsheet is registered, each column is classified as a vector
//! field, an exact field, or ignored. The first persisted query treats every
//! classified column as an optional clause with moderate defaults, and the
//! user tunes it from there.

use itemmap_core::naming::to_camel_case;
use itemmap_core::{FieldConfiguration, Placement, SearchConfiguration};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Result-set size of a freshly generated configuration
pub const INITIAL_MAX_RESULTS: usize = 15;

/// Similarity cutoff given to every vector field initially
pub const INITIAL_MIN_SCORE: f64 = 0.5;

/// Classification of a spreadsheet column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ColumnType {
    Vector,
    Exact,
    Ignore,
}

/// Column header -> classification, as submitted when an index is registered
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldClassification {
    columns: BTreeMap<String, ColumnType>,
}

impl FieldClassification {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_column(mut self, header: impl Into<String>, column_type: ColumnType) -> Self {
        self.columns.insert(header.into(), column_type);
        self
    }

    pub fn insert(&mut self, header: impl Into<String>, column_type: ColumnType) {
        self.columns.insert(header.into(), column_type);
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    fn names_of(&self, wanted: ColumnType) -> Vec<String> {
        self.columns
            .iter()
            .filter(|(_, t)| **t == wanted)
            .map(|(header, _)| to_camel_case(header))
            .collect()
    }

    /// Index field names of the vector columns
    pub fn vector_fields(&self) -> Vec<String> {
        self.names_of(ColumnType::Vector)
    }

    /// Index field names of the exact columns
    pub fn exact_fields(&self) -> Vec<String> {
        self.names_of(ColumnType::Exact)
    }

    /// Every field that can appear in a query: vector fields, then exact fields
    pub fn known_fields(&self) -> Vec<String> {
        let mut fields = self.vector_fields();
        fields.extend(self.exact_fields());
        fields
    }
}

/// Configuration persisted alongside a newly registered index
pub fn default_search_config(
    index_name: impl Into<String>,
    classification: &FieldClassification,
) -> SearchConfiguration {
    let mut config = SearchConfiguration::new(index_name)
        .with_max_results(INITIAL_MAX_RESULTS)
        .with_explain(true)
        .with_minimum_optional_matches(0);

    for name in classification.vector_fields() {
        config.upsert_field(FieldConfiguration::vector(
            name,
            Placement::Optional,
            INITIAL_MIN_SCORE,
            1.0,
        ));
    }
    for name in classification.exact_fields() {
        config.upsert_field(FieldConfiguration::exact(name, Placement::Optional, 1.0));
    }

    config
}

#[cfg(test)]
mod tests {
    use super::*;
    use itemmap_core::FieldKind;
    use serde_json::json;

    fn classification() -> FieldClassification {
        serde_json::from_value(json!({
            "Title": "VECTOR",
            "Release Year": "EXACT",
            "Internal Notes": "IGNORE",
            "plot_summary": "VECTOR"
        }))
        .unwrap()
    }

    #[test]
    fn test_field_lists_are_camel_cased() {
        let c = classification();
        assert_eq!(c.vector_fields(), vec!["title", "plotSummary"]);
        assert_eq!(c.exact_fields(), vec!["releaseYear"]);
        assert_eq!(c.known_fields(), vec!["title", "plotSummary", "releaseYear"]);
    }

    #[test]
    fn test_default_config() {
        let config = default_search_config("item001-user", &classification());
        assert_eq!(config.max_results, 15);
        assert!(config.explain);
        assert_eq!(config.minimum_optional_matches, 0);
        assert_eq!(config.fields().len(), 3);
        assert!(config.fields().iter().all(|f| f.placement == Placement::Optional));
        assert_eq!(config.field("title").unwrap().kind, FieldKind::vector(0.5, 1.0));
        assert_eq!(config.field("releaseYear").unwrap().kind, FieldKind::exact(1.0));
        assert!(!config.contains_field("internalNotes"));
    }
}
