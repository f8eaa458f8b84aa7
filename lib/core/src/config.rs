//! Search configuration
//!
//! The editable, in-memory form of an index's hybrid query. It is read from
//! storage keyed by index name, edited by a session, and written back whole.

use crate::error::{Error, Result};
use crate::field::{ExactParams, FieldConfiguration, FieldKind, Placement, VectorParams};
use ahash::AHashSet;
use serde::{Deserialize, Serialize};

/// Result-set size used when none is configured
pub const DEFAULT_MAX_RESULTS: usize = 10;

fn default_max_results() -> usize {
    DEFAULT_MAX_RESULTS
}

/// Per-index search configuration.
///
/// Field names are unique. Every constructor, `upsert_field` and
/// deserialization enforce that, so the field list can be treated as a map
/// that keeps its insertion order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", try_from = "RawSearchConfiguration")]
pub struct SearchConfiguration {
    pub index_name: String,
    pub max_results: usize,
    pub explain: bool,
    pub minimum_optional_matches: u32,
    fields: Vec<FieldConfiguration>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSearchConfiguration {
    #[serde(default)]
    index_name: String,
    #[serde(default = "default_max_results")]
    max_results: usize,
    #[serde(default)]
    explain: bool,
    #[serde(default)]
    minimum_optional_matches: u32,
    #[serde(default)]
    fields: Vec<FieldConfiguration>,
}

impl TryFrom<RawSearchConfiguration> for SearchConfiguration {
    type Error = Error;

    fn try_from(raw: RawSearchConfiguration) -> Result<Self> {
        let mut config = SearchConfiguration::new(raw.index_name).with_fields(raw.fields)?;
        config.max_results = raw.max_results;
        config.explain = raw.explain;
        config.minimum_optional_matches = raw.minimum_optional_matches;
        Ok(config)
    }
}

impl SearchConfiguration {
    /// Empty configuration with default settings
    pub fn new(index_name: impl Into<String>) -> Self {
        Self {
            index_name: index_name.into(),
            max_results: DEFAULT_MAX_RESULTS,
            explain: false,
            minimum_optional_matches: 0,
            fields: Vec::new(),
        }
    }

    /// Replace the field list, rejecting duplicate names
    pub fn with_fields(mut self, fields: Vec<FieldConfiguration>) -> Result<Self> {
        let mut seen = AHashSet::with_capacity(fields.len());
        for field in &fields {
            if !seen.insert(field.field_name.as_str()) {
                return Err(Error::DuplicateField(field.field_name.clone()));
            }
        }
        self.fields = fields;
        Ok(self)
    }

    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }

    pub fn with_explain(mut self, explain: bool) -> Self {
        self.explain = explain;
        self
    }

    pub fn with_minimum_optional_matches(mut self, minimum: u32) -> Self {
        self.minimum_optional_matches = minimum;
        self
    }

    /// Fields in insertion order
    #[inline]
    pub fn fields(&self) -> &[FieldConfiguration] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldConfiguration> {
        self.fields.iter().find(|f| f.field_name == name)
    }

    pub fn contains_field(&self, name: &str) -> bool {
        self.field(name).is_some()
    }

    /// Insert a field, or replace the existing entry with the same name in place
    pub fn upsert_field(&mut self, field: FieldConfiguration) {
        match self.fields.iter_mut().find(|f| f.field_name == field.field_name) {
            Some(existing) => *existing = field,
            None => self.fields.push(field),
        }
    }

    /// Switch a field's kind.
    ///
    /// Switching to vector or exact keeps the current parameters when the
    /// field already has that kind, and seeds defaults otherwise.
    pub fn set_kind(&mut self, name: &str, kind: &str) -> Result<()> {
        let field = self
            .fields
            .iter_mut()
            .find(|f| f.field_name == name)
            .ok_or_else(|| Error::UnknownField(name.to_string()))?;

        field.kind = match (kind, field.kind) {
            ("vector", current @ FieldKind::Vector(_)) => current,
            ("vector", _) => FieldKind::Vector(VectorParams::default()),
            ("exact", current @ FieldKind::Exact(_)) => current,
            ("exact", _) => FieldKind::Exact(ExactParams::default()),
            ("none", _) => FieldKind::None,
            (other, _) => {
                return Err(Error::InvalidConfig(format!("unknown field kind '{other}'")));
            }
        };
        Ok(())
    }

    pub fn set_placement(&mut self, name: &str, placement: Placement) -> Result<()> {
        let field = self
            .fields
            .iter_mut()
            .find(|f| f.field_name == name)
            .ok_or_else(|| Error::UnknownField(name.to_string()))?;
        field.placement = placement;
        Ok(())
    }

    /// Fields that take part in the query, in insertion order
    pub fn active_fields(&self) -> impl Iterator<Item = &FieldConfiguration> {
        self.fields.iter().filter(|f| f.is_active())
    }

    /// Names of fields set to `None`.
    ///
    /// These never reach the built query, so saving drops them from the
    /// persisted document for good.
    pub fn excluded_fields(&self) -> Vec<&str> {
        self.fields
            .iter()
            .filter(|f| !f.is_active())
            .map(|f| f.field_name.as_str())
            .collect()
    }

    /// Check the configuration before it is built and persisted
    pub fn validate(&self) -> Result<()> {
        if self.max_results == 0 {
            return Err(Error::InvalidConfig("maxResults must be positive".to_string()));
        }

        for field in &self.fields {
            if field.field_name.trim().is_empty() {
                return Err(Error::InvalidConfig("field name cannot be empty".to_string()));
            }

            let params: Vec<(&str, f64)> = match &field.kind {
                FieldKind::Vector(p) => vec![("minScore", p.min_score), ("weight", p.weight)],
                FieldKind::Exact(p) => vec![("weight", p.weight)],
                FieldKind::None => Vec::new(),
            };
            for (label, value) in params {
                if !value.is_finite() {
                    return Err(Error::InvalidConfig(format!(
                        "field '{}' has non-finite {}",
                        field.field_name, label
                    )));
                }
            }

            if let Some(weight) = field.kind.weight() {
                if weight <= 0.0 {
                    tracing::warn!(field = %field.field_name, weight, "non-positive field weight");
                }
            }
        }

        Ok(())
    }

    /// Compare the classification of every active field within `epsilon`.
    ///
    /// `None` fields are ignored on both sides, as are field order and the
    /// placement of inactive fields.
    pub fn approx_eq(&self, other: &SearchConfiguration, epsilon: f64) -> bool {
        let mine: Vec<_> = self.active_fields().collect();
        let theirs: Vec<_> = other.active_fields().collect();
        if mine.len() != theirs.len() {
            return false;
        }

        mine.iter().all(|field| {
            other.field(&field.field_name).is_some_and(|o| {
                o.placement == field.placement && o.kind.approx_eq(&field.kind, epsilon)
            })
        })
    }
}
