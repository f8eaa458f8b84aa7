//! Query document -> configuration
//!
//! Reading never fails on structure: missing levels read as empty, clauses
//! that are not recognized are skipped, and unparseable numbers fall back to
//! their defaults. That keeps the configuration editable even when the
//! persisted document is partial or corrupt.

use crate::clause::{parse_clause, ParsedClause};
use crate::document::QueryDocument;
use ahash::AHashSet;
use itemmap_core::{
    FieldConfiguration, FieldKind, Placement, SearchConfiguration, DEFAULT_MAX_RESULTS,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// What to do with a field found in the document but not in the known set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnknownFieldPolicy {
    /// Add it to the configuration
    #[default]
    Adopt,
    /// Leave it out of the configuration
    Ignore,
}

/// Outcome of parsing a document
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedConfiguration {
    pub config: SearchConfiguration,
    /// Fields referenced by the document that were not in the known set,
    /// in the order they were met. Reported under either policy.
    pub discovered_fields: Vec<String>,
}

/// Reads query documents back into editable configurations
#[derive(Debug, Clone, Default)]
pub struct QueryParser {
    index_name: String,
    known_fields: Vec<String>,
    policy: UnknownFieldPolicy,
}

impl QueryParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn index_name(mut self, index_name: impl Into<String>) -> Self {
        self.index_name = index_name.into();
        self
    }

    /// Seed the field universe. Each known field starts as `None`.
    ///
    /// Without a known set every referenced field is adopted and none is
    /// reported as discovered.
    pub fn known_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.known_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn unknown_fields(mut self, policy: UnknownFieldPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn parse(&self, doc: &QueryDocument) -> ParsedConfiguration {
        let mut config = SearchConfiguration::new(self.index_name.clone())
            .with_max_results(read_size(doc.get("size")))
            .with_explain(doc.get("explain").and_then(Value::as_bool).unwrap_or(false))
            .with_minimum_optional_matches(read_minimum_should_match(
                doc.get("query")
                    .and_then(|q| q.get("bool"))
                    .and_then(|b| b.get("minimum_should_match")),
            ));

        let mut known: AHashSet<&str> = AHashSet::with_capacity(self.known_fields.len());
        for name in &self.known_fields {
            if known.insert(name.as_str()) {
                config.upsert_field(FieldConfiguration::none(name.clone()));
            }
        }

        let mut discovered: Vec<String> = Vec::new();

        for placement in [Placement::Required, Placement::Optional] {
            for clause in doc.clauses(placement.bucket()) {
                let Some(parsed) = parse_clause(clause) else {
                    tracing::debug!(bucket = placement.bucket(), "skipping unrecognized clause");
                    continue;
                };

                let name = parsed.field_name();
                if !self.known_fields.is_empty() && !known.contains(name) {
                    if !discovered.iter().any(|d| d == name) {
                        discovered.push(name.to_string());
                    }
                    if self.policy == UnknownFieldPolicy::Ignore {
                        continue;
                    }
                }

                let field = match parsed {
                    ParsedClause::Vector { field_name, params } => {
                        FieldConfiguration::new(field_name, FieldKind::Vector(params), placement)
                    }
                    ParsedClause::Exact { field_name, params } => {
                        FieldConfiguration::new(field_name, FieldKind::Exact(params), placement)
                    }
                };
                config.upsert_field(field);
            }
        }

        if !discovered.is_empty() {
            tracing::info!(
                index = %self.index_name,
                fields = ?discovered,
                policy = ?self.policy,
                "query references fields outside the known set"
            );
        }

        ParsedConfiguration {
            config,
            discovered_fields: discovered,
        }
    }
}

/// Parse a document, adopting every field it references
pub fn parse_query(doc: &QueryDocument) -> SearchConfiguration {
    QueryParser::new().parse(doc).config
}

/// A positive whole number, written as an integer, an integral float or a
/// numeric string. Anything else reads as the default size.
fn read_size(value: Option<&Value>) -> usize {
    let size = match value {
        Some(Value::Number(n)) => n.as_u64().or_else(|| n.as_f64().and_then(whole_number)),
        Some(Value::String(s)) => {
            let s = s.trim();
            s.parse::<u64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().and_then(whole_number))
        }
        _ => None,
    };
    size.filter(|&n| n > 0)
        .and_then(|n| usize::try_from(n).ok())
        .unwrap_or(DEFAULT_MAX_RESULTS)
}

fn whole_number(v: f64) -> Option<u64> {
    (v.is_finite() && v >= 1.0 && v.fract() == 0.0 && v <= u64::MAX as f64).then(|| v as u64)
}

fn read_minimum_should_match(value: Option<&Value>) -> u32 {
    let minimum = match value {
        Some(Value::Number(n)) => n.as_u64(),
        Some(Value::String(s)) => s.trim().parse::<u64>().ok(),
        _ => None,
    };
    minimum.and_then(|n| u32::try_from(n).ok()).unwrap_or(0)
}
