//! Binding a source record into a query template
//!
//! A persisted query is a template: k-NN clauses name an embedding key in
//! their `vector` slot and term clauses match a placeholder. To find records
//! related to a given one, each clause is filled from that record's values.
//! Clauses whose field is empty on the record are removed, since there is
//! nothing to compare against.

use crate::clause::first_key;
use crate::document::QueryDocument;
use crate::embedder::{EmbedError, Embedder};
use ahash::AHashSet;
use itemmap_core::naming::{base_field_name, is_embedding_key};
use serde_json::{json, Value};

/// Fields holding comma-separated people lists. They are embedded with
/// duplicate names removed, so query text is de-duplicated the same way.
pub const DEFAULT_DEDUP_FIELDS: [&str; 4] = ["producers", "directors", "writers", "actors"];

#[derive(Debug, Clone, thiserror::Error)]
pub enum BindError {
    #[error("Record must be a JSON object")]
    RecordNotAnObject,

    #[error("Failed to embed field '{field}': {source}")]
    Embedding {
        field: String,
        #[source]
        source: EmbedError,
    },
}

/// Fills query templates from source records
pub struct QueryBinder<'a> {
    embedder: &'a dyn Embedder,
    dedup_fields: AHashSet<String>,
}

impl<'a> QueryBinder<'a> {
    pub fn new(embedder: &'a dyn Embedder) -> Self {
        Self {
            embedder,
            dedup_fields: DEFAULT_DEDUP_FIELDS.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Replace the set of fields whose values are de-duplicated before embedding
    pub fn with_dedup_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dedup_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Produce the executable search body for `record`
    pub fn bind(&self, template: &QueryDocument, record: &Value) -> Result<QueryDocument, BindError> {
        if !record.is_object() {
            return Err(BindError::RecordNotAnObject);
        }

        let mut doc = template.clone();
        for bucket in ["must", "should"] {
            let Some(clauses) = doc.clauses_mut(bucket) else {
                continue;
            };

            let mut bound = Vec::with_capacity(clauses.len());
            for mut clause in std::mem::take(clauses) {
                if self.bind_clause(&mut clause, record)? {
                    bound.push(clause);
                }
            }
            tracing::debug!(bucket, kept = bound.len(), "bound clauses");
            *clauses = bound;
        }

        Ok(doc)
    }

    /// Fill one clause in place. Returns `false` when it should be dropped.
    fn bind_clause(&self, clause: &mut Value, record: &Value) -> Result<bool, BindError> {
        let Some(function_score) = clause.get_mut("function_score").and_then(Value::as_object_mut)
        else {
            return Ok(true);
        };
        let Some(query) = function_score.get_mut("query") else {
            return Ok(true);
        };

        let name = if let Some(knn) = query.get_mut("knn") {
            let Some(key) = first_key(knn).map(str::to_string) else {
                return Ok(true);
            };
            let field = base_field_name(&key).to_string();

            let Some(mut text) = record_text(record.get(&field)) else {
                return Ok(false);
            };
            if self.dedup_fields.contains(&field) {
                text = remove_duplicate_names(&text);
            }

            let Some(target) = knn.get_mut(&key).and_then(Value::as_object_mut) else {
                return Ok(true);
            };
            let vector = self
                .embedder
                .embed(&text)
                .map_err(|source| BindError::Embedding { field, source })?;
            target.insert("vector".to_string(), json!(vector));
            key
        } else if let Some(term) = query.get_mut("term").and_then(Value::as_object_mut) {
            let Some(key) = term.keys().next().cloned() else {
                return Ok(true);
            };
            match record.get(&key) {
                Some(value) if !is_blank(value) => {
                    term.insert(key.clone(), value.clone());
                }
                _ => return Ok(false),
            }
            key
        } else {
            return Ok(true);
        };

        function_score
            .entry("_name")
            .or_insert_with(|| Value::String(format!("{name}_function")));
        Ok(true)
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

/// Text to embed for a record value, `None` when there is nothing to embed
fn record_text(value: Option<&Value>) -> Option<String> {
    let text = match value? {
        Value::Null => return None,
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s.clone()),
                Value::Null => None,
                other => Some(other.to_string()),
            })
            .collect::<Vec<_>>()
            .join(", "),
        other => other.to_string(),
    };
    (!text.trim().is_empty()).then_some(text)
}

/// Remove repeated names from a comma-separated list, keeping first occurrences
pub fn remove_duplicate_names(csv: &str) -> String {
    if csv.trim().is_empty() {
        return csv.to_string();
    }

    let mut seen = AHashSet::new();
    csv.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty() && seen.insert(*name))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Strip backend bookkeeping and embedding vectors from search hits.
///
/// Embedding keys are recognized by name alone: any `_source` key ending in
/// `Embedding` or `-embedding` is removed, including a data column that
/// merely happens to be named that way. Nothing in this crate queries the
/// backend; callers that do run it over the returned hits.
pub fn sanitize_hits(hits: &mut [Value]) {
    for hit in hits.iter_mut().filter_map(Value::as_object_mut) {
        hit.remove("_index");
        hit.remove("_id");
        if let Some(source) = hit.get_mut("_source").and_then(Value::as_object_mut) {
            source.retain(|key, _| !is_embedding_key(key));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build::build_query;
    use crate::embedder::HashingEmbedder;
    use itemmap_core::{FieldConfiguration, Placement, SearchConfiguration};

    struct FailingEmbedder;

    impl Embedder for FailingEmbedder {
        fn embed(&self, _text: &str) -> Result<Vec<f32>, EmbedError> {
            Err(EmbedError::Provider("offline".to_string()))
        }

        fn dimension(&self) -> usize {
            4
        }
    }

    fn template() -> QueryDocument {
        let config = SearchConfiguration::new("titles")
            .with_fields(vec![
                FieldConfiguration::vector("title", Placement::Required, 0.5, 2.0),
                FieldConfiguration::vector("actors", Placement::Optional, 0.2, 1.0),
                FieldConfiguration::exact("genre", Placement::Optional, 1.5),
                FieldConfiguration::exact("isbn", Placement::Optional, 1.0),
            ])
            .unwrap();
        build_query(&config)
    }

    #[test]
    fn test_bind_fills_and_names_clauses() {
        let embedder = HashingEmbedder::new(16);
        let record = json!({"title": "Heat", "actors": "Pacino, De Niro", "genre": "Crime", "isbn": ""});
        let doc = QueryBinder::new(&embedder).bind(&template(), &record).unwrap();

        let must = doc.clauses("must");
        assert_eq!(must.len(), 1);
        let knn = &must[0]["function_score"]["query"]["knn"]["titleEmbedding"];
        assert_eq!(knn["vector"], json!(embedder.embed("Heat").unwrap()));
        assert_eq!(knn["min_score"], json!("0.5"));
        assert_eq!(must[0]["function_score"]["_name"], json!("titleEmbedding_function"));

        let should = doc.clauses("should");
        assert_eq!(should.len(), 2);
        assert_eq!(should[1]["function_score"]["query"]["term"], json!({"genre": "Crime"}));
        assert_eq!(should[1]["function_score"]["_name"], json!("genre_function"));
    }

    #[test]
    fn test_bind_drops_clauses_without_record_values() {
        let embedder = HashingEmbedder::new(16);
        let doc = QueryBinder::new(&embedder)
            .bind(&template(), &json!({"title": "  ", "genre": null}))
            .unwrap();
        assert!(doc.clauses("must").is_empty());
        assert!(doc.clauses("should").is_empty());
    }

    #[test]
    fn test_bind_dedups_people_fields() {
        let embedder = HashingEmbedder::new(16);
        let doc = QueryBinder::new(&embedder)
            .bind(&template(), &json!({"actors": "A, B, A"}))
            .unwrap();
        let vector = &doc.clauses("should")[0]["function_score"]["query"]["knn"]["actorsEmbedding"]["vector"];
        assert_eq!(vector, &json!(embedder.embed("A, B").unwrap()));
    }

    #[test]
    fn test_bind_keeps_existing_name() {
        let embedder = HashingEmbedder::new(4);
        let template = QueryDocument::try_from(json!({
            "query": {"bool": {"should": [
                {"function_score": {"query": {"term": {"genre": "genre"}}, "_name": "custom"}}
            ]}}
        }))
        .unwrap();
        let doc = QueryBinder::new(&embedder)
            .bind(&template, &json!({"genre": "Drama"}))
            .unwrap();
        assert_eq!(doc.clauses("should")[0]["function_score"]["_name"], json!("custom"));
    }

    #[test]
    fn test_bind_errors() {
        let embedder = FailingEmbedder;
        let binder = QueryBinder::new(&embedder);
        assert!(matches!(
            binder.bind(&template(), &json!({"title": "Heat"})),
            Err(BindError::Embedding { field, .. }) if field == "title"
        ));
        assert!(matches!(
            binder.bind(&template(), &json!(["not", "a", "record"])),
            Err(BindError::RecordNotAnObject)
        ));
    }

    #[test]
    fn test_bind_with_custom_dedup_fields() {
        let embedder = HashingEmbedder::new(16);
        let record = json!({"title": "Heat, Heat", "actors": "A, B, A"});

        let doc = QueryBinder::new(&embedder)
            .with_dedup_fields(["title"])
            .bind(&template(), &record)
            .unwrap();

        let title = &doc.clauses("must")[0]["function_score"]["query"]["knn"]["titleEmbedding"]["vector"];
        assert_eq!(title, &json!(embedder.embed("Heat").unwrap()));
        let actors = &doc.clauses("should")[0]["function_score"]["query"]["knn"]["actorsEmbedding"]["vector"];
        assert_eq!(actors, &json!(embedder.embed("A, B, A").unwrap()));
    }

    #[test]
    fn test_remove_duplicate_names() {
        assert_eq!(remove_duplicate_names("Ann, Bob,Ann , Cy"), "Ann, Bob, Cy");
        assert_eq!(remove_duplicate_names("  "), "  ");
        assert_eq!(remove_duplicate_names("Solo"), "Solo");
    }

    #[test]
    fn test_sanitize_hits() {
        let mut hits = vec![json!({
            "_index": "titles",
            "_id": "1",
            "_score": 3.2,
            "_source": {"title": "Heat", "titleEmbedding": [0.1], "plot-embedding": [0.2]}
        })];
        sanitize_hits(&mut hits);
        assert_eq!(hits[0], json!({"_score": 3.2, "_source": {"title": "Heat"}}));
    }
}
