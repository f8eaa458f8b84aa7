//! Configuration -> query document

use crate::clause::{exact_clause, vector_clause};
use crate::document::QueryDocument;
use itemmap_core::{FieldKind, Placement, SearchConfiguration};
use serde_json::{json, Map, Value};

/// Build the hybrid query document for a configuration.
///
/// Fields set to `None` are dropped. Vector clauses come first, then exact
/// clauses, each in the configuration's field order, and each clause goes
/// to `must` or `should` by its field's placement. An exact clause matches
/// its own field name until a record is bound into the query.
pub fn build_query(config: &SearchConfiguration) -> QueryDocument {
    let mut must: Vec<Value> = Vec::new();
    let mut should: Vec<Value> = Vec::new();

    let vector_fields = config
        .fields()
        .iter()
        .filter_map(|f| match &f.kind {
            FieldKind::Vector(params) => Some((f, vector_clause(&f.field_name, params))),
            _ => None,
        });
    let exact_fields = config
        .fields()
        .iter()
        .filter_map(|f| match &f.kind {
            FieldKind::Exact(params) => Some((
                f,
                exact_clause(&f.field_name, Value::String(f.field_name.clone()), params),
            )),
            _ => None,
        });

    for (field, clause) in vector_fields.chain(exact_fields) {
        match field.placement {
            Placement::Required => must.push(clause),
            Placement::Optional => should.push(clause),
        }
    }

    tracing::debug!(
        index = %config.index_name,
        must = must.len(),
        should = should.len(),
        "built query document"
    );

    let mut doc = Map::new();
    doc.insert("size".to_string(), json!(config.max_results));
    doc.insert("explain".to_string(), json!(config.explain));
    doc.insert(
        "query".to_string(),
        json!({
            "bool": {
                "minimum_should_match": config.minimum_optional_matches.to_string(),
                "must": must,
                "should": should,
            }
        }),
    );
    QueryDocument::from_map(doc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use itemmap_core::FieldConfiguration;

    #[test]
    fn test_single_required_vector_field() {
        let config = SearchConfiguration::new("titles")
            .with_max_results(5)
            .with_fields(vec![FieldConfiguration::vector("title", Placement::Required, 0.5, 2.0)])
            .unwrap();

        assert_eq!(
            build_query(&config).into_value(),
            json!({
                "size": 5,
                "explain": false,
                "query": {"bool": {
                    "minimum_should_match": "0",
                    "must": [{"function_score": {
                        "query": {"knn": {"titleEmbedding": {"vector": "titleEmbedding", "min_score": "0.5"}}},
                        "weight": 2.0
                    }}],
                    "should": []
                }}
            })
        );
    }

    #[test]
    fn test_mixed_placement() {
        let config = SearchConfiguration::new("items")
            .with_minimum_optional_matches(1)
            .with_fields(vec![
                FieldConfiguration::exact("isbn", Placement::Optional, 1.5),
                FieldConfiguration::vector("title", Placement::Required, 0.3, 1.0),
            ])
            .unwrap();

        let doc = build_query(&config);
        let must = doc.clauses("must");
        let should = doc.clauses("should");
        assert_eq!(must.len(), 1);
        assert_eq!(should.len(), 1);
        assert!(must[0]["function_score"]["query"].get("knn").is_some());
        assert_eq!(should[0]["function_score"]["query"]["term"], json!({"isbn": "isbn"}));
        assert_eq!(should[0]["function_score"]["weight"], json!(1.5));
        assert_eq!(doc.as_map()["query"]["bool"]["minimum_should_match"], json!("1"));
    }

    #[test]
    fn test_all_none_fields_give_empty_buckets() {
        let config = SearchConfiguration::new("items")
            .with_fields(vec![FieldConfiguration::none("a"), FieldConfiguration::none("b")])
            .unwrap();
        let doc = build_query(&config);
        assert_eq!(doc.as_map()["query"]["bool"]["must"], json!([]));
        assert_eq!(doc.as_map()["query"]["bool"]["should"], json!([]));
    }

    #[test]
    fn test_vector_clauses_precede_exact_in_field_order() {
        let config = SearchConfiguration::new("items")
            .with_fields(vec![
                FieldConfiguration::exact("genre", Placement::Required, 1.0),
                FieldConfiguration::vector("title", Placement::Required, 0.1, 1.0),
                FieldConfiguration::vector("plot", Placement::Required, 0.2, 1.0),
            ])
            .unwrap();
        let doc = build_query(&config);
        let keys: Vec<&str> = doc
            .clauses("must")
            .iter()
            .map(|c| {
                let q = &c["function_score"]["query"];
                let inner = q.get("knn").or_else(|| q.get("term")).unwrap();
                inner.as_object().unwrap().keys().next().unwrap().as_str()
            })
            .collect();
        assert_eq!(keys, vec!["titleEmbedding", "plotEmbedding", "genre"]);
    }
}
