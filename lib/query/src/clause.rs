//! Function-score clause shapes
//!
//! Vector clause:
//!
//! ```text
//! { "function_score": { "query": { "knn": { "<field>Embedding":
//!     { "vector": "<field>Embedding", "min_score": "<float>" } } }, "weight": <float> } }
//! ```
//!
//! Exact clause:
//!
//! ```text
//! { "function_score": { "query": { "term": { "<field>": <value> } }, "weight": <float> } }
//! ```

use itemmap_core::naming::{base_field_name, embedding_field};
use itemmap_core::{ExactParams, VectorParams, DEFAULT_MIN_SCORE, DEFAULT_WEIGHT};
use serde_json::{json, Value};

/// Build a k-NN clause for `field_name`.
///
/// `min_score` is written as a string, which is how the backend types it;
/// the weight stays numeric. The `vector` slot holds the embedding key until
/// a record is bound into the query.
pub fn vector_clause(field_name: &str, params: &VectorParams) -> Value {
    let key = embedding_field(field_name);
    json!({
        "function_score": {
            "query": {
                "knn": {
                    key.clone(): {
                        "vector": key,
                        "min_score": params.min_score.to_string(),
                    }
                }
            },
            "weight": params.weight,
        }
    })
}

/// Build an exact-term clause matching `value` on `field_name`
pub fn exact_clause(field_name: &str, value: Value, params: &ExactParams) -> Value {
    json!({
        "function_score": {
            "query": {
                "term": { field_name: value }
            },
            "weight": params.weight,
        }
    })
}

/// A clause recognized while reading a document
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedClause {
    Vector {
        field_name: String,
        params: VectorParams,
    },
    Exact {
        field_name: String,
        params: ExactParams,
    },
}

impl ParsedClause {
    pub fn field_name(&self) -> &str {
        match self {
            ParsedClause::Vector { field_name, .. } | ParsedClause::Exact { field_name, .. } => {
                field_name
            }
        }
    }
}

/// The first key of a JSON object
pub(crate) fn first_key(value: &Value) -> Option<&str> {
    value.as_object()?.keys().next().map(String::as_str)
}

/// Read a float that may be stored as a number or a numeric string.
///
/// Missing, unparseable and non-finite values all give `None`.
pub(crate) fn lenient_f64(value: Option<&Value>) -> Option<f64> {
    let parsed = match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|v| v.is_finite())
}

/// Recognize a function-score clause.
///
/// Returns `None` for anything that is neither a k-NN nor a term clause.
pub fn parse_clause(clause: &Value) -> Option<ParsedClause> {
    let function_score = clause.get("function_score")?;
    let query = function_score.get("query")?;
    let weight = lenient_f64(function_score.get("weight")).unwrap_or(DEFAULT_WEIGHT);

    if let Some(knn) = query.get("knn") {
        let key = first_key(knn)?;
        let min_score = lenient_f64(knn.get(key).and_then(|k| k.get("min_score")))
            .unwrap_or(DEFAULT_MIN_SCORE);
        return Some(ParsedClause::Vector {
            field_name: base_field_name(key).to_string(),
            params: VectorParams::new(min_score, weight),
        });
    }

    if let Some(term) = query.get("term") {
        let key = first_key(term)?;
        return Some(ParsedClause::Exact {
            field_name: key.to_string(),
            params: ExactParams::new(weight),
        });
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vector_clause_shape() {
        let clause = vector_clause("title", &VectorParams::new(0.5, 2.0));
        assert_eq!(
            clause,
            json!({
                "function_score": {
                    "query": {"knn": {"titleEmbedding": {"vector": "titleEmbedding", "min_score": "0.5"}}},
                    "weight": 2.0
                }
            })
        );
    }

    #[test]
    fn test_exact_clause_shape() {
        let clause = exact_clause("isbn", json!("978-0"), &ExactParams::new(1.5));
        assert_eq!(
            clause,
            json!({"function_score": {"query": {"term": {"isbn": "978-0"}}, "weight": 1.5}})
        );
    }

    #[test]
    fn test_parse_clause_legacy_suffix_and_numeric_min_score() {
        let clause = json!({
            "function_score": {
                "query": {"knn": {"actors-embedding": {"vector": "x", "min_score": 0.25}}},
                "weight": "3"
            }
        });
        assert_eq!(
            parse_clause(&clause),
            Some(ParsedClause::Vector {
                field_name: "actors".to_string(),
                params: VectorParams::new(0.25, 3.0),
            })
        );
    }

    #[test]
    fn test_parse_clause_defaults() {
        let clause = json!({
            "function_score": {"query": {"knn": {"plotEmbedding": {"vector": "plotEmbedding"}}}}
        });
        assert_eq!(
            parse_clause(&clause),
            Some(ParsedClause::Vector {
                field_name: "plot".to_string(),
                params: VectorParams::new(0.0, 1.0),
            })
        );

        let clause = json!({
            "function_score": {
                "query": {"knn": {"plotEmbedding": {"min_score": "high"}}},
                "weight": "heavy"
            }
        });
        assert_eq!(
            parse_clause(&clause),
            Some(ParsedClause::Vector {
                field_name: "plot".to_string(),
                params: VectorParams::new(0.0, 1.0),
            })
        );
    }

    #[test]
    fn test_parse_clause_non_finite_numbers_default() {
        let clause = json!({
            "function_score": {
                "query": {"knn": {"plotEmbedding": {"vector": "plotEmbedding", "min_score": "NaN"}}},
                "weight": "inf"
            }
        });
        assert_eq!(
            parse_clause(&clause),
            Some(ParsedClause::Vector {
                field_name: "plot".to_string(),
                params: VectorParams::new(0.0, 1.0),
            })
        );

        let clause = json!({
            "function_score": {"query": {"term": {"genre": "genre"}}, "weight": "-infinity"}
        });
        assert_eq!(
            parse_clause(&clause),
            Some(ParsedClause::Exact {
                field_name: "genre".to_string(),
                params: ExactParams::new(1.0),
            })
        );
    }

    #[test]
    fn test_parse_term_clause_with_value_object() {
        let clause = json!({
            "function_score": {"query": {"term": {"genre": {"value": "genre"}}}, "weight": 1.0}
        });
        assert_eq!(parse_clause(&clause).unwrap().field_name(), "genre");
    }

    #[test]
    fn test_parse_clause_unrecognized() {
        assert_eq!(parse_clause(&json!({"match_all": {}})), None);
        assert_eq!(parse_clause(&json!({"function_score": {"query": {"range": {}}}})), None);
        assert_eq!(parse_clause(&json!({"function_score": {"query": {"knn": {}}}})), None);
        assert_eq!(parse_clause(&json!("string clause")), None);
    }
}
