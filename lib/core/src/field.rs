//! Per-field search configuration
//!
//! Each indexed field is either matched by k-NN similarity over its
//! embedding (`Vector`), matched verbatim (`Exact`), or left out of the
//! query entirely (`None`). Parameters live inside the kind, so a vector
//! field always has a cutoff and a weight and a `None` field has nothing.

use serde::{Deserialize, Serialize};

/// Default multiplier applied to a matched clause
pub const DEFAULT_WEIGHT: f64 = 1.0;

/// Default similarity cutoff for a vector clause
pub const DEFAULT_MIN_SCORE: f64 = 0.0;

fn default_weight() -> f64 {
    DEFAULT_WEIGHT
}

fn default_min_score() -> f64 {
    DEFAULT_MIN_SCORE
}

/// Parameters of a k-NN similarity clause
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VectorParams {
    /// Hard cutoff: candidates scoring below it are excluded by the backend
    #[serde(default = "default_min_score")]
    pub min_score: f64,

    /// Multiplier on this field's match score
    #[serde(default = "default_weight")]
    pub weight: f64,
}

impl VectorParams {
    pub fn new(min_score: f64, weight: f64) -> Self {
        Self { min_score, weight }
    }
}

impl Default for VectorParams {
    fn default() -> Self {
        Self {
            min_score: DEFAULT_MIN_SCORE,
            weight: DEFAULT_WEIGHT,
        }
    }
}

/// Parameters of an exact-term clause
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ExactParams {
    #[serde(default = "default_weight")]
    pub weight: f64,
}

impl ExactParams {
    pub fn new(weight: f64) -> Self {
        Self { weight }
    }
}

impl Default for ExactParams {
    fn default() -> Self {
        Self {
            weight: DEFAULT_WEIGHT,
        }
    }
}

/// How a field participates in the query
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum FieldKind {
    /// k-NN similarity over the field's embedding
    Vector(VectorParams),
    /// Case-sensitive verbatim term match
    Exact(ExactParams),
    /// Excluded from the query
    #[default]
    None,
}

impl FieldKind {
    pub fn vector(min_score: f64, weight: f64) -> Self {
        FieldKind::Vector(VectorParams::new(min_score, weight))
    }

    pub fn exact(weight: f64) -> Self {
        FieldKind::Exact(ExactParams::new(weight))
    }

    #[inline]
    pub fn is_none(&self) -> bool {
        matches!(self, FieldKind::None)
    }

    /// Score multiplier, if the field takes part in the query
    pub fn weight(&self) -> Option<f64> {
        match self {
            FieldKind::Vector(p) => Some(p.weight),
            FieldKind::Exact(p) => Some(p.weight),
            FieldKind::None => None,
        }
    }

    /// Same kind with parameters equal within `epsilon`
    pub fn approx_eq(&self, other: &FieldKind, epsilon: f64) -> bool {
        let close = |a: f64, b: f64| (a - b).abs() <= epsilon;
        match (self, other) {
            (FieldKind::Vector(a), FieldKind::Vector(b)) => {
                close(a.min_score, b.min_score) && close(a.weight, b.weight)
            }
            (FieldKind::Exact(a), FieldKind::Exact(b)) => close(a.weight, b.weight),
            (FieldKind::None, FieldKind::None) => true,
            _ => false,
        }
    }
}

/// Whether a clause must match (`must`) or only boosts (`should`)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum Placement {
    #[default]
    Required,
    Optional,
}

impl Placement {
    /// Name of the bool-query bucket this placement routes to
    pub fn bucket(&self) -> &'static str {
        match self {
            Placement::Required => "must",
            Placement::Optional => "should",
        }
    }
}

/// Configuration of one indexed field
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FieldConfiguration {
    pub field_name: String,

    #[serde(flatten)]
    pub kind: FieldKind,

    /// Only meaningful when `kind` is not `None`
    #[serde(default)]
    pub placement: Placement,
}

impl FieldConfiguration {
    pub fn new(field_name: impl Into<String>, kind: FieldKind, placement: Placement) -> Self {
        Self {
            field_name: field_name.into(),
            kind,
            placement,
        }
    }

    pub fn vector(field_name: impl Into<String>, placement: Placement, min_score: f64, weight: f64) -> Self {
        Self::new(field_name, FieldKind::vector(min_score, weight), placement)
    }

    pub fn exact(field_name: impl Into<String>, placement: Placement, weight: f64) -> Self {
        Self::new(field_name, FieldKind::exact(weight), placement)
    }

    /// A field excluded from the query
    pub fn none(field_name: impl Into<String>) -> Self {
        Self::new(field_name, FieldKind::None, Placement::Required)
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        !self.kind.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_vector_field_json_shape() {
        let field = FieldConfiguration::vector("title", Placement::Required, 0.5, 2.0);
        let value = serde_json::to_value(&field).unwrap();
        assert_eq!(
            value,
            json!({
                "fieldName": "title",
                "kind": "vector",
                "minScore": 0.5,
                "weight": 2.0,
                "placement": "required"
            })
        );
    }

    #[test]
    fn test_missing_params_take_defaults() {
        let field: FieldConfiguration = serde_json::from_value(json!({
            "fieldName": "genre",
            "kind": "vector",
            "placement": "optional"
        }))
        .unwrap();
        assert_eq!(field.kind, FieldKind::Vector(VectorParams::default()));
        assert_eq!(field.placement, Placement::Optional);

        let field: FieldConfiguration = serde_json::from_value(json!({
            "fieldName": "isbn",
            "kind": "exact"
        }))
        .unwrap();
        assert_eq!(field.kind, FieldKind::exact(1.0));
        assert_eq!(field.placement, Placement::Required);
    }

    #[test]
    fn test_none_field_deserializes() {
        let field: FieldConfiguration = serde_json::from_value(json!({
            "fieldName": "notes",
            "kind": "none"
        }))
        .unwrap();
        assert!(!field.is_active());
        assert_eq!(field.kind.weight(), None);
    }

    #[test]
    fn test_kind_approx_eq() {
        let a = FieldKind::vector(0.3, 1.0);
        let b = FieldKind::vector(0.30000000001, 1.0);
        assert!(a.approx_eq(&b, 1e-6));
        assert!(!a.approx_eq(&FieldKind::exact(1.0), 1e-6));
        assert!(!FieldKind::exact(1.0).approx_eq(&FieldKind::exact(1.5), 1e-6));
    }

    #[test]
    fn test_placement_bucket() {
        assert_eq!(Placement::Required.bucket(), "must");
        assert_eq!(Placement::Optional.bucket(), "should");
    }
}
