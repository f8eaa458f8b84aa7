//! # itemmap Core
//!
//! Data model for hybrid related-record search.
//!
//! - [`SearchConfiguration`] - per-index query settings and field list
//! - [`FieldConfiguration`] - how one field takes part in the query
//! - [`naming`] - embedding key and column header naming rules
//!
//! ## Example
//!
//! ```rust
//! use itemmap_core::{SearchConfiguration, FieldConfiguration, Placement};
//!
//! let config = SearchConfiguration::new("item001")
//!     .with_max_results(5)
//!     .with_fields(vec![
//!         FieldConfiguration::vector("title", Placement::Required, 0.5, 2.0),
//!         FieldConfiguration::exact("isbn", Placement::Optional, 1.5),
//!     ])
//!     .unwrap();
//!
//! assert_eq!(config.active_fields().count(), 2);
//! ```

pub mod config;
pub mod error;
pub mod field;
pub mod naming;

pub use config::{SearchConfiguration, DEFAULT_MAX_RESULTS};
pub use error::{Error, Result};
pub use field::{
    ExactParams, FieldConfiguration, FieldKind, Placement, VectorParams, DEFAULT_MIN_SCORE,
    DEFAULT_WEIGHT,
};
pub use naming::{embedding_field, base_field_name, to_camel_case, EMBEDDING_SUFFIX};
