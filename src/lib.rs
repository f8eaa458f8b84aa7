//! # itemmap
//!
//! Search configuration for related-record lookup over a hybrid
//! vector + keyword index.
//!
//! Each indexed field is configured as a k-NN vector field (with a minimum
//! similarity score and a weight), an exact-match field (with a weight), or
//! left out. The configuration is persisted as a bool query of weighted
//! function-score clauses, and read back from it for editing.
//!
//! ## Quick Start
//!
//! ### As a Server
//!
//! ```bash
//! itemmap --data-dir ./data --http-port 6333
//! ```
//!
//! ### As a Library
//!
//! ```rust
//! use itemmap::prelude::*;
//!
//! let config = SearchConfiguration::new("titles")
//!     .with_max_results(5)
//!     .with_fields(vec![
//!         FieldConfiguration::vector("title", Placement::Required, 0.5, 2.0),
//!         FieldConfiguration::exact("genre", Placement::Optional, 1.5),
//!     ])
//!     .unwrap();
//!
//! let doc = build_query(&config);
//! let parsed = QueryParser::new()
//!     .index_name("titles")
//!     .known_fields(["title", "genre"])
//!     .parse(&doc);
//! assert!(parsed.config.approx_eq(&config, 1e-9));
//! ```
//!
//! ## Crate Structure
//!
//! - `itemmap-core` - configuration data model, naming rules, errors
//! - `itemmap-query` - query building, parsing, defaults and record binding
//! - `itemmap-storage` - index records and configuration persistence
//! - `itemmap-api` - REST API

pub use itemmap_core::{
    Error, ExactParams, FieldConfiguration, FieldKind, Placement, Result, SearchConfiguration,
    VectorParams,
};

pub use itemmap_query::{
    build_query, default_search_config, parse_query, ColumnType, Embedder, FieldClassification,
    HashingEmbedder, ParsedConfiguration, QueryBinder, QueryDocument, QueryParser,
    UnknownFieldPolicy,
};

pub use itemmap_storage::{IndexRecord, StorageManager};

pub use itemmap_api::RestApi;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        build_query, parse_query, FieldConfiguration, FieldKind, Placement, QueryDocument,
        QueryParser, SearchConfiguration, UnknownFieldPolicy,
        StorageManager, RestApi,
        Error, Result,
    };
}

/// Field naming rules
pub mod naming {
    pub use itemmap_core::naming::{base_field_name, embedding_field, to_camel_case};
}
