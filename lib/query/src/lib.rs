//! # itemmap Query
//!
//! Builds hybrid k-NN + exact-match query documents from a per-field search
//! configuration, and reads them back into an editable configuration.
//!
//! ## Features
//!
//! - **Build**: vector fields become k-NN clauses gated by a minimum score,
//!   exact fields become term clauses, each wrapped in a weighted function score
//!   and routed to `must` or `should` by placement
//! - **Parse**: the inverse transform, tolerant of partial or foreign documents
//! - **Defaults**: the first configuration of a freshly registered index
//! - **Binding**: filling a query template from a source record to find related records
//!
//! ## Example
//!
//! ```rust
//! use itemmap_core::{SearchConfiguration, FieldConfiguration, Placement};
//! use itemmap_query::{build_query, QueryParser};
//!
//! let config = SearchConfiguration::new("titles")
//!     .with_minimum_optional_matches(1)
//!     .with_fields(vec![
//!         FieldConfiguration::vector("title", Placement::Required, 0.3, 1.0),
//!         FieldConfiguration::exact("isbn", Placement::Optional, 1.5),
//!     ])
//!     .unwrap();
//!
//! let doc = build_query(&config);
//! assert_eq!(doc.clauses("must").len(), 1);
//! assert_eq!(doc.clauses("should").len(), 1);
//!
//! let parsed = QueryParser::new()
//!     .index_name("titles")
//!     .known_fields(["title", "isbn"])
//!     .parse(&doc);
//! assert!(parsed.config.approx_eq(&config, 1e-9));
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────┐  build_query  ┌───────────────┐  bind   ┌───────────────┐
//! │ Configuration │──────────────>│   Document    │────────>│  Search body  │
//! │  (editable)   │<──────────────│  (persisted)  │ record  │  (backend)    │
//! └───────────────┘  QueryParser  └───────────────┘         └───────────────┘
//! ```

pub mod bind;
pub mod build;
pub mod clause;
pub mod defaults;
pub mod document;
pub mod embedder;
pub mod parse;

pub use bind::{remove_duplicate_names, sanitize_hits, BindError, QueryBinder, DEFAULT_DEDUP_FIELDS};
pub use build::build_query;
pub use clause::{parse_clause, ParsedClause};
pub use defaults::{default_search_config, ColumnType, FieldClassification};
pub use document::QueryDocument;
pub use embedder::{EmbedError, Embedder, HashingEmbedder, DEFAULT_EMBEDDING_DIM};
pub use parse::{parse_query, ParsedConfiguration, QueryParser, UnknownFieldPolicy};
