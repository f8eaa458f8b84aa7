//! Field naming rules
//!
//! Vector fields are stored next to their source column under a derived
//! embedding key (`title` -> `titleEmbedding`). Documents written by older
//! tooling used a dashed suffix (`title-embedding`); both are recognized when
//! reading, only the canonical form is ever written.

/// Canonical suffix appended to a field name to form its embedding key
pub const EMBEDDING_SUFFIX: &str = "Embedding";

/// Legacy suffix accepted when reading persisted documents
pub const LEGACY_EMBEDDING_SUFFIX: &str = "-embedding";

/// Embedding key for a base field name
#[inline]
pub fn embedding_field(field_name: &str) -> String {
    format!("{field_name}{EMBEDDING_SUFFIX}")
}

/// Recover the base field name from an embedding key.
///
/// Only a trailing suffix is stripped. A key without either suffix is
/// returned unchanged.
pub fn base_field_name(embedding_key: &str) -> &str {
    embedding_key
        .strip_suffix(EMBEDDING_SUFFIX)
        .or_else(|| embedding_key.strip_suffix(LEGACY_EMBEDDING_SUFFIX))
        .filter(|base| !base.is_empty())
        .unwrap_or(embedding_key)
}

/// Whether a document key names an embedding (either suffix form)
#[inline]
pub fn is_embedding_key(key: &str) -> bool {
    key.ends_with(EMBEDDING_SUFFIX) || key.ends_with(LEGACY_EMBEDDING_SUFFIX)
}

/// Convert a spreadsheet column header to the camelCase field name used in
/// the index: `"Release Year"` -> `"releaseYear"`, `"genre_name"` -> `"genreName"`.
pub fn to_camel_case(header: &str) -> String {
    let mut words = header
        .split(|c: char| c == ' ' || c == '_')
        .filter(|w| !w.is_empty());

    let Some(first) = words.next() else {
        return header.to_lowercase();
    };

    let mut out = first.to_lowercase();
    for word in words {
        let mut chars = word.chars();
        if let Some(head) = chars.next() {
            out.extend(head.to_uppercase());
            out.push_str(&chars.as_str().to_lowercase());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedding_field() {
        assert_eq!(embedding_field("title"), "titleEmbedding");
    }

    #[test]
    fn test_base_field_name_both_suffixes() {
        assert_eq!(base_field_name("titleEmbedding"), "title");
        assert_eq!(base_field_name("title-embedding"), "title");
        assert_eq!(base_field_name("title"), "title");
    }

    #[test]
    fn test_base_field_name_only_strips_trailing() {
        assert_eq!(base_field_name("EmbeddingSourceEmbedding"), "EmbeddingSource");
        assert_eq!(base_field_name("Embedding"), "Embedding");
    }

    #[test]
    fn test_is_embedding_key() {
        assert!(is_embedding_key("actorsEmbedding"));
        assert!(is_embedding_key("actors-embedding"));
        assert!(!is_embedding_key("actors"));
    }

    #[test]
    fn test_to_camel_case() {
        assert_eq!(to_camel_case("Release Year"), "releaseYear");
        assert_eq!(to_camel_case("genre_name"), "genreName");
        assert_eq!(to_camel_case("TITLE"), "title");
        assert_eq!(to_camel_case("  spaced   out "), "spacedOut");
        assert_eq!(to_camel_case(""), "");
    }
}
