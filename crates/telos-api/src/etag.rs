//! ETag computation for entity graphs.
//!
//! An ETag is the SHA-256 of the graph's JSON encoding. Struct fields
//! serialise in declaration order and composites in storage order, so the
//! same stored graph always hashes the same.

use axum::http::HeaderValue;
use serde::Serialize;
use sha2::{Digest, Sha256};

/// Compute a quoted strong ETag for `graph`.
pub fn compute_etag<G: Serialize>(graph: &G) -> Result<String, serde_json::Error> {
  let bytes = serde_json::to_vec(graph)?;
  let hash = Sha256::digest(&bytes);
  Ok(format!("\"{}\"", hex::encode(hash)))
}

/// Whether an `If-None-Match` header value names `etag`.
///
/// Accepts `*`, comma-separated lists, and weak (`W/`) validators.
pub fn none_match(header: &HeaderValue, etag: &str) -> bool {
  let Ok(value) = header.to_str() else {
    return false;
  };
  value.split(',').map(str::trim).any(|candidate| {
    candidate == "*" || candidate.strip_prefix("W/").unwrap_or(candidate) == etag
  })
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  #[test]
  fn etag_is_quoted_hex() {
    let etag = compute_etag(&json!({ "title": "Run 100km" })).unwrap();
    assert_eq!(etag.len(), 66);
    assert!(etag.starts_with('"') && etag.ends_with('"'));
    assert!(etag[1..65].chars().all(|c| c.is_ascii_hexdigit()));
  }

  #[test]
  fn changed_field_changes_etag() {
    let a = compute_etag(&json!({ "title": "Run 100km" })).unwrap();
    let b = compute_etag(&json!({ "title": "Run 120km" })).unwrap();
    assert_ne!(a, b);
    assert_eq!(a, compute_etag(&json!({ "title": "Run 100km" })).unwrap());
  }

  #[test]
  fn if_none_match_forms() {
    let etag = "\"abc\"";
    assert!(none_match(&HeaderValue::from_static("\"abc\""), etag));
    assert!(none_match(&HeaderValue::from_static("W/\"abc\""), etag));
    assert!(none_match(&HeaderValue::from_static("\"x\", \"abc\""), etag));
    assert!(none_match(&HeaderValue::from_static("*"), etag));
    assert!(!none_match(&HeaderValue::from_static("\"abd\""), etag));
  }
}
