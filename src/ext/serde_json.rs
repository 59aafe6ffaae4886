// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Walk GraphQL response envelopes by dotted path and pull typed pieces out of serde_json::Value
// role: extension/serde_json
// outputs: JsonFetch trait and JsonFetched wrapper (typed extraction, array access, null checks)
// invariants: No panics; missing paths and JSON nulls both read as absent
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use serde::de::DeserializeOwned;

/// A location inside a JSON document, possibly absent.
pub struct JsonFetched<'a> {
  inner: Option<&'a serde_json::Value>,
}

impl<'a> JsonFetched<'a> {
  /// Deserialize the value as `T`; None when absent, null or mistyped.
  pub fn to<T>(&self) -> Option<T>
  where
    T: DeserializeOwned,
  {
    self.value().and_then(|v| T::deserialize(v).ok())
  }

  /// The raw value, treating JSON null as absent.
  pub fn value(&self) -> Option<&'a serde_json::Value> {
    self.inner.filter(|v| !v.is_null())
  }

  /// Elements of an array value; empty when absent or not an array.
  pub fn elements(&self) -> &'a [serde_json::Value] {
    self.value().and_then(|v| v.as_array()).map(Vec::as_slice).unwrap_or(&[])
  }

  pub fn is_present(&self) -> bool {
    self.value().is_some()
  }
}

/// Dotted-path access, e.g. `data.repository.pullRequests.nodes`.
pub trait JsonFetch {
  fn fetch(&self, path: &str) -> JsonFetched<'_>;
}

impl JsonFetch for serde_json::Value {
  fn fetch(&self, path: &str) -> JsonFetched<'_> {
    let inner = path
      .split('.')
      .filter(|k| !k.is_empty())
      .try_fold(self, |cur, key| cur.get(key));
    JsonFetched { inner }
  }
}
