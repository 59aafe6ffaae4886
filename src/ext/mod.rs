// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Extension traits for third-party types, grouped under `crate::ext`
// role: module/aggregation
// outputs: JsonFetch for serde_json::Value
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

pub mod serde_json;
