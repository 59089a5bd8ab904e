use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use triage_core::ValidationResult;

/// Recursively sort object keys for stable hashing.
fn sort_json(v: Value) -> Value {
    match v {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            let mut sorted = Map::new();
            for (k, child) in entries {
                sorted.insert(k, sort_json(child));
            }
            Value::Object(sorted)
        }
        Value::Array(arr) => Value::Array(arr.into_iter().map(sort_json).collect()),
        other => other,
    }
}

/// SHA-256 over the canonical findings array.
///
/// Finding ids are positional, so two reports with the same file name and
/// timestamp but differently ordered findings get different fingerprints.
pub fn result_fingerprint(result: &ValidationResult) -> String {
    let findings = serde_json::to_value(&result.findings).unwrap_or(Value::Null);
    let bytes = serde_json::to_vec(&sort_json(findings)).unwrap_or_default();
    hex::encode(Sha256::digest(bytes))
}
