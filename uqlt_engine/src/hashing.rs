/// UQLT Engine — Canonical Hashing
///
/// Deterministic canonical serialization + SHA-256 of a grid snapshot.
/// Two runs that end in the same grid produce the same digest.
///
/// Rules:
///   - Cells in row-major order
///   - States by canonical upper-case name
///   - Energies as JSON numbers (shortest round-trip form)
///   - UTF-8 JSON, no whitespace, fixed field order

use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

use crate::error::EngineResult;
use crate::grid::GridSnapshot;
use crate::ENGINE_VERSION;

/// Canonical serialization of a snapshot to UTF-8 JSON bytes.
pub fn canonical_serialize(snapshot: &GridSnapshot) -> EngineResult<Vec<u8>> {
    let obj = build_canonical_value(snapshot);
    Ok(serde_json::to_vec(&obj)?)
}

/// SHA-256 of the canonical serialization. Lowercase hex string.
pub fn canonical_hash(snapshot: &GridSnapshot) -> EngineResult<String> {
    let bytes = canonical_serialize(snapshot)?;
    Ok(hex_digest(&bytes))
}

/// Lowercase hex SHA-256 of arbitrary bytes.
pub fn hex_digest(bytes: &[u8]) -> String {
    Sha256::digest(bytes)
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect::<String>()
}

/// Field order: engine_version, size, states, energy.
fn build_canonical_value(snapshot: &GridSnapshot) -> Value {
    let states: Vec<Value> = snapshot
        .states
        .iter()
        .map(|s| Value::String(s.name().to_string()))
        .collect();
    let energy: Vec<Value> = snapshot.energy.iter().map(|e| Value::from(*e)).collect();

    // engine_version first: it is part of the digest identity.
    let mut root = Map::new();
    root.insert(
        "engine_version".to_string(),
        Value::Number((ENGINE_VERSION as u64).into()),
    );
    root.insert("size".to_string(), Value::Number((snapshot.size as u64).into()));
    root.insert("states".to_string(), Value::Array(states));
    root.insert("energy".to_string(), Value::Array(energy));
    Value::Object(root)
}
