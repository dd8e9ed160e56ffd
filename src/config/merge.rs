//! Tier merging for YAML configuration.
//!
//! Objects merge key by key, anything else is replaced by the higher tier.
//! A `null` in a higher tier means "not set here" and keeps the lower value.

use serde_json::Value;

/// Merge `overlay` onto `base`, with `overlay` winning.
pub fn deep_merge(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        (Value::Object(mut merged), Value::Object(overlay_map)) => {
            for (key, value) in overlay_map {
                let next = match merged.remove(&key) {
                    Some(existing) => deep_merge(existing, value),
                    None => value,
                };
                merged.insert(key, next);
            }
            Value::Object(merged)
        }
        (base, Value::Null) => base,
        (_, overlay) => overlay,
    }
}

/// Merge tiers from lowest to highest priority.
pub fn deep_merge_all(tiers: impl IntoIterator<Item = Value>) -> Value {
    tiers.into_iter().fold(Value::Null, deep_merge)
}
