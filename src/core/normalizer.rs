use serde_json::{Map, Value};
use std::ops::RangeInclusive;

use crate::models::{BikeType, Experience, RiderProfile};

pub const HEIGHT_CM_RANGE: RangeInclusive<i64> = 140..=210;
pub const BUDGET_USD_RANGE: RangeInclusive<i64> = 1000..=20000;
pub const K_RANGE: RangeInclusive<i64> = 1..=6;

pub const DEFAULT_HEIGHT_CM: i64 = 170;
pub const DEFAULT_BUDGET_USD: i64 = 6000;
/// Result count for the recommend endpoint
pub const DEFAULT_K: u8 = 3;
/// Result count for chat-driven recommendations
pub const DEFAULT_CHAT_K: u8 = 2;

pub const MAX_BIKE_TYPES: usize = 5;

/// Turn an untrusted mapping into a bounded `RiderProfile`
///
/// Never fails: every field that is missing or cannot be converted falls
/// back to its default, numbers are clamped after conversion.
pub fn normalize_profile(raw: &Value, default_k: u8) -> RiderProfile {
    let field = |key: &str| raw.get(key).unwrap_or(&Value::Null);

    let experience = field("experience")
        .as_str()
        .and_then(Experience::parse)
        .unwrap_or_default();

    let height_cm = bounded_int(field("height_cm"), DEFAULT_HEIGHT_CM, &HEIGHT_CM_RANGE);
    let budget_usd = bounded_int(field("budget_usd"), DEFAULT_BUDGET_USD, &BUDGET_USD_RANGE);
    let k = bounded_int(field("k"), i64::from(default_k), &K_RANGE);

    RiderProfile {
        experience,
        // Clamped above, so the narrowing casts cannot truncate
        height_cm: height_cm as u16,
        budget_usd: budget_usd as u32,
        bike_types: parse_bike_types(field("bike_types")),
        k: k as u8,
    }
}

/// Merge a chat-derived patch into the current profile
///
/// Keys present in the patch replace the current values, then the result
/// is normalized again. A patch that is not an object changes nothing.
pub fn merge_patch(current: &RiderProfile, patch: &Value, default_k: u8) -> RiderProfile {
    let Some(patch) = patch.as_object() else {
        return current.clone();
    };

    let mut merged: Map<String, Value> = match serde_json::to_value(current) {
        Ok(Value::Object(map)) => map,
        _ => Map::new(),
    };
    for (key, value) in patch {
        merged.insert(key.clone(), value.clone());
    }

    normalize_profile(&Value::Object(merged), default_k)
}

/// Integer conversion with fallback, then clamp
fn bounded_int(value: &Value, default: i64, range: &RangeInclusive<i64>) -> i64 {
    to_int(value)
        .unwrap_or(default)
        .clamp(*range.start(), *range.end())
}

fn to_int(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64)),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

/// Accept a single tag or a list of tags, keep known ones in first-seen order
fn parse_bike_types(value: &Value) -> Vec<BikeType> {
    let raw: Vec<&str> = match value {
        Value::String(s) => vec![s.as_str()],
        Value::Array(items) => items.iter().filter_map(Value::as_str).collect(),
        _ => Vec::new(),
    };

    let mut types = Vec::with_capacity(MAX_BIKE_TYPES);
    for bike_type in raw.into_iter().filter_map(BikeType::parse) {
        if types.len() == MAX_BIKE_TYPES {
            break;
        }
        if !types.contains(&bike_type) {
            types.push(bike_type);
        }
    }
    types
}
