use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

/// Riding experience of the person asking for a recommendation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Experience {
    #[default]
    NoExperience,
    LittleExperience,
}

impl Experience {
    /// Parse a case-insensitive experience tag
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "no_experience" => Some(Experience::NoExperience),
            "little_experience" => Some(Experience::LittleExperience),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Experience::NoExperience => "no_experience",
            Experience::LittleExperience => "little_experience",
        }
    }
}

/// Motorcycle style tags understood by the catalog and the profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BikeType {
    Cruiser,
    Standard,
    Sportbike,
    Naked,
    Adventure,
    Touring,
    DualSport,
}

impl BikeType {
    pub const ALL: [BikeType; 7] = [
        BikeType::Cruiser,
        BikeType::Standard,
        BikeType::Sportbike,
        BikeType::Naked,
        BikeType::Adventure,
        BikeType::Touring,
        BikeType::DualSport,
    ];

    /// Parse a category tag, lower-casing it first
    pub fn parse(raw: &str) -> Option<Self> {
        let tag = raw.trim().to_lowercase();
        Self::ALL.into_iter().find(|t| t.as_str() == tag)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BikeType::Cruiser => "cruiser",
            BikeType::Standard => "standard",
            BikeType::Sportbike => "sportbike",
            BikeType::Naked => "naked",
            BikeType::Adventure => "adventure",
            BikeType::Touring => "touring",
            BikeType::DualSport => "dual_sport",
        }
    }
}

impl fmt::Display for BikeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalized rider profile
///
/// Always fully populated with bounded values, see `core::normalizer`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiderProfile {
    pub experience: Experience,
    pub height_cm: u16,
    pub budget_usd: u32,
    pub bike_types: Vec<BikeType>,
    pub k: u8,
}

impl RiderProfile {
    /// Whether the rider named a style preference at all
    pub fn has_type_preference(&self) -> bool {
        !self.bike_types.is_empty()
    }
}

/// A motorcycle, either from the whitelisted catalog or normalized from an
/// external suggestion.
///
/// Technical data is optional: a missing value contributes nothing to scoring.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VehicleRecord {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub manufacturer: String,
    #[serde(default, deserialize_with = "lenient_category")]
    pub category: Option<BikeType>,
    #[serde(default, deserialize_with = "lenient_f64", skip_serializing_if = "Option::is_none")]
    pub engine_cc: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64", skip_serializing_if = "Option::is_none")]
    pub seat_height_mm: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64", skip_serializing_if = "Option::is_none")]
    pub wet_weight_kg: Option<f64>,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub abs: bool,
    #[serde(default, deserialize_with = "lenient_f64", skip_serializing_if = "Option::is_none")]
    pub max_speed_mph: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64", skip_serializing_if = "Option::is_none")]
    pub zero_to_sixty_s: Option<f64>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub official_url: Option<String>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub mfr_domain: Option<String>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub image_query: Option<String>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub local_image: Option<String>,
}

impl VehicleRecord {
    /// Human readable label, e.g. "Yamaha YZF-R3"
    pub fn label(&self) -> String {
        match (self.manufacturer.is_empty(), self.name.is_empty()) {
            (false, false) if !starts_with_ignore_case(&self.name, &self.manufacturer) => {
                format!("{} {}", self.manufacturer, self.name)
            }
            (true, _) | (false, false) => self.name.clone(),
            (false, true) => self.manufacturer.clone(),
        }
    }
}

fn starts_with_ignore_case(haystack: &str, prefix: &str) -> bool {
    haystack.to_lowercase().starts_with(&prefix.to_lowercase())
}

/// Identity used to detect the same vehicle across merge sources
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DedupKey {
    Id(String),
    Label { manufacturer: String, name: String },
}

impl DedupKey {
    pub fn of(vehicle: &VehicleRecord) -> Self {
        match vehicle.id.as_deref().map(str::trim) {
            Some(id) if !id.is_empty() => DedupKey::Id(id.to_string()),
            _ => DedupKey::Label {
                manufacturer: vehicle.manufacturer.trim().to_lowercase(),
                name: vehicle.name.trim().to_lowercase(),
            },
        }
    }
}

/// A catalog vehicle with its fitness for one profile
#[derive(Debug, Clone)]
pub struct ScoredCandidate {
    pub vehicle: VehicleRecord,
    pub score: f64,
    pub reasons: Vec<String>,
}

/// A suggestion that did not come from the catalog (chat/LLM flow)
///
/// Field names are whatever the upstream collaborator produced; they are
/// mapped onto `VehicleRecord` by `core::merge::normalize_external`.
#[derive(Debug, Clone, PartialEq)]
pub struct ExternalCandidate {
    pub fields: serde_json::Map<String, Value>,
}

impl ExternalCandidate {
    /// Only JSON objects can describe a vehicle; anything else is dropped
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(fields) => Some(Self { fields }),
            _ => None,
        }
    }

    /// Decode a list of candidates, ignoring non-object entries
    pub fn list_from_value(value: &Value) -> Vec<Self> {
        match value {
            Value::Array(items) => items.iter().cloned().filter_map(Self::from_value).collect(),
            _ => Vec::new(),
        }
    }

    /// First non-empty string among the given keys
    pub fn text(&self, keys: &[&str]) -> Option<String> {
        keys.iter()
            .filter_map(|k| self.fields.get(*k))
            .find_map(|v| match v {
                Value::String(_) => value_as_string(v),
                _ => None,
            })
    }

    /// First usable number among the given keys
    pub fn number(&self, keys: &[&str]) -> Option<f64> {
        keys.iter()
            .filter_map(|k| self.fields.get(*k))
            .find_map(value_as_f64)
    }

    pub fn flag(&self, keys: &[&str]) -> Option<bool> {
        keys.iter()
            .filter_map(|k| self.fields.get(*k))
            .find_map(value_as_bool)
    }
}

/// Which merge source produced a shortlist item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemSource {
    Pinned,
    External,
    Ranked,
    Catalog,
}

/// One entry of the final shortlist as returned to callers
#[derive(Debug, Clone, Serialize)]
pub struct ItemView {
    #[serde(flatten)]
    pub vehicle: VehicleRecord,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    pub reasons: Vec<String>,
    pub source: ItemSource,
}

impl ItemView {
    pub fn from_scored(candidate: ScoredCandidate, source: ItemSource) -> Self {
        Self {
            vehicle: candidate.vehicle,
            score: Some(candidate.score),
            reasons: candidate.reasons,
            source,
        }
    }

    pub fn dedup_key(&self) -> DedupKey {
        DedupKey::of(&self.vehicle)
    }
}

/// Weights of the additive scoring terms
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoringWeights {
    pub seat_fit: f64,
    pub weight: f64,
    pub abs: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            seat_fit: 0.6,
            weight: 0.25,
            abs: 0.05,
        }
    }
}

// Lenient field decoders: a malformed value becomes "absent" instead of
// failing the whole record.

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value_as_string(&value))
}

fn lenient_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_string(deserializer)?.unwrap_or_default())
}

fn lenient_category<'de, D>(deserializer: D) -> Result<Option<BikeType>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value.as_str().and_then(BikeType::parse))
}

fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value_as_f64(&value))
}

fn lenient_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value_as_bool(&value).unwrap_or(false))
}

/// Non-empty trimmed string, numbers are stringified
pub fn value_as_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Finite number, numeric strings accepted
pub fn value_as_f64(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|v| v.is_finite())
}

pub fn value_as_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_f64().map(|v| v != 0.0),
        Value::String(s) => match s.trim().to_lowercase().as_str() {
            "true" | "yes" | "y" | "1" => Some(true),
            "false" | "no" | "n" | "0" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_bike_type_parse() {
        assert_eq!(BikeType::parse("Sportbike"), Some(BikeType::Sportbike));
        assert_eq!(BikeType::parse(" DUAL_SPORT "), Some(BikeType::DualSport));
        assert_eq!(BikeType::parse("scooter"), None);
    }

    #[test]
    fn test_lenient_vehicle_decoding() {
        let vehicle: VehicleRecord = serde_json::from_value(json!({
            "id": "honda_rebel300",
            "name": "Rebel 300",
            "manufacturer": "Honda",
            "category": "Cruiser",
            "seat_height_mm": "690",
            "wet_weight_kg": null,
            "abs": "yes",
            "max_speed_mph": {"nested": true}
        }))
        .unwrap();

        assert_eq!(vehicle.category, Some(BikeType::Cruiser));
        assert_eq!(vehicle.seat_height_mm, Some(690.0));
        assert_eq!(vehicle.wet_weight_kg, None);
        assert!(vehicle.abs);
        assert_eq!(vehicle.max_speed_mph, None);
    }

    #[test]
    fn test_dedup_key_falls_back_to_label() {
        let with_id = VehicleRecord {
            id: Some("yamaha_r3".to_string()),
            ..Default::default()
        };
        assert_eq!(DedupKey::of(&with_id), DedupKey::Id("yamaha_r3".to_string()));

        let without_id = VehicleRecord {
            id: Some("  ".to_string()),
            name: "G 310 R".to_string(),
            manufacturer: "BMW".to_string(),
            ..Default::default()
        };
        assert_eq!(
            DedupKey::of(&without_id),
            DedupKey::Label {
                manufacturer: "bmw".to_string(),
                name: "g 310 r".to_string(),
            }
        );
    }

    #[test]
    fn test_label_does_not_repeat_manufacturer() {
        let vehicle = VehicleRecord {
            name: "BMW G 310 R".to_string(),
            manufacturer: "BMW".to_string(),
            ..Default::default()
        };
        assert_eq!(vehicle.label(), "BMW G 310 R");

        let vehicle = VehicleRecord {
            name: "Ninja 400".to_string(),
            manufacturer: "Kawasaki".to_string(),
            ..Default::default()
        };
        assert_eq!(vehicle.label(), "Kawasaki Ninja 400");
    }
}
