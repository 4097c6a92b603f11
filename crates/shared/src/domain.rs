use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Number of free-text projection inputs on the form.
pub const FIELD_COUNT: usize = 4;

/// One country record as returned by the upstream API.
///
/// Only `name.common` and `population` are interpreted; every other attribute
/// is carried through untouched and re-serialized in its original key order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Country(Value);

impl Country {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    pub fn common_name(&self) -> Option<&str> {
        self.0.get("name")?.get("common")?.as_str()
    }

    pub fn population(&self) -> Option<f64> {
        self.0.get("population")?.as_f64()
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }
}

impl From<Value> for Country {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldSlot {
    First,
    Second,
    Third,
    Fourth,
}

impl FieldSlot {
    pub const ALL: [FieldSlot; FIELD_COUNT] = [
        FieldSlot::First,
        FieldSlot::Second,
        FieldSlot::Third,
        FieldSlot::Fourth,
    ];

    pub fn index(self) -> usize {
        match self {
            FieldSlot::First => 0,
            FieldSlot::Second => 1,
            FieldSlot::Third => 2,
            FieldSlot::Fourth => 3,
        }
    }

    /// Human label shown next to the input, e.g. `Field 1`.
    pub fn label(self) -> String {
        format!("Field {}", self.index() + 1)
    }

    /// Form control name, e.g. `field1`.
    pub fn input_name(self) -> String {
        format!("field{}", self.index() + 1)
    }
}

/// The four attribute names requested from the API, kept exactly as typed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectionFields([String; FIELD_COUNT]);

impl ProjectionFields {
    pub fn new(fields: [String; FIELD_COUNT]) -> Self {
        Self(fields)
    }

    /// Builds from up to four values; missing slots stay empty and extras are ignored.
    pub fn from_values<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut fields = Self::default();
        for (slot, value) in FieldSlot::ALL.into_iter().zip(values) {
            fields.set(slot, value);
        }
        fields
    }

    pub fn get(&self, slot: FieldSlot) -> &str {
        &self.0[slot.index()]
    }

    pub fn set(&mut self, slot: FieldSlot, value: impl Into<String>) {
        self.0[slot.index()] = value.into();
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    /// Comma-joined names without any escaping.
    pub fn joined(&self) -> String {
        self.0.join(",")
    }
}

/// Last successful fetch. Replaced wholesale, never merged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawSnapshot {
    pub countries: Vec<Country>,
    pub fields: ProjectionFields,
    pub fetched_at: DateTime<Utc>,
}

impl RawSnapshot {
    pub fn new(countries: Vec<Country>, fields: ProjectionFields) -> Self {
        Self {
            countries,
            fields,
            fetched_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn reads_common_name_and_population() {
        let country = Country::new(json!({
            "name": { "common": "Austria", "official": "Republic of Austria" },
            "population": 9000000
        }));
        assert_eq!(country.common_name(), Some("Austria"));
        assert_eq!(country.population(), Some(9_000_000.0));
    }

    #[test]
    fn missing_attributes_read_as_none() {
        let country = Country::new(json!({ "capital": ["Vienna"] }));
        assert_eq!(country.common_name(), None);
        assert_eq!(country.population(), None);
    }

    #[test]
    fn preserves_pass_through_key_order() {
        let raw = r#"{"region":"Europe","name":{"common":"Austria"},"area":83871.0}"#;
        let country: Country = serde_json::from_str(raw).expect("country");
        assert_eq!(serde_json::to_string(&country).expect("json"), raw);
    }

    #[test]
    fn projection_fields_fill_missing_slots_with_empty_strings() {
        let fields = ProjectionFields::from_values(["name", "population"]);
        assert_eq!(fields.joined(), "name,population,,");
        assert_eq!(fields.get(FieldSlot::Fourth), "");
    }
}
