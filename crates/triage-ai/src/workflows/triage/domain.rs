use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::error::TriageError;

pub const SPO2: &str = "SpO2";
pub const BLOOD_PRESSURE: &str = "blood_pressure";
pub const TEMPERATURE: &str = "temperature";
pub const CHEST_PAIN: &str = "chest_pain";
pub const SHORTNESS_OF_BREATH: &str = "shortness_of_breath";
pub const HEART_DISEASE: &str = "heart_disease";
pub const AGE: &str = "age";
pub const UNILATERAL_WEAKNESS: &str = "unilateral_weakness";
pub const TROUBLE_SPEAKING: &str = "trouble_speaking";
pub const TROUBLE_WALKING: &str = "trouble_walking";
pub const SYNCOPE: &str = "syncope";
pub const PULSE: &str = "pulse";
pub const BLOOD_SUGAR: &str = "blood_sugar";
pub const DIABETES: &str = "diabetes";
pub const MODE_OF_ARRIVAL: &str = "mode_of_arrival";
pub const RESPIRATORY_RATE: &str = "respiratory_rate";
pub const ALTERED_MENTAL_STATUS: &str = "altered_mental_status";

/// Feature order the bundled classifiers were trained with.
pub const TRAINED_FEATURE_ORDER: [&str; 17] = [
    SPO2,
    BLOOD_PRESSURE,
    TEMPERATURE,
    CHEST_PAIN,
    SHORTNESS_OF_BREATH,
    HEART_DISEASE,
    AGE,
    UNILATERAL_WEAKNESS,
    TROUBLE_SPEAKING,
    TROUBLE_WALKING,
    SYNCOPE,
    PULSE,
    BLOOD_SUGAR,
    DIABETES,
    MODE_OF_ARRIVAL,
    RESPIRATORY_RATE,
    ALTERED_MENTAL_STATUS,
];

/// Clinically normal stand-in used by rules when an attribute is absent.
///
/// Unknown attributes default to 0, which for every binary flag means "absent".
pub fn clinical_default(name: &str) -> f64 {
    match name {
        SPO2 => 98.0,
        BLOOD_PRESSURE => 120.0,
        TEMPERATURE => 37.0,
        PULSE => 75.0,
        BLOOD_SUGAR => 100.0,
        RESPIRATORY_RATE => 16.0,
        AGE => 50.0,
        _ => 0.0,
    }
}

/// How the patient reached the department.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArrivalMode {
    WalkIn,
    Ambulance,
    Other,
}

impl ArrivalMode {
    pub fn code(self) -> f64 {
        match self {
            ArrivalMode::WalkIn => 0.0,
            ArrivalMode::Ambulance => 1.0,
            ArrivalMode::Other => 2.0,
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "walk_in" | "walkin" => Some(ArrivalMode::WalkIn),
            "ambulance" => Some(ArrivalMode::Ambulance),
            "other" => Some(ArrivalMode::Other),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ArrivalMode::WalkIn => "Walk-in",
            ArrivalMode::Ambulance => "Ambulance",
            ArrivalMode::Other => "Other",
        }
    }
}

/// Raw attribute value as submitted by a caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Flag(bool),
    Number(f64),
    Text(String),
}

impl From<f64> for AttributeValue {
    fn from(value: f64) -> Self {
        AttributeValue::Number(value)
    }
}

impl From<bool> for AttributeValue {
    fn from(value: bool) -> Self {
        AttributeValue::Flag(value)
    }
}

/// Flat mapping of clinical attribute names to numeric values.
///
/// Only numeric values are stored; raw input is normalized once at the
/// boundary so the scoring path never has to deal with malformed values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(
    try_from = "BTreeMap<String, AttributeValue>",
    into = "BTreeMap<String, f64>"
)]
pub struct PatientAttributes {
    values: BTreeMap<String, f64>,
}

impl PatientAttributes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Normalize raw input, rejecting values that cannot become a number.
    pub fn from_raw(raw: BTreeMap<String, AttributeValue>) -> Result<Self, TriageError> {
        let mut attributes = Self::new();
        for (name, value) in raw {
            let numeric = match value {
                AttributeValue::Flag(flag) => {
                    if flag {
                        1.0
                    } else {
                        0.0
                    }
                }
                AttributeValue::Number(number) => number,
                AttributeValue::Text(text) if name == MODE_OF_ARRIVAL => {
                    match ArrivalMode::from_label(&text) {
                        Some(mode) => mode.code(),
                        None => {
                            return Err(TriageError::FeatureMismatch(format!(
                                "{name} has unknown arrival mode '{text}'"
                            )))
                        }
                    }
                }
                AttributeValue::Text(text) => {
                    return Err(TriageError::FeatureMismatch(format!(
                        "{name} must be numeric (got '{text}')"
                    )))
                }
            };
            if !numeric.is_finite() {
                return Err(TriageError::FeatureMismatch(format!(
                    "{name} must be a finite number"
                )));
            }
            attributes.values.insert(name, numeric);
        }
        Ok(attributes)
    }

    pub fn with(mut self, name: &str, value: f64) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: &str, value: f64) {
        self.values.insert(name.to_string(), value);
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.values.get(name).copied()
    }

    /// Value or its clinically normal default, so absent data never fires a rule.
    pub fn value_or_default(&self, name: &str) -> f64 {
        self.get(name).unwrap_or_else(|| clinical_default(name))
    }

    pub fn flag(&self, name: &str) -> bool {
        self.value_or_default(name) == 1.0
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.values.iter().map(|(name, value)| (name.as_str(), *value))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl TryFrom<BTreeMap<String, AttributeValue>> for PatientAttributes {
    type Error = TriageError;

    fn try_from(raw: BTreeMap<String, AttributeValue>) -> Result<Self, Self::Error> {
        Self::from_raw(raw)
    }
}

impl From<PatientAttributes> for BTreeMap<String, f64> {
    fn from(attributes: PatientAttributes) -> Self {
        attributes.values
    }
}

/// Every known attribute at its clinically normal value.
pub fn baseline_attributes() -> PatientAttributes {
    TRAINED_FEATURE_ORDER
        .iter()
        .fold(PatientAttributes::new(), |attributes, name| {
            attributes.with(name, clinical_default(name))
        })
}

/// Documented input range for a continuous attribute, enforced by callers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AttributeRange {
    pub name: &'static str,
    pub min: f64,
    pub max: f64,
    pub unit: &'static str,
}

const fn attribute_range(
    name: &'static str,
    min: f64,
    max: f64,
    unit: &'static str,
) -> AttributeRange {
    AttributeRange {
        name,
        min,
        max,
        unit,
    }
}

pub const ATTRIBUTE_RANGES: [AttributeRange; 7] = [
    attribute_range(SPO2, 80.0, 100.0, "%"),
    attribute_range(BLOOD_PRESSURE, 70.0, 200.0, "mmHg"),
    attribute_range(TEMPERATURE, 35.0, 42.0, "°C"),
    attribute_range(PULSE, 40.0, 180.0, "bpm"),
    attribute_range(BLOOD_SUGAR, 50.0, 400.0, "mg/dL"),
    attribute_range(RESPIRATORY_RATE, 8.0, 40.0, "breaths/min"),
    attribute_range(AGE, 18.0, 100.0, "years"),
];

/// Check submitted values against the documented input ranges.
///
/// This belongs to the consuming layer; the scoring core assumes validated input.
pub fn validate_ranges(attributes: &PatientAttributes) -> Result<(), TriageError> {
    for range in ATTRIBUTE_RANGES {
        if let Some(value) = attributes.get(range.name) {
            if value < range.min || value > range.max {
                return Err(TriageError::InvalidInput(format!(
                    "{} value {} is out of range ({}-{} {})",
                    range.name, value, range.min, range.max, range.unit
                )));
            }
        }
    }
    Ok(())
}
