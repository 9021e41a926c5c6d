use super::field::SettingField;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;
use std::ops::RangeInclusive;

pub const TEMPERATURE_RANGE: RangeInclusive<f32> = 0.0..=2.0;
pub const TOP_P_RANGE: RangeInclusive<f32> = 0.1..=1.0;
pub const TOP_K_RANGE: RangeInclusive<u32> = 1..=50;
pub const STRICTNESS_RANGE: RangeInclusive<u32> = 1..=5;

pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_TOP_P: f32 = 0.9;
pub const DEFAULT_AI_SEARCH_ENABLED: bool = false;
pub const DEFAULT_DATA_RESPONSE_LIMIT_ENABLED: bool = false;
pub const DEFAULT_TOP_K: u32 = 5;
pub const DEFAULT_STRICTNESS: u32 = 1;

/// The flat, persisted shape of the settings. Always carries all six fields.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsSnapshot {
    pub temperature: f32,
    pub top_p: f32,
    pub ai_search_enabled: bool,
    pub data_response_limit_enabled: bool,
    pub top_k: u32,
    pub strictness: u32,
}

impl Default for SettingsSnapshot {
    fn default() -> Self {
        Self {
            temperature: DEFAULT_TEMPERATURE,
            top_p: DEFAULT_TOP_P,
            ai_search_enabled: DEFAULT_AI_SEARCH_ENABLED,
            data_response_limit_enabled: DEFAULT_DATA_RESPONSE_LIMIT_ENABLED,
            top_k: DEFAULT_TOP_K,
            strictness: DEFAULT_STRICTNESS,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("Settings data is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Settings data is not a JSON object")]
    NotAnObject,
    #[error("Settings data is missing {0}")]
    Missing(SettingField),
    #[error("Settings field {0} has the wrong type")]
    WrongType(SettingField),
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InputError {
    #[error("{field} expects a number, got {raw:?}")]
    NotANumber { field: SettingField, raw: String },
    #[error("{field} expects on/off, got {raw:?}")]
    NotABoolean { field: SettingField, raw: String },
}

/// Editable settings for one session.
///
/// Every write goes through a clamping setter, so the values held here are
/// always inside their ranges and consumers never re-validate them. Values of
/// inactive fields are kept, so switching a toggle off and on again restores
/// what the user had before.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct SettingsModel {
    values: SettingsSnapshot,
}

impl SettingsModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a model from a full snapshot, clamping anything out of range.
    pub fn from_snapshot(snapshot: SettingsSnapshot) -> Self {
        let mut model = Self::default();
        model.set_temperature(snapshot.temperature);
        model.set_top_p(snapshot.top_p);
        model.set_ai_search_enabled(snapshot.ai_search_enabled);
        model.set_data_response_limit_enabled(snapshot.data_response_limit_enabled);
        model.set_top_k(i64::from(snapshot.top_k));
        model.set_strictness(i64::from(snapshot.strictness));
        model
    }

    /// Builds a model from a possibly incomplete JSON object.
    ///
    /// A field that is present with the right type is clamped into range. A
    /// field that is absent or has the wrong type falls back to its default.
    /// Anything that is not an object yields the defaults.
    pub fn from_partial(value: &Value) -> Self {
        let mut model = Self::default();
        let Some(object) = value.as_object() else {
            return model;
        };

        let float = |field: SettingField| object.get(field.key()).and_then(Value::as_f64);
        let integer = |field: SettingField| object.get(field.key()).and_then(as_integer);
        let boolean = |field: SettingField| object.get(field.key()).and_then(Value::as_bool);

        if let Some(v) = float(SettingField::Temperature) {
            model.set_temperature(v as f32);
        }
        if let Some(v) = float(SettingField::TopP) {
            model.set_top_p(v as f32);
        }
        if let Some(v) = boolean(SettingField::AiSearchEnabled) {
            model.set_ai_search_enabled(v);
        }
        if let Some(v) = boolean(SettingField::DataResponseLimitEnabled) {
            model.set_data_response_limit_enabled(v);
        }
        if let Some(v) = integer(SettingField::TopK) {
            model.set_top_k(v);
        }
        if let Some(v) = integer(SettingField::Strictness) {
            model.set_strictness(v);
        }
        model
    }

    /// Builds a model from an object that must carry all six fields.
    ///
    /// Only a missing key or a value of the wrong JSON type is an error; any
    /// well-typed value, however far out of range, is clamped.
    pub fn from_complete(value: &Value) -> Result<Self, SnapshotError> {
        let object = value.as_object().ok_or(SnapshotError::NotAnObject)?;
        for field in SettingField::ALL {
            let v = object
                .get(field.key())
                .ok_or(SnapshotError::Missing(field))?;
            let well_typed = match field {
                SettingField::Temperature | SettingField::TopP => v.is_number(),
                SettingField::AiSearchEnabled | SettingField::DataResponseLimitEnabled => {
                    v.is_boolean()
                }
                SettingField::TopK | SettingField::Strictness => as_integer(v).is_some(),
            };
            if !well_typed {
                return Err(SnapshotError::WrongType(field));
            }
        }
        Ok(Self::from_partial(value))
    }

    /// Parses stored JSON text. Field-level problems degrade to defaults; only
    /// text that is not a JSON object at all is reported.
    ///
    /// A number beyond `f64` (e.g. `1e400`) makes the whole text invalid JSON
    /// to the parser, so such a document yields `SnapshotError::Json` and the
    /// caller's all-defaults fallback rather than a per-field one.
    pub fn from_json(text: &str) -> Result<Self, SnapshotError> {
        let value: Value = serde_json::from_str(text)?;
        if !value.is_object() {
            return Err(SnapshotError::NotAnObject);
        }
        Ok(Self::from_partial(&value))
    }

    pub fn to_snapshot(&self) -> SettingsSnapshot {
        self.values
    }

    pub fn reset(&mut self) {
        self.values = SettingsSnapshot::default();
    }

    pub fn temperature(&self) -> f32 {
        self.values.temperature
    }

    pub fn top_p(&self) -> f32 {
        self.values.top_p
    }

    pub fn ai_search_enabled(&self) -> bool {
        self.values.ai_search_enabled
    }

    pub fn data_response_limit_enabled(&self) -> bool {
        self.values.data_response_limit_enabled
    }

    pub fn top_k(&self) -> u32 {
        self.values.top_k
    }

    pub fn strictness(&self) -> u32 {
        self.values.strictness
    }

    pub fn set_temperature(&mut self, value: f32) {
        self.values.temperature = clamp_float(value, &TEMPERATURE_RANGE);
    }

    pub fn set_top_p(&mut self, value: f32) {
        self.values.top_p = clamp_float(value, &TOP_P_RANGE);
    }

    pub fn set_top_k(&mut self, value: i64) {
        self.values.top_k = clamp_integer(value, &TOP_K_RANGE);
    }

    pub fn set_strictness(&mut self, value: i64) {
        self.values.strictness = clamp_integer(value, &STRICTNESS_RANGE);
    }

    pub fn set_ai_search_enabled(&mut self, value: bool) {
        self.values.ai_search_enabled = value;
    }

    pub fn set_data_response_limit_enabled(&mut self, value: bool) {
        self.values.data_response_limit_enabled = value;
    }

    /// Whether `field` matters under the current toggles.
    pub fn is_active(&self, field: SettingField) -> bool {
        match field {
            SettingField::Temperature | SettingField::TopP | SettingField::AiSearchEnabled => true,
            SettingField::TopK | SettingField::DataResponseLimitEnabled => {
                self.values.ai_search_enabled
            }
            SettingField::Strictness => {
                self.values.ai_search_enabled && self.values.data_response_limit_enabled
            }
        }
    }

    pub fn active_fields(&self) -> BTreeSet<SettingField> {
        SettingField::ALL
            .into_iter()
            .filter(|field| self.is_active(*field))
            .collect()
    }

    /// Applies raw text typed into an input for `field`.
    ///
    /// Empty text reads as zero (or off) and is then clamped like any other
    /// value. Text that does not parse is rejected and the stored value stays
    /// as it was.
    pub fn apply_input(&mut self, field: SettingField, raw: &str) -> Result<(), InputError> {
        let raw = raw.trim();
        match field {
            SettingField::Temperature => self.set_temperature(parse_number(field, raw)? as f32),
            SettingField::TopP => self.set_top_p(parse_number(field, raw)? as f32),
            SettingField::TopK => self.set_top_k(parse_number(field, raw)?.trunc() as i64),
            SettingField::Strictness => {
                self.set_strictness(parse_number(field, raw)?.trunc() as i64)
            }
            SettingField::AiSearchEnabled => self.set_ai_search_enabled(parse_toggle(field, raw)?),
            SettingField::DataResponseLimitEnabled => {
                self.set_data_response_limit_enabled(parse_toggle(field, raw)?)
            }
        }
        Ok(())
    }

    /// Current value formatted for display. Floats keep two decimals.
    pub fn display_value(&self, field: SettingField) -> String {
        match field {
            SettingField::Temperature => format!("{:.2}", self.values.temperature),
            SettingField::TopP => format!("{:.2}", self.values.top_p),
            SettingField::AiSearchEnabled => self.values.ai_search_enabled.to_string(),
            SettingField::DataResponseLimitEnabled => {
                self.values.data_response_limit_enabled.to_string()
            }
            SettingField::TopK => self.values.top_k.to_string(),
            SettingField::Strictness => self.values.strictness.to_string(),
        }
    }
}

impl From<SettingsSnapshot> for SettingsModel {
    fn from(snapshot: SettingsSnapshot) -> Self {
        Self::from_snapshot(snapshot)
    }
}

// NaN has no place in a range; it lands on the lower bound.
fn clamp_float(value: f32, range: &RangeInclusive<f32>) -> f32 {
    if value.is_nan() {
        return *range.start();
    }
    value.clamp(*range.start(), *range.end())
}

fn clamp_integer(value: i64, range: &RangeInclusive<u32>) -> u32 {
    let clamped = value.clamp(i64::from(*range.start()), i64::from(*range.end()));
    u32::try_from(clamped).unwrap_or(*range.start())
}

// Unsigned values beyond i64 still count as integers; they clamp to the top.
fn as_integer(value: &Value) -> Option<i64> {
    value
        .as_i64()
        .or_else(|| value.as_u64().map(|_| i64::MAX))
}

fn parse_number(field: SettingField, raw: &str) -> Result<f64, InputError> {
    if raw.is_empty() {
        return Ok(0.0);
    }
    raw.parse::<f64>().map_err(|_| InputError::NotANumber {
        field,
        raw: raw.to_string(),
    })
}

fn parse_toggle(field: SettingField, raw: &str) -> Result<bool, InputError> {
    match raw.to_ascii_lowercase().as_str() {
        "" | "false" | "0" | "off" | "no" => Ok(false),
        "true" | "1" | "on" | "yes" => Ok(true),
        _ => Err(InputError::NotABoolean {
            field,
            raw: raw.to_string(),
        }),
    }
}
