use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One of the six persisted settings. Variant order is the wire order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SettingField {
    Temperature,
    TopP,
    AiSearchEnabled,
    DataResponseLimitEnabled,
    TopK,
    Strictness,
}

impl SettingField {
    pub const ALL: [SettingField; 6] = [
        SettingField::Temperature,
        SettingField::TopP,
        SettingField::AiSearchEnabled,
        SettingField::DataResponseLimitEnabled,
        SettingField::TopK,
        SettingField::Strictness,
    ];

    /// Key used in the persisted JSON object.
    pub fn key(self) -> &'static str {
        match self {
            SettingField::Temperature => "temperature",
            SettingField::TopP => "topP",
            SettingField::AiSearchEnabled => "aiSearchEnabled",
            SettingField::DataResponseLimitEnabled => "dataResponseLimitEnabled",
            SettingField::TopK => "topK",
            SettingField::Strictness => "strictness",
        }
    }

    fn snake_name(self) -> &'static str {
        match self {
            SettingField::Temperature => "temperature",
            SettingField::TopP => "top_p",
            SettingField::AiSearchEnabled => "ai_search_enabled",
            SettingField::DataResponseLimitEnabled => "data_response_limit_enabled",
            SettingField::TopK => "top_k",
            SettingField::Strictness => "strictness",
        }
    }
}

impl fmt::Display for SettingField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown setting field: {0}")]
pub struct UnknownField(pub String);

impl FromStr for SettingField {
    type Err = UnknownField;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        SettingField::ALL
            .into_iter()
            .find(|field| field.key() == s || field.snake_name() == s)
            .ok_or_else(|| UnknownField(s.to_string()))
    }
}
