use super::field::SettingField;
use super::settings::SettingsModel;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Parameters handed to a completion backend. Only active settings appear.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationParams {
    pub temperature: f32,
    pub top_p: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retrieval: Option<RetrievalParams>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetrievalParams {
    pub top_k: u32,
    /// Answers restricted to retrieved documents
    pub in_scope: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strictness: Option<u32>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EffectiveSettings {
    pub active_fields: BTreeSet<SettingField>,
    pub params: GenerationParams,
}

impl SettingsModel {
    pub fn generation_params(&self) -> GenerationParams {
        let retrieval = self.is_active(SettingField::TopK).then(|| RetrievalParams {
            top_k: self.top_k(),
            in_scope: self.data_response_limit_enabled(),
            strictness: self
                .is_active(SettingField::Strictness)
                .then(|| self.strictness()),
        });

        GenerationParams {
            temperature: self.temperature(),
            top_p: self.top_p(),
            retrieval,
        }
    }

    pub fn effective(&self) -> EffectiveSettings {
        EffectiveSettings {
            active_fields: self.active_fields(),
            params: self.generation_params(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn retrieval_is_omitted_without_ai_search() {
        let mut model = SettingsModel::new();
        model.set_data_response_limit_enabled(true);
        model.set_strictness(5);

        let params = model.generation_params();
        assert_eq!(params.retrieval, None);
        assert_eq!(
            serde_json::to_value(&params).unwrap(),
            json!({ "temperature": 0.7f32, "topP": 0.9f32 })
        );
    }

    #[test]
    fn strictness_requires_both_toggles() {
        let mut model = SettingsModel::new();
        model.set_ai_search_enabled(true);
        model.set_top_k(20);
        model.set_strictness(3);

        let retrieval = model.generation_params().retrieval.unwrap();
        assert_eq!(retrieval.top_k, 20);
        assert!(!retrieval.in_scope);
        assert_eq!(retrieval.strictness, None);

        model.set_data_response_limit_enabled(true);
        let retrieval = model.generation_params().retrieval.unwrap();
        assert!(retrieval.in_scope);
        assert_eq!(retrieval.strictness, Some(3));
    }

    #[test]
    fn effective_lists_active_fields_in_wire_order() {
        let mut model = SettingsModel::new();
        model.set_ai_search_enabled(true);
        let value = serde_json::to_value(model.effective()).unwrap();
        assert_eq!(
            value["activeFields"],
            json!([
                "temperature",
                "topP",
                "aiSearchEnabled",
                "dataResponseLimitEnabled",
                "topK"
            ])
        );
    }
}
