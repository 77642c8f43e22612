//! English rendering of validation message keys.

use std::collections::BTreeMap;

use apiconf_reconcile::Translate;

pub struct English;

impl Translate for English {
    fn translate(&self, key: &str, params: &BTreeMap<&'static str, String>) -> String {
        let param = |name: &str| params.get(name).map_or("?", String::as_str);
        match key.strip_prefix("settings:validation.").unwrap_or(key) {
            "apiKey" => format!("You must provide a valid API key ({}).", param("field")),
            "awsRegion" => "You must choose a region to use with Amazon Bedrock.".to_string(),
            "customArn" => "You must provide a custom ARN.".to_string(),
            "googleCloud" => "You must provide a valid Google Cloud project ID and region.".to_string(),
            "openAi" => format!("You must provide a valid {}.", param("field")),
            "modelId" => "You must provide a valid model ID.".to_string(),
            "modelSelector" => "You must provide a valid model selector.".to_string(),
            "baseUrl" => format!(
                "{} must be an http(s) URL, got \"{}\".",
                param("field"),
                param("value")
            ),
            "invalidArnFormat" => format!(
                "Invalid ARN format \"{}\". Expected arn:aws:bedrock:<region>:<account>:<resource>.",
                param("arn")
            ),
            "modelAvailability" => format!(
                "The model ID ({}) you provided is not available. Please choose a different model.",
                param("modelId")
            ),
            _ => key.to_string(),
        }
    }
}
