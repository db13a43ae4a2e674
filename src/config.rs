use serde::Deserialize;
use std::time::Duration;

const DEFAULT_API_ENDPOINT: &str = "http://localhost:8080";

/// Runtime settings for the builder.
///
/// The API endpoint is baked in at compile time through
/// `FORM_BUILDER_API_ENDPOINT`, the way the web bundle is built per
/// environment. Everything can be overridden with [`BuilderConfig::from_json`].
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BuilderConfig {
    pub api_endpoint: String,
    pub storage_key: String,
    pub success_notice_ms: u64,
    pub failure_notice_ms: u64,
    pub creator: String,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            api_endpoint: option_env!("FORM_BUILDER_API_ENDPOINT")
                .unwrap_or(DEFAULT_API_ENDPOINT)
                .to_string(),
            storage_key: "templates".to_string(),
            success_notice_ms: 3000,
            failure_notice_ms: 5000,
            creator: "Test User".to_string(),
        }
    }
}

impl BuilderConfig {
    /// Parses a partial JSON document on top of the defaults.
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    pub fn success_duration(&self) -> Duration {
        Duration::from_millis(self.success_notice_ms)
    }

    pub fn failure_duration(&self) -> Duration {
        Duration::from_millis(self.failure_notice_ms)
    }

    /// Endpoint without a trailing slash so paths can be appended directly.
    pub fn api_base(&self) -> &str {
        self.api_endpoint.trim_end_matches('/')
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let config = BuilderConfig::from_json(r#"{"apiEndpoint": "https://forms.example.org/"}"#).unwrap();
        assert_eq!(config.api_base(), "https://forms.example.org");
        assert_eq!(config.storage_key, "templates");
        assert_eq!(config.failure_duration(), Duration::from_secs(5));
    }

    #[test]
    fn rejects_wrong_types() {
        assert!(BuilderConfig::from_json(r#"{"successNoticeMs": "soon"}"#).is_err());
    }
}
