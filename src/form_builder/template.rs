use super::layout::{Layout, ServerId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PublishStatus {
    #[default]
    Draft,
    Saved,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishRecord {
    pub last_published_at: DateTime<Utc>,
    #[serde(rename = "formLayoutComponents")]
    pub layout: Layout,
}

/// A form as the editor knows it: metadata plus the layout being edited.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ServerId>,
    pub form_id: i64,
    pub form_name: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_published_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub publish_status: PublishStatus,
    #[serde(rename = "formLayoutComponents", default)]
    pub layout: Layout,
    #[serde(default)]
    pub publish_history: Vec<PublishRecord>,
    #[serde(default)]
    pub creator: String,
    #[serde(default)]
    pub file: Option<serde_json::Value>,
}

impl Template {
    /// A fresh local draft with an empty layout.
    pub fn new_draft(form_name: impl Into<String>, form_id: i64, creator: impl Into<String>) -> Self {
        Self {
            id: None,
            form_id,
            form_name: form_name.into(),
            created_at: Some(Utc::now()),
            updated_at: None,
            last_published_at: None,
            publish_status: PublishStatus::Draft,
            layout: Layout::new(),
            publish_history: Vec::new(),
            creator: creator.into(),
            file: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drafts_survive_storage_encoding() {
        let template = Template::new_draft("Intake", 7, "Test User");
        let raw = serde_json::to_string(&template).unwrap();
        assert!(raw.contains("\"formLayoutComponents\":[]"));
        assert!(raw.contains("\"publishStatus\":\"draft\""));

        let back: Template = serde_json::from_str(&raw).unwrap();
        assert_eq!(back, template);
    }
}
