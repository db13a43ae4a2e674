//! The list of forms a user can open: local drafts merged with the forms
//! the backend has published.

use super::schema::Form;
use super::template::Template;
use std::collections::BTreeMap;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FormSummary {
    pub form_id: i64,
    pub form_name: String,
    pub has_draft: bool,
    pub published: bool,
}

/// One entry per form id, ordered by id. A local draft's name wins over the
/// published one since it holds the newer edits.
pub fn catalog(drafts: &[Template], published: &[Form]) -> Vec<FormSummary> {
    let mut entries: BTreeMap<i64, FormSummary> = BTreeMap::new();

    for form in published {
        entries.insert(
            form.form_id,
            FormSummary { form_id: form.form_id, form_name: form.form_name.clone(), has_draft: false, published: true },
        );
    }
    for draft in drafts {
        let entry = entries.entry(draft.form_id).or_insert_with(|| FormSummary {
            form_id: draft.form_id,
            form_name: String::new(),
            has_draft: false,
            published: draft.id.is_some(),
        });
        entry.form_name = draft.form_name.clone();
        entry.has_draft = true;
    }

    entries.into_values().collect()
}

/// The draft touched most recently, falling back to creation time.
pub fn latest_draft(drafts: Vec<Template>) -> Option<Template> {
    drafts.into_iter().max_by_key(|draft| draft.updated_at.or(draft.created_at))
}

/// Whether a new form may take `form_id`.
pub fn is_taken(entries: &[FormSummary], form_id: i64) -> bool {
    entries.iter().any(|entry| entry.form_id == form_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn published(form_id: i64, name: &str) -> Form {
        Form {
            id: Some(form_id.to_string().as_str().into()),
            form_id,
            form_name: name.into(),
            pdf: None,
            blocks: Vec::new(),
            creation_date: None,
            modification_date: None,
        }
    }

    #[test]
    fn merges_drafts_with_published_forms() {
        let drafts = vec![Template::new_draft("Intake (edited)", 2, "Test User"), Template::new_draft("Local", 9, "Test User")];
        let forms = vec![published(2, "Intake"), published(1, "Survey")];

        let entries = catalog(&drafts, &forms);
        let ids: Vec<i64> = entries.iter().map(|e| e.form_id).collect();
        assert_eq!(ids, vec![1, 2, 9]);

        assert_eq!(entries[0], FormSummary { form_id: 1, form_name: "Survey".into(), has_draft: false, published: true });
        assert_eq!(entries[1].form_name, "Intake (edited)");
        assert!(entries[1].has_draft && entries[1].published);
        assert!(entries[2].has_draft && !entries[2].published);
        assert!(is_taken(&entries, 9));
        assert!(!is_taken(&entries, 3));
    }

    #[test]
    fn latest_draft_prefers_recent_updates() {
        let mut old = Template::new_draft("Old", 1, "Test User");
        old.updated_at = Some(Utc::now() - Duration::days(2));
        let mut recent = Template::new_draft("Recent", 2, "Test User");
        recent.updated_at = Some(Utc::now());

        assert_eq!(latest_draft(vec![recent, old]).map(|t| t.form_id), Some(2));
        assert_eq!(latest_draft(Vec::new()), None);
    }
}
