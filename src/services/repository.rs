//! Storage for local drafts.

use crate::error::RepositoryError;
use crate::form_builder::template::Template;
use std::cell::RefCell;
use tracing::debug;
use web_sys::Storage;

pub trait TemplateRepository {
    fn load(&self, form_id: i64) -> Result<Option<Template>, RepositoryError>;

    /// Inserts the template, replacing any stored one with the same form id.
    fn save(&self, template: &Template) -> Result<(), RepositoryError>;

    fn list(&self) -> Result<Vec<Template>, RepositoryError>;

    fn delete(&self, form_id: i64) -> Result<(), RepositoryError>;
}

fn upsert(templates: &mut Vec<Template>, template: &Template) {
    match templates.iter_mut().find(|stored| stored.form_id == template.form_id) {
        Some(stored) => *stored = template.clone(),
        None => templates.push(template.clone()),
    }
}

fn remove(templates: &mut Vec<Template>, form_id: i64) -> Result<(), RepositoryError> {
    let position = templates
        .iter()
        .position(|stored| stored.form_id == form_id)
        .ok_or(RepositoryError::NotFound(form_id))?;
    templates.remove(position);
    Ok(())
}

#[derive(Debug, Default)]
pub struct MemoryRepository {
    templates: RefCell<Vec<Template>>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TemplateRepository for MemoryRepository {
    fn load(&self, form_id: i64) -> Result<Option<Template>, RepositoryError> {
        Ok(self.templates.borrow().iter().find(|t| t.form_id == form_id).cloned())
    }

    fn save(&self, template: &Template) -> Result<(), RepositoryError> {
        upsert(&mut self.templates.borrow_mut(), template);
        Ok(())
    }

    fn list(&self) -> Result<Vec<Template>, RepositoryError> {
        Ok(self.templates.borrow().clone())
    }

    fn delete(&self, form_id: i64) -> Result<(), RepositoryError> {
        remove(&mut self.templates.borrow_mut(), form_id)
    }
}

/// Drafts kept as one JSON array under a single `localStorage` key.
#[derive(Clone, Debug)]
pub struct LocalStorageRepository {
    key: String,
}

impl LocalStorageRepository {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }

    fn storage(&self) -> Result<Storage, RepositoryError> {
        web_sys::window()
            .ok_or(RepositoryError::StorageUnavailable)?
            .local_storage()?
            .ok_or(RepositoryError::StorageUnavailable)
    }

    fn read(&self) -> Result<Vec<Template>, RepositoryError> {
        let raw = self.storage()?.get_item(&self.key)?;
        match raw {
            Some(raw) => Ok(serde_json::from_str(&raw)?),
            None => Ok(Vec::new()),
        }
    }

    fn write(&self, templates: &[Template]) -> Result<(), RepositoryError> {
        let raw = serde_json::to_string(templates)?;
        self.storage()?.set_item(&self.key, &raw)?;
        debug!(key = %self.key, count = templates.len(), "drafts written");
        Ok(())
    }
}

impl TemplateRepository for LocalStorageRepository {
    fn load(&self, form_id: i64) -> Result<Option<Template>, RepositoryError> {
        Ok(self.read()?.into_iter().find(|t| t.form_id == form_id))
    }

    fn save(&self, template: &Template) -> Result<(), RepositoryError> {
        let mut templates = self.read()?;
        upsert(&mut templates, template);
        self.write(&templates)
    }

    fn list(&self) -> Result<Vec<Template>, RepositoryError> {
        self.read()
    }

    fn delete(&self, form_id: i64) -> Result<(), RepositoryError> {
        let mut templates = self.read()?;
        remove(&mut templates, form_id)?;
        self.write(&templates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_replaces_by_form_id() {
        let repo = MemoryRepository::new();
        let mut template = Template::new_draft("Intake", 1, "Test User");
        repo.save(&template).unwrap();
        template.form_name = "Renamed".into();
        repo.save(&template).unwrap();
        repo.save(&Template::new_draft("Other", 2, "Test User")).unwrap();

        let all = repo.list().unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(repo.load(1).unwrap().unwrap().form_name, "Renamed");
    }

    #[test]
    fn delete_reports_missing() {
        let repo = MemoryRepository::new();
        repo.save(&Template::new_draft("Intake", 1, "Test User")).unwrap();
        repo.delete(1).unwrap();
        assert!(matches!(repo.delete(1), Err(RepositoryError::NotFound(1))));
        assert_eq!(repo.load(1).unwrap(), None);
    }
}
