use crate::config::BuilderConfig;
use crate::error::BackendError;
use crate::form_builder::layout::ServerId;
use crate::form_builder::schema::{Block, Field, Form};
use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;
use std::cell::{Cell, RefCell};
use tracing::{debug, warn};

/// The form structure service.
///
/// Futures are not `Send`: in the browser everything runs on one thread.
#[async_trait(?Send)]
pub trait FormBackend {
    /// Creates a form, or a new version when `form.id` is set. Returns the
    /// stored form with ids for every block and field.
    async fn publish(&self, form: &Form) -> Result<Form, BackendError>;

    async fn update_field(&self, field_id: &ServerId, payload: &Field) -> Result<(), BackendError>;

    async fn update_block(&self, block_id: &ServerId, payload: &Block) -> Result<(), BackendError>;

    async fn fetch_form(&self, form_id: i64) -> Result<Form, BackendError>;

    async fn list_forms(&self) -> Result<Vec<Form>, BackendError>;
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

#[derive(Clone, Debug)]
pub struct HttpBackend {
    client: reqwest::Client,
    base: String,
}

impl HttpBackend {
    pub fn new(config: &BuilderConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            base: config.api_base().to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response, BackendError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&body)
            .ok()
            .and_then(|parsed| parsed.message)
            .or_else(|| (!body.trim().is_empty()).then(|| body.clone()))
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("Something went wrong").to_string());

        warn!(status = status.as_u16(), %message, "backend rejected request");
        Err(BackendError::Status { status: status.as_u16(), message })
    }
}

#[async_trait(?Send)]
impl FormBackend for HttpBackend {
    async fn publish(&self, form: &Form) -> Result<Form, BackendError> {
        let request = match &form.id {
            Some(_) => self.client.put(self.url(&format!("/api/formStructure/{}", form.form_id))),
            None => self.client.post(self.url("/api/formStructure/")),
        };
        debug!(form_id = form.form_id, update = form.id.is_some(), "publishing form");

        let response = Self::check(request.json(form).send().await?).await?;
        Ok(response.json().await?)
    }

    async fn update_field(&self, field_id: &ServerId, payload: &Field) -> Result<(), BackendError> {
        let request = self.client.put(self.url(&format!("/api/field/{field_id}"))).json(payload);
        Self::check(request.send().await?).await?;
        Ok(())
    }

    async fn update_block(&self, block_id: &ServerId, payload: &Block) -> Result<(), BackendError> {
        let request = self.client.put(self.url(&format!("/api/block/{block_id}"))).json(payload);
        Self::check(request.send().await?).await?;
        Ok(())
    }

    async fn fetch_form(&self, form_id: i64) -> Result<Form, BackendError> {
        let request = self.client.get(self.url(&format!("/api/formStructure/by-form-id/{form_id}")));
        let response = Self::check(request.send().await?).await?;
        Ok(response.json().await?)
    }

    async fn list_forms(&self) -> Result<Vec<Form>, BackendError> {
        let response = Self::check(self.client.get(self.url("/api/formStructure/")).send().await?).await?;
        Ok(response.json().await?)
    }
}

/// Backend kept entirely in memory. Assigns numeric ids on publish the way
/// the service does, and can be switched into a failing mode.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    next_id: Cell<u64>,
    failure: RefCell<Option<String>>,
    forms: RefCell<Vec<Form>>,
    field_updates: RefCell<Vec<(ServerId, Field)>>,
    block_updates: RefCell<Vec<(ServerId, Block)>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every following call fail with `message` until cleared.
    pub fn fail_with(&self, message: Option<&str>) {
        *self.failure.borrow_mut() = message.map(str::to_string);
    }

    pub fn forms(&self) -> Vec<Form> {
        self.forms.borrow().clone()
    }

    pub fn field_updates(&self) -> Vec<(ServerId, Field)> {
        self.field_updates.borrow().clone()
    }

    pub fn block_updates(&self) -> Vec<(ServerId, Block)> {
        self.block_updates.borrow().clone()
    }

    fn check(&self) -> Result<(), BackendError> {
        match self.failure.borrow().as_ref() {
            Some(message) => Err(BackendError::Status { status: 500, message: message.clone() }),
            None => Ok(()),
        }
    }

    fn assign(&self, id: &mut Option<ServerId>) {
        if id.is_none() {
            let next = self.next_id.get() + 1;
            self.next_id.set(next);
            *id = Some(ServerId(next.to_string()));
        }
    }
}

#[async_trait(?Send)]
impl FormBackend for MemoryBackend {
    async fn publish(&self, form: &Form) -> Result<Form, BackendError> {
        self.check()?;

        let mut stored = form.clone();
        self.assign(&mut stored.id);
        for block in &mut stored.blocks {
            self.assign(&mut block.id);
            for field in &mut block.fields {
                self.assign(&mut field.id);
                for option in field.options.iter_mut().flatten() {
                    self.assign(&mut option.id);
                }
            }
        }
        let now = Utc::now().to_rfc3339();
        if stored.creation_date.is_none() {
            stored.creation_date = Some(now.clone());
        }
        stored.modification_date = Some(now);

        let mut forms = self.forms.borrow_mut();
        forms.retain(|existing| existing.form_id != stored.form_id);
        forms.push(stored.clone());
        Ok(stored)
    }

    async fn update_field(&self, field_id: &ServerId, payload: &Field) -> Result<(), BackendError> {
        self.check()?;
        self.field_updates.borrow_mut().push((field_id.clone(), payload.clone()));
        Ok(())
    }

    async fn update_block(&self, block_id: &ServerId, payload: &Block) -> Result<(), BackendError> {
        self.check()?;
        self.block_updates.borrow_mut().push((block_id.clone(), payload.clone()));
        Ok(())
    }

    async fn fetch_form(&self, form_id: i64) -> Result<Form, BackendError> {
        self.check()?;
        self.forms
            .borrow()
            .iter()
            .find(|form| form.form_id == form_id)
            .cloned()
            .ok_or_else(|| BackendError::Status { status: 404, message: format!("form {form_id} not found") })
    }

    async fn list_forms(&self) -> Result<Vec<Form>, BackendError> {
        self.check()?;
        Ok(self.forms())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form_builder::layout::BlockType;
    use crate::form_builder::schema::{FieldType, WireOption};

    fn form() -> Form {
        Form {
            id: None,
            form_id: 3,
            form_name: "Intake".into(),
            pdf: None,
            blocks: vec![Block {
                id: None,
                sequence: 1,
                title: "Step".into(),
                block_type: BlockType::Input,
                skip_able: false,
                fields: vec![Field {
                    id: None,
                    field_type: FieldType::Radio,
                    name: "pick".into(),
                    label: "Pick".into(),
                    placeholder: None,
                    information: String::new(),
                    required: false,
                    sequence: 0,
                    options: Some(vec![WireOption { id: None, value: "a".into(), label: "A".into() }]),
                    version: None,
                }],
            }],
            creation_date: None,
            modification_date: None,
        }
    }

    #[tokio::test]
    async fn publish_assigns_ids_everywhere() {
        let backend = MemoryBackend::new();
        let stored = backend.publish(&form()).await.unwrap();
        assert!(stored.id.is_some());
        let field = &stored.blocks[0].fields[0];
        assert!(stored.blocks[0].id.is_some() && field.id.is_some());
        assert!(field.options.as_ref().unwrap()[0].id.is_some());
        assert_eq!(backend.fetch_form(3).await.unwrap(), stored);
    }

    #[tokio::test]
    async fn failing_mode_rejects_calls() {
        let backend = MemoryBackend::new();
        backend.fail_with(Some("down"));
        let err = backend.publish(&form()).await.unwrap_err();
        assert!(matches!(err, BackendError::Status { status: 500, .. }));
        assert!(backend.forms().is_empty());

        backend.fail_with(None);
        assert!(backend.list_forms().await.unwrap().is_empty());
    }

    #[test]
    fn urls_join_without_double_slashes() {
        let config = BuilderConfig::from_json(r#"{"apiEndpoint": "https://api.example.org/"}"#).unwrap();
        let backend = HttpBackend::new(&config);
        assert_eq!(backend.url("/api/field/4"), "https://api.example.org/api/field/4");
    }
}
