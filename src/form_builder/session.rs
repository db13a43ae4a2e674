//! The editor session owns the template being edited. The UI holds one in a
//! context signal and calls into it from event handlers.
//!
//! Operations that talk to the backend are split in two: a synchronous step
//! that validates and returns a [`PendingRequest`], and [`EditorSession::complete`]
//! which applies the outcome. The request is sent in between without holding
//! the session, so the UI never keeps a borrow across an await point.

use super::catalog::{self, FormSummary};
use super::drag::{DragEngine, DropAction, DropZone, SlotRect};
use super::ids::IdGenerator;
use super::layout::{Layout, NodeRef, ServerId};
use super::palette::{ContainerTemplate, ControlTemplate};
use super::schema::{self, Block, Field, Form};
use super::selection::{NodeKey, PropertyDraft, SelectedNode, SelectionCursor};
use super::template::{PublishRecord, PublishStatus, Template};
use crate::config::BuilderConfig;
use crate::error::{BackendError, EditorError, LayoutError, RepositoryError, ValidationError};
use crate::services::{FormBackend, NoticeKind, Notifier, TemplateRepository};
use chrono::Utc;
use std::rc::Rc;
use tracing::{debug, info, warn};

pub const DELETE_CONTAINER_PROMPT: &str = "Are you sure you want to delete container?";

/// Interactive yes/no question asked before destructive edits.
pub trait Confirm {
    fn confirm(&self, message: &str) -> bool;
}

impl<F: Fn(&str) -> bool> Confirm for F {
    fn confirm(&self, message: &str) -> bool {
        self(message)
    }
}

/// A backend call prepared by the session.
///
/// Update requests carry the layout with the edit already applied; it only
/// replaces the session layout once the call succeeded.
#[derive(Clone, Debug, PartialEq)]
pub enum PendingRequest {
    Publish {
        form: Form,
        revision: u64,
    },
    UpdateBlock {
        block_id: ServerId,
        payload: Block,
        layout: Layout,
        revision: u64,
    },
    UpdateField {
        field_id: ServerId,
        payload: Field,
        layout: Layout,
        revision: u64,
    },
}

impl PendingRequest {
    pub async fn send(&self, backend: &dyn FormBackend) -> Result<Option<Form>, BackendError> {
        match self {
            PendingRequest::Publish { form, .. } => backend.publish(form).await.map(Some),
            PendingRequest::UpdateBlock { block_id, payload, .. } => {
                backend.update_block(block_id, payload).await.map(|_| None)
            }
            PendingRequest::UpdateField { field_id, payload, .. } => {
                backend.update_field(field_id, payload).await.map(|_| None)
            }
        }
    }

    fn revision(&self) -> u64 {
        match self {
            PendingRequest::Publish { revision, .. }
            | PendingRequest::UpdateBlock { revision, .. }
            | PendingRequest::UpdateField { revision, .. } => *revision,
        }
    }

    fn success_message(&self) -> &'static str {
        match self {
            PendingRequest::Publish { .. } => "Form saved successfully",
            PendingRequest::UpdateBlock { .. } => "Block updated successfully",
            PendingRequest::UpdateField { .. } => "Field updated successfully",
        }
    }

    fn failure_message(&self) -> &'static str {
        match self {
            PendingRequest::Publish { .. } => "Failed to save form",
            PendingRequest::UpdateBlock { .. } => "Failed to update block",
            PendingRequest::UpdateField { .. } => "Failed to update field",
        }
    }
}

pub struct EditorSession {
    template: Template,
    selection: SelectionCursor,
    draft: Option<PropertyDraft>,
    drag: DragEngine,
    ids: Rc<dyn IdGenerator>,
    notifier: Rc<dyn Notifier>,
    config: BuilderConfig,
    revision: u64,
}

impl EditorSession {
    pub fn new(template: Template, config: BuilderConfig, ids: Rc<dyn IdGenerator>, notifier: Rc<dyn Notifier>) -> Self {
        info!(form_id = template.form_id, name = %template.form_name, "editor session opened");
        Self {
            template,
            selection: SelectionCursor::default(),
            draft: None,
            drag: DragEngine::new(),
            ids,
            notifier,
            config,
            revision: 0,
        }
    }

    pub fn template(&self) -> &Template {
        &self.template
    }

    pub fn layout(&self) -> &Layout {
        &self.template.layout
    }

    pub fn config(&self) -> &BuilderConfig {
        &self.config
    }

    /// Bumped on every accepted change to the layout.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn selection(&self) -> &SelectionCursor {
        &self.selection
    }

    pub fn selected(&self) -> Option<SelectedNode<'_>> {
        self.selection.resolve(&self.template.layout)
    }

    pub fn draft(&self) -> Option<&PropertyDraft> {
        self.draft.as_ref()
    }

    pub fn draft_mut(&mut self) -> Option<&mut PropertyDraft> {
        self.draft.as_mut()
    }

    pub fn drag(&self) -> &DragEngine {
        &self.drag
    }

    fn success(&self, message: &str) {
        self.notifier.notify(NoticeKind::Success, message, self.config.success_duration());
    }

    fn danger(&self, message: &str) {
        self.notifier.notify(NoticeKind::Danger, message, self.config.failure_duration());
    }

    /// Runs a layout mutation. The revision only moves when it succeeded.
    fn mutate<T>(&mut self, change: impl FnOnce(&mut Layout) -> Result<T, LayoutError>) -> Result<T, EditorError> {
        let value = change(&mut self.template.layout)?;
        self.revision += 1;
        self.sync_selection();
        Ok(value)
    }

    /// Keeps the selection pointing at live nodes after a structural change.
    fn sync_selection(&mut self) {
        let Some(key) = self.selection.selected().cloned() else {
            return;
        };
        match key {
            NodeKey::Container(id) => {
                if self.template.layout.container(&id).is_none() {
                    self.clear_selection();
                }
            }
            NodeKey::Control { container_id, internal_id } => match self.template.layout.control(&internal_id) {
                None => self.clear_selection(),
                Some(control) if control.container_id != container_id => {
                    let moved_to = control.container_id.clone();
                    if let Some(PropertyDraft::Control(edit)) = &mut self.draft {
                        edit.container_id = moved_to.clone();
                    }
                    self.selection.select(NodeKey::Control { container_id: moved_to, internal_id });
                }
                Some(_) => {}
            },
        }
    }

    pub fn add_container(&mut self, template: &ContainerTemplate) -> String {
        let ids = Rc::clone(&self.ids);
        let key = self.template.layout.add_container(template, ids.as_ref());
        self.revision += 1;
        key
    }

    pub fn add_control(&mut self, template: &ControlTemplate, container_id: &str) -> Result<String, EditorError> {
        let ids = Rc::clone(&self.ids);
        self.mutate(|layout| layout.add_control(template, container_id, ids.as_ref()))
    }

    /// Asks for confirmation, then removes the container and its controls.
    pub fn delete_container(&mut self, target: &NodeRef, confirm: &dyn Confirm) -> Result<(), EditorError> {
        if !confirm.confirm(DELETE_CONTAINER_PROMPT) {
            debug!(container = %target, "container deletion declined");
            return Err(EditorError::Declined);
        }
        let removed = self.mutate(|layout| layout.remove_container(target))?;
        self.selection.forget_container(&removed);
        if self.selection.selected().is_none() {
            self.draft = None;
        }
        Ok(())
    }

    pub fn delete_control(&mut self, control: &NodeRef, container: &NodeRef) -> Result<(), EditorError> {
        let removed = self.mutate(|layout| layout.remove_control(control, container))?;
        self.selection.forget_control(&removed);
        if self.selection.selected().is_none() {
            self.draft = None;
        }
        Ok(())
    }

    /// Selects a node and opens a fresh working copy of it.
    pub fn select(&mut self, key: NodeKey) -> Result<(), EditorError> {
        let mut cursor = SelectionCursor::default();
        cursor.select(key.clone());
        let node = cursor.resolve(&self.template.layout).ok_or_else(|| match &key {
            NodeKey::Container(id) => LayoutError::ContainerNotFound(id.clone()),
            NodeKey::Control { internal_id, .. } => LayoutError::ControlNotFound(internal_id.clone()),
        })?;
        self.draft = Some(PropertyDraft::load(node));
        self.selection = cursor;
        Ok(())
    }

    /// Drops the selection together with any unsubmitted edits.
    pub fn clear_selection(&mut self) {
        self.selection.clear();
        self.draft = None;
    }

    pub fn cancel_draft(&mut self) {
        self.clear_selection();
    }

    /// Moves a control from the property panel. The moved control becomes
    /// the selection.
    pub fn move_control_from_side(
        &mut self,
        control: &NodeRef,
        to_container: &str,
        position: Option<usize>,
    ) -> Result<Option<String>, EditorError> {
        let moved = self.mutate(|layout| layout.move_control_from_side(control, to_container, position))?;
        if let Some(internal_id) = &moved {
            self.select(NodeKey::Control { container_id: to_container.to_string(), internal_id: internal_id.clone() })?;
        }
        Ok(moved)
    }

    pub fn clear_container_fields(&mut self, container_id: &str) -> Result<(), EditorError> {
        self.mutate(|layout| layout.clear_container_fields(container_id))
    }

    pub fn populate_signature_fields(&mut self, container_id: &str) -> Result<(), EditorError> {
        let ids = Rc::clone(&self.ids);
        self.mutate(|layout| layout.populate_signature_fields(container_id, ids.as_ref()))
    }

    pub fn begin_drag_container(&mut self, template: ContainerTemplate) {
        self.drag.begin_container(template);
    }

    pub fn begin_drag_palette_control(&mut self, template: ControlTemplate) {
        self.drag.begin_palette_control(template);
    }

    /// Picks up a control already on the canvas.
    pub fn begin_drag_control(&mut self, internal_id: &str) -> Result<(), EditorError> {
        let layout = &self.template.layout;
        let control = layout
            .control(internal_id)
            .ok_or_else(|| LayoutError::ControlNotFound(internal_id.to_string()))?;
        let index = layout
            .container(&control.container_id)
            .and_then(|entry| entry.children.iter().position(|child| child.internal_id == internal_id))
            .ok_or_else(|| LayoutError::ContainerNotFound(control.container_id.clone()))?;
        self.drag.begin_control(control, index);
        Ok(())
    }

    pub fn cancel_drag(&mut self) {
        self.drag.cancel();
    }

    pub fn drop_accepted(&self, zone: &DropZone) -> bool {
        self.drag.accepts(zone)
    }

    /// Feeds a hover over a control slot to the drag engine and applies the
    /// resulting reorder. Returns whether the layout changed.
    pub fn hover_control(
        &mut self,
        container_id: &str,
        hover_index: usize,
        slot: SlotRect,
        pointer_y: f64,
    ) -> Result<bool, EditorError> {
        let Some(reorder) = self.drag.hover(container_id, hover_index, slot, pointer_y) else {
            return Ok(false);
        };
        self.mutate(|layout| layout.reorder_control(&reorder.container_id, reorder.from, reorder.to))?;
        Ok(true)
    }

    /// Ends the drag on `zone` and applies the drop. Returns the key of the
    /// node that was added or moved.
    pub fn drop_on(&mut self, zone: DropZone, position: Option<usize>) -> Result<String, EditorError> {
        match self.drag.drop(zone, position)? {
            DropAction::AddContainer(template) => Ok(self.add_container(&template)),
            DropAction::AddControl { template, container_id, position } => {
                let key = self.add_control(&template, &container_id)?;
                if position.is_some() {
                    self.mutate(|layout| layout.transfer_control(&key, &container_id, position))?;
                }
                Ok(key)
            }
            DropAction::MoveControl { internal_id, to_container, position } => {
                self.mutate(|layout| layout.transfer_control(&internal_id, &to_container, position))?;
                Ok(internal_id)
            }
        }
    }

    /// Applies the working copy.
    ///
    /// With [`PublishStatus::Draft`] the edit lands locally and `None` is
    /// returned. With [`PublishStatus::Saved`] the edit is sent to the
    /// backend: nodes with a server id get a partial update, a control
    /// without one publishes the whole form. The returned request must be
    /// sent and handed to [`EditorSession::complete`].
    pub fn submit_draft(&mut self, status: PublishStatus) -> Result<Option<PendingRequest>, EditorError> {
        let draft = self.draft.clone().ok_or(EditorError::NothingSelected)?;

        let mut edited = self.template.layout.clone();
        match &draft {
            PropertyDraft::Container(edit) => edited.apply_container_edit(edit)?,
            PropertyDraft::Control(edit) => edited.apply_control_edit(edit)?,
        }

        if status == PublishStatus::Draft {
            self.template.layout = edited;
            self.revision += 1;
            debug!(node = ?draft.key(), "draft applied locally");
            return Ok(None);
        }

        let revision = self.revision;
        let request = match &draft {
            PropertyDraft::Container(edit) => {
                let entry = edited
                    .container(&edit.internal_id)
                    .ok_or_else(|| LayoutError::ContainerNotFound(edit.internal_id.clone()))?;
                let Some(block_id) = entry.container.id.clone() else {
                    return Err(self.reject(ValidationError::MissingServerId("container")));
                };
                let payload = schema::block_update(entry).map_err(|err| self.reject(err))?;
                PendingRequest::UpdateBlock { block_id, payload, layout: edited, revision }
            }
            PropertyDraft::Control(edit) => {
                let control = edited
                    .control(&edit.internal_id)
                    .ok_or_else(|| LayoutError::ControlNotFound(edit.internal_id.clone()))?;
                match control.id.clone() {
                    Some(field_id) => {
                        let payload = schema::field_update(control).map_err(|err| self.reject(err))?;
                        PendingRequest::UpdateField { field_id, payload, layout: edited, revision }
                    }
                    None => {
                        self.validate_layout(&edited)?;
                        let form = self.outbound_form(&edited, None)?;
                        PendingRequest::Publish { form, revision }
                    }
                }
            }
        };
        Ok(Some(request))
    }

    /// Validates and converts the layout for publishing, optionally with a
    /// pdf attachment.
    pub fn publish_form(&mut self, pdf: Option<serde_json::Value>) -> Result<PendingRequest, EditorError> {
        self.validate()?;
        let form = self.outbound_form(&self.template.layout, pdf)?;
        info!(form_id = form.form_id, blocks = form.blocks.len(), "publishing form");
        Ok(PendingRequest::Publish { form, revision: self.revision })
    }

    fn outbound_form(&self, layout: &Layout, pdf: Option<serde_json::Value>) -> Result<Form, EditorError> {
        let blocks = schema::convert(layout).map_err(|err| self.reject(err))?;
        Ok(Form {
            id: self.template.id.clone(),
            form_id: self.template.form_id,
            form_name: self.template.form_name.clone(),
            pdf: pdf.or_else(|| self.template.file.clone()),
            blocks: blocks.blocks,
            creation_date: None,
            modification_date: None,
        })
    }

    /// Applies the outcome of a request prepared by this session.
    pub fn complete(
        &mut self,
        request: PendingRequest,
        result: Result<Option<Form>, BackendError>,
    ) -> Result<(), EditorError> {
        let response = match result {
            Ok(response) => response,
            Err(err) => {
                warn!(%err, "backend request failed");
                self.danger(request.failure_message());
                return Err(err.into());
            }
        };

        if request.revision() != self.revision {
            warn!(
                sent = request.revision(),
                current = self.revision,
                "layout changed while the request was in flight; keeping the server snapshot"
            );
        }

        let message = request.success_message();
        match request {
            PendingRequest::Publish { .. } => match response {
                Some(form) => self.ingest(&form),
                None => warn!("publish returned no form"),
            },
            PendingRequest::UpdateBlock { layout, .. } | PendingRequest::UpdateField { layout, .. } => {
                self.replace_layout(layout);
            }
        }
        self.success(message);
        Ok(())
    }

    /// Sends `request` and applies the result.
    pub async fn run(&mut self, request: PendingRequest, backend: &dyn FormBackend) -> Result<(), EditorError> {
        let result = request.send(backend).await;
        self.complete(request, result)
    }

    /// Replaces the whole template with a form fetched from the backend.
    /// Selection, working copy and any drag in progress are dropped.
    pub fn open_form(&mut self, fetched: Result<Form, BackendError>) -> Result<(), EditorError> {
        let form = fetched.map_err(|err| {
            warn!(%err, "form could not be loaded");
            self.danger("Failed to load form");
            err
        })?;

        let mut template = schema::convert_form(&form, self.ids.as_ref(), &self.template.creator);
        if template.form_id == self.template.form_id {
            template.publish_history = std::mem::take(&mut self.template.publish_history);
        }
        self.switch_template(template);
        info!(form_id = self.template.form_id, "form opened from server");
        Ok(())
    }

    /// Opens the local draft stored for `form_id`.
    pub fn open_draft(&mut self, form_id: i64, repository: &dyn TemplateRepository) -> Result<(), EditorError> {
        let template = repository
            .load(form_id)
            .and_then(|stored| stored.ok_or(RepositoryError::NotFound(form_id)))
            .map_err(|err| self.reject(err))?;
        self.switch_template(template);
        info!(form_id, "draft opened");
        Ok(())
    }

    /// Starts a new, empty form and stores it as a draft. `known` lists the
    /// forms that already exist locally or on the server.
    pub fn create_form(
        &mut self,
        name: &str,
        form_id: i64,
        known: &[FormSummary],
        repository: &dyn TemplateRepository,
    ) -> Result<(), EditorError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(self.reject(ValidationError::EmptyFormName));
        }
        let stored = repository.load(form_id).map_err(|err| self.reject(err))?;
        if stored.is_some() || catalog::is_taken(known, form_id) {
            return Err(self.reject(ValidationError::DuplicateFormId(form_id)));
        }

        let template = Template::new_draft(name, form_id, self.config.creator.clone());
        repository.save(&template).map_err(|err| self.reject(err))?;
        self.switch_template(template);
        info!(form_id, name, "form created");
        self.success("New form created.");
        Ok(())
    }

    fn switch_template(&mut self, template: Template) {
        self.template = template;
        self.revision += 1;
        self.clear_selection();
        self.drag.cancel();
    }

    /// Replaces the layout with the server's copy of the form. Internal keys
    /// are regenerated, so the selection is carried over by position.
    fn ingest(&mut self, form: &Form) {
        let path = self.selection_path();
        let converted = schema::convert_form(form, self.ids.as_ref(), &self.template.creator);
        let now = Utc::now();

        self.template.id = converted.id;
        if !converted.form_name.is_empty() {
            self.template.form_name = converted.form_name;
        }
        self.template.publish_status = PublishStatus::Saved;
        self.template.updated_at = Some(now);
        self.template.last_published_at = Some(now);
        self.template.publish_history.push(PublishRecord {
            last_published_at: now,
            layout: converted.layout.clone(),
        });
        self.template.layout = converted.layout;
        self.revision += 1;

        info!(form_id = self.template.form_id, id = ?self.template.id, "server form ingested");
        self.restore_selection(path);
    }

    fn replace_layout(&mut self, layout: Layout) {
        self.template.layout = layout;
        self.revision += 1;
        self.sync_selection();
        if let Some(node) = self.selection.resolve(&self.template.layout) {
            self.draft = Some(PropertyDraft::load(node));
        }
    }

    fn selection_path(&self) -> Option<(usize, Option<usize>)> {
        let layout = &self.template.layout;
        match self.selection.selected()? {
            NodeKey::Container(id) => Some((layout.container_position(id)?, None)),
            NodeKey::Control { container_id, internal_id } => {
                let position = layout.container_position(container_id)?;
                let index = layout.entries()[position]
                    .children
                    .iter()
                    .position(|control| control.internal_id == *internal_id)?;
                Some((position, Some(index)))
            }
        }
    }

    fn restore_selection(&mut self, path: Option<(usize, Option<usize>)>) {
        let key = path.and_then(|(position, index)| {
            let entry = self.template.layout.entries().get(position)?;
            match index {
                None => Some(NodeKey::of_container(&entry.container)),
                Some(index) => entry.children.get(index).map(NodeKey::of_control),
            }
        });
        match key {
            Some(key) => {
                if self.select(key).is_err() {
                    self.clear_selection();
                }
            }
            None => self.clear_selection(),
        }
    }

    fn validate(&self) -> Result<(), EditorError> {
        self.validate_layout(&self.template.layout)
    }

    fn validate_layout(&self, layout: &Layout) -> Result<(), EditorError> {
        let problem = if layout.is_empty() {
            Some(ValidationError::EmptyForm)
        } else {
            layout
                .iter()
                .find(|entry| entry.children.is_empty())
                .map(|entry| ValidationError::EmptyContainer { heading: entry.container.heading.clone() })
        };
        match problem {
            Some(err) => Err(self.reject(err)),
            None => Ok(()),
        }
    }

    /// Reports an error to the user and hands it back for propagation.
    fn reject(&self, err: impl Into<EditorError>) -> EditorError {
        let err = err.into();
        warn!(%err, "operation rejected");
        self.danger(&err.to_string());
        err
    }

    /// Stores the current layout as a local draft.
    pub fn save_form(&mut self, repository: &dyn TemplateRepository) -> Result<(), EditorError> {
        self.validate()?;
        schema::convert(&self.template.layout).map_err(|err| self.reject(err))?;

        let mut template = self.template.clone();
        template.publish_status = PublishStatus::Draft;
        template.updated_at = Some(Utc::now());
        repository.save(&template).map_err(|err| self.reject(err))?;

        self.template = template;
        info!(form_id = self.template.form_id, "form saved as draft");
        self.success("Changes in Form Saved.");
        Ok(())
    }

    pub fn save_form_name(&mut self, name: &str, repository: &dyn TemplateRepository) -> Result<(), EditorError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(self.reject(ValidationError::EmptyFormName));
        }

        let mut template = self.template.clone();
        template.form_name = name.to_string();
        repository.save(&template).map_err(|err| self.reject(err))?;

        self.template = template;
        self.success("Form Name Updated.");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form_builder::ids::SequentialIds;
    use crate::form_builder::layout::ControlKind;
    use crate::services::{MemoryBackend, MemoryRepository, NoticeLog};

    fn session() -> (EditorSession, Rc<NoticeLog>) {
        let notices = Rc::new(NoticeLog::new());
        let session = EditorSession::new(
            Template::new_draft("Intake", 3, "Test User"),
            BuilderConfig::default(),
            Rc::new(SequentialIds::new()),
            notices.clone(),
        );
        (session, notices)
    }

    /// `id-1` holding text fields `id-2` and `id-3`.
    fn filled() -> (EditorSession, Rc<NoticeLog>) {
        let (mut session, notices) = session();
        let container = session.add_container(&ContainerTemplate::default());
        for _ in 0..2 {
            session.add_control(&ControlTemplate::for_kind(ControlKind::TextField), &container).unwrap();
        }
        (session, notices)
    }

    #[test]
    fn declined_deletion_keeps_layout() {
        let (mut session, _) = filled();
        let before = session.layout().clone();

        let err = session.delete_container(&NodeRef::Internal("id-1".into()), &|_: &str| false).unwrap_err();
        assert!(matches!(err, EditorError::Declined));
        assert!(session.layout().same_snapshot(&before));

        session.delete_container(&NodeRef::Internal("id-1".into()), &|_: &str| true).unwrap();
        assert!(session.layout().is_empty());
    }

    #[test]
    fn deleting_the_selected_control_clears_selection() {
        let (mut session, _) = filled();
        session.select(NodeKey::Control { container_id: "id-1".into(), internal_id: "id-2".into() }).unwrap();
        assert!(session.draft().is_some());

        session.delete_control(&NodeRef::Internal("id-2".into()), &NodeRef::Internal("id-1".into())).unwrap();
        assert_eq!(session.selection().selected(), None);
        assert_eq!(session.draft(), None);
    }

    #[test]
    fn draft_submit_applies_locally_and_keeps_selection() {
        let (mut session, _) = filled();
        session.select(NodeKey::Container("id-1".into())).unwrap();
        if let Some(PropertyDraft::Container(edit)) = session.draft_mut() {
            edit.heading = "Applicant".into();
        }

        assert_eq!(session.submit_draft(PublishStatus::Draft).unwrap(), None);
        assert_eq!(session.layout().entries()[0].container.heading, "Applicant");
        assert!(session.selection().is_container("id-1"));
    }

    #[test]
    fn saved_container_without_id_is_refused() {
        let (mut session, notices) = filled();
        session.select(NodeKey::Container("id-1".into())).unwrap();
        let before = session.layout().clone();

        let err = session.submit_draft(PublishStatus::Saved).unwrap_err();
        assert!(matches!(err, EditorError::Validation(ValidationError::MissingServerId("container"))));
        assert!(session.layout().same_snapshot(&before));
        assert_eq!(notices.last().unwrap().kind, NoticeKind::Danger);
    }

    #[test]
    fn moving_from_side_selects_the_control() {
        let (mut session, _) = filled();
        let second = session.add_container(&ContainerTemplate::default());
        let moved = session
            .move_control_from_side(&NodeRef::Internal("id-3".into()), &second, Some(0))
            .unwrap();
        assert_eq!(moved.as_deref(), Some("id-3"));
        assert!(session.selection().is_control("id-3"));
    }

    #[test]
    fn palette_drop_inserts_at_position() {
        let (mut session, _) = filled();
        session.begin_drag_palette_control(ControlTemplate::for_kind(ControlKind::Signature));
        let key = session.drop_on(DropZone::Container("id-1".into()), Some(0)).unwrap();

        let children = &session.layout().entries()[0].children;
        assert_eq!(children[0].internal_id, key);
        assert_eq!(children.iter().map(|c| c.sequence).collect::<Vec<_>>(), vec![0, 1, 2]);
    }

    #[test]
    fn rejected_drop_changes_nothing() {
        let (mut session, _) = filled();
        let before = session.layout().clone();
        session.begin_drag_container(ContainerTemplate::default());

        let err = session.drop_on(DropZone::Container("id-1".into()), None).unwrap_err();
        assert!(matches!(err, EditorError::Drop(_)));
        assert!(session.layout().same_snapshot(&before));
        assert!(session.drag().is_dragging());
    }

    #[test]
    fn renaming_stores_the_template() {
        let (mut session, notices) = session();
        let repository = MemoryRepository::new();

        assert!(session.save_form_name("   ", &repository).is_err());
        session.save_form_name("Admissions", &repository).unwrap();
        assert_eq!(repository.load(3).unwrap().unwrap().form_name, "Admissions");
        assert_eq!(notices.last().unwrap().message, "Form Name Updated.");
    }

    #[test]
    fn creating_a_form_refuses_taken_ids_and_blank_names() {
        let (mut session, notices) = filled();
        let repository = MemoryRepository::new();
        repository.save(&Template::new_draft("Local", 5, "Test User")).unwrap();
        let known = vec![FormSummary { form_id: 8, form_name: "Survey".into(), has_draft: false, published: true }];

        let err = session.create_form("Second", 5, &known, &repository).unwrap_err();
        assert!(matches!(err, EditorError::Validation(ValidationError::DuplicateFormId(5))));
        assert!(session.create_form("Third", 8, &known, &repository).is_err());
        assert!(session.create_form("  ", 9, &known, &repository).is_err());
        assert_eq!(notices.last().unwrap().kind, NoticeKind::Danger);
        assert_eq!(session.template().form_id, 3);
        assert!(!session.layout().is_empty());

        session.select(NodeKey::Container("id-1".into())).unwrap();
        session.create_form(" Admissions ", 9, &known, &repository).unwrap();
        assert_eq!(session.template().form_id, 9);
        assert_eq!(session.template().form_name, "Admissions");
        assert!(session.layout().is_empty());
        assert_eq!(session.selection().selected(), None);
        assert_eq!(repository.load(9).unwrap().unwrap().form_name, "Admissions");
        assert_eq!(notices.last().unwrap().message, "New form created.");
    }

    #[test]
    fn opening_a_draft_swaps_the_template() {
        let (mut session, notices) = filled();
        let repository = MemoryRepository::new();
        session.save_form(&repository).unwrap();
        repository.save(&Template::new_draft("Other", 4, "Test User")).unwrap();

        session.open_draft(4, &repository).unwrap();
        assert_eq!(session.template().form_name, "Other");
        assert!(session.layout().is_empty());

        assert!(session.open_draft(12, &repository).is_err());
        assert_eq!(notices.last().unwrap().kind, NoticeKind::Danger);
        assert_eq!(session.template().form_id, 4);

        session.open_draft(3, &repository).unwrap();
        assert_eq!(session.layout().entries()[0].children.len(), 2);
    }

    #[tokio::test]
    async fn saved_field_update_waits_for_the_backend() {
        let (mut session, notices) = filled();
        let mut layout = session.layout().clone();
        layout.entries_mut()[0].children[0].id = Some(ServerId::from("41"));
        session.template.layout = layout;

        session.select(NodeKey::Control { container_id: "id-1".into(), internal_id: "id-2".into() }).unwrap();
        if let Some(PropertyDraft::Control(edit)) = session.draft_mut() {
            edit.label_name = "Email".into();
        }
        let request = session.submit_draft(PublishStatus::Saved).unwrap().unwrap();
        assert_eq!(session.layout().control("id-2").unwrap().label_name, "Text Field");

        let backend = MemoryBackend::new();
        session.run(request, &backend).await.unwrap();
        assert_eq!(session.layout().control("id-2").unwrap().label_name, "Email");
        assert_eq!(backend.field_updates()[0].0, ServerId::from("41"));
        assert_eq!(notices.last().unwrap().message, "Field updated successfully");
    }
}
