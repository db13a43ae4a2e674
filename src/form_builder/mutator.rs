//! Every structural change to a [`Layout`] goes through here.
//!
//! Lookups happen before the entry list is touched, so a failed operation
//! leaves the caller's snapshot untouched (and identical by pointer).

use super::ids::IdGenerator;
use super::layout::{
    BlockType, Container, Control, Layout, LayoutEntry, NodeRef, OptionItem, STEP_CONTAINER,
};
use super::palette::{signature_fields, ContainerTemplate, ControlTemplate};
use crate::error::LayoutError;
use tracing::debug;

/// Editable container fields, as submitted by the property panel.
#[derive(Clone, Debug, PartialEq)]
pub struct ContainerEdit {
    pub internal_id: String,
    pub heading: String,
    pub sub_heading: String,
    pub skip_able: bool,
    pub block_type: BlockType,
    pub sequence: u32,
}

impl ContainerEdit {
    pub fn from_container(container: &Container) -> Self {
        Self {
            internal_id: container.internal_id.clone(),
            heading: container.heading.clone(),
            sub_heading: container.sub_heading.clone(),
            skip_able: container.skip_able,
            block_type: container.block_type,
            sequence: container.sequence,
        }
    }
}

/// Editable control fields, as submitted by the property panel.
#[derive(Clone, Debug, PartialEq)]
pub struct ControlEdit {
    pub internal_id: String,
    pub container_id: String,
    pub label_name: String,
    pub name: String,
    pub description: String,
    pub placeholder: String,
    pub required: bool,
    pub items: Option<Vec<OptionItem>>,
}

impl ControlEdit {
    pub fn from_control(control: &Control) -> Self {
        Self {
            internal_id: control.internal_id.clone(),
            container_id: control.container_id.clone(),
            label_name: control.label_name.clone(),
            name: control.name.clone(),
            description: control.description.clone(),
            placeholder: control.placeholder.clone(),
            required: control.required,
            items: control.items.clone(),
        }
    }
}

fn renumber_controls(children: &mut [Control]) {
    for (index, control) in children.iter_mut().enumerate() {
        control.sequence = index as u32;
    }
}

fn renumber_containers(entries: &mut [LayoutEntry]) {
    for (index, entry) in entries.iter_mut().enumerate() {
        entry.container.sequence = index as u32 + 1;
    }
}

impl Layout {
    /// Appends an empty container and returns its key.
    pub fn add_container(&mut self, template: &ContainerTemplate, ids: &dyn IdGenerator) -> String {
        let internal_id = ids.generate();
        let sequence = self.len() as u32 + 1;

        self.entries_mut().push(LayoutEntry {
            container: Container {
                id: None,
                internal_id: internal_id.clone(),
                control_name: STEP_CONTAINER.to_string(),
                heading: template.heading.clone(),
                sub_heading: template.sub_heading.clone(),
                block_type: template.block_type,
                skip_able: template.skip_able,
                sequence,
            },
            children: Vec::new(),
        });

        debug!(container = %internal_id, "container added");
        internal_id
    }

    /// Appends a control built from `template` to the container keyed by
    /// `container_id` and returns the new control's key.
    pub fn add_control(
        &mut self,
        template: &ControlTemplate,
        container_id: &str,
        ids: &dyn IdGenerator,
    ) -> Result<String, LayoutError> {
        let position = self
            .container_position(container_id)
            .ok_or_else(|| LayoutError::ContainerNotFound(container_id.to_string()))?;

        let internal_id = ids.generate();
        let sequence = self.entries()[position].children.len() as u32;
        self.entries_mut()[position].children.push(Control {
            id: None,
            internal_id: internal_id.clone(),
            control_name: template.kind,
            label_name: template.label_name.clone(),
            name: template.name.clone(),
            description: template.description.clone(),
            placeholder: template.placeholder.clone(),
            required: template.required,
            items: template.items.clone(),
            container_id: container_id.to_string(),
            sequence,
        });

        debug!(control = %internal_id, container = container_id, kind = %template.kind, "control added");
        Ok(internal_id)
    }

    /// Removes a container together with all of its controls.
    pub fn remove_container(&mut self, target: &NodeRef) -> Result<LayoutEntry, LayoutError> {
        let position = self
            .iter()
            .position(|entry| target.matches_container(&entry.container))
            .ok_or_else(|| LayoutError::ContainerNotFound(target.to_string()))?;

        let entries = self.entries_mut();
        let removed = entries.remove(position);
        renumber_containers(entries);

        debug!(container = %removed.container.internal_id, controls = removed.children.len(), "container removed");
        Ok(removed)
    }

    pub fn remove_control(&mut self, control: &NodeRef, container: &NodeRef) -> Result<Control, LayoutError> {
        let position = self
            .iter()
            .position(|entry| container.matches_container(&entry.container))
            .ok_or_else(|| LayoutError::ContainerNotFound(container.to_string()))?;
        let index = self.entries()[position]
            .children
            .iter()
            .position(|child| control.matches_control(child))
            .ok_or_else(|| LayoutError::ControlNotFound(control.to_string()))?;

        let children = &mut self.entries_mut()[position].children;
        let removed = children.remove(index);
        renumber_controls(children);

        debug!(control = %removed.internal_id, "control removed");
        Ok(removed)
    }

    /// Overwrites the editable container fields. A changed sequence moves the
    /// container to that (one-based) position.
    pub fn apply_container_edit(&mut self, edit: &ContainerEdit) -> Result<(), LayoutError> {
        let position = self
            .container_position(&edit.internal_id)
            .ok_or_else(|| LayoutError::ContainerNotFound(edit.internal_id.clone()))?;
        let target = (edit.sequence.max(1) as usize - 1).min(self.len() - 1);

        let entries = self.entries_mut();
        {
            let container = &mut entries[position].container;
            container.heading = edit.heading.clone();
            container.sub_heading = edit.sub_heading.clone();
            container.skip_able = edit.skip_able;
            container.block_type = edit.block_type;
        }
        if target != position {
            let entry = entries.remove(position);
            entries.insert(target, entry);
        }
        renumber_containers(entries);
        Ok(())
    }

    /// Overwrites the editable control fields of the control keyed by
    /// `edit.internal_id` inside the container keyed by `edit.container_id`.
    pub fn apply_control_edit(&mut self, edit: &ControlEdit) -> Result<(), LayoutError> {
        let position = self
            .container_position(&edit.container_id)
            .ok_or_else(|| LayoutError::ContainerNotFound(edit.container_id.clone()))?;
        let index = self.entries()[position]
            .children
            .iter()
            .position(|child| child.internal_id == edit.internal_id)
            .ok_or_else(|| LayoutError::ControlNotFound(edit.internal_id.clone()))?;

        let control = &mut self.entries_mut()[position].children[index];
        control.label_name = edit.label_name.clone();
        control.name = edit.name.clone();
        control.description = edit.description.clone();
        control.placeholder = edit.placeholder.clone();
        control.required = edit.required;
        control.items = edit.items.clone();
        Ok(())
    }

    /// Moves a control within its container, shifting the ones in between.
    pub fn reorder_control(&mut self, container_id: &str, from: usize, to: usize) -> Result<(), LayoutError> {
        let position = self
            .container_position(container_id)
            .ok_or_else(|| LayoutError::ContainerNotFound(container_id.to_string()))?;
        let len = self.entries()[position].children.len();
        for index in [from, to] {
            if index >= len {
                return Err(LayoutError::PositionOutOfRange { index, len });
            }
        }
        if from == to {
            return Ok(());
        }

        let children = &mut self.entries_mut()[position].children;
        let control = children.remove(from);
        children.insert(to, control);
        renumber_controls(children);
        Ok(())
    }

    /// Relocates a control picked from the side panel. Without a position a
    /// move to another container keeps the control's old index, and a move
    /// within the same container does nothing (`Ok(None)`).
    pub fn move_control_from_side(
        &mut self,
        control: &NodeRef,
        to_container: &str,
        position: Option<usize>,
    ) -> Result<Option<String>, LayoutError> {
        let (source, index) = self.locate_control(control)?;
        let target = self
            .container_position(to_container)
            .ok_or_else(|| LayoutError::ContainerNotFound(to_container.to_string()))?;

        let at = match position {
            Some(at) => at,
            None if source == target => return Ok(None),
            None => index,
        };
        Ok(Some(self.relocate(source, index, target, at)))
    }

    /// Drops an existing control into `to_container`, appending it unless an
    /// explicit position is given.
    pub fn transfer_control(
        &mut self,
        control_id: &str,
        to_container: &str,
        position: Option<usize>,
    ) -> Result<(), LayoutError> {
        let (source, index) = self.locate_control(&NodeRef::Internal(control_id.to_string()))?;
        let target = self
            .container_position(to_container)
            .ok_or_else(|| LayoutError::ContainerNotFound(to_container.to_string()))?;

        let at = position.unwrap_or(usize::MAX);
        self.relocate(source, index, target, at);
        Ok(())
    }

    pub fn clear_container_fields(&mut self, container_id: &str) -> Result<(), LayoutError> {
        let position = self
            .container_position(container_id)
            .ok_or_else(|| LayoutError::ContainerNotFound(container_id.to_string()))?;
        self.entries_mut()[position].children.clear();
        Ok(())
    }

    /// Replaces the container's controls with the e-signature block.
    pub fn populate_signature_fields(&mut self, container_id: &str, ids: &dyn IdGenerator) -> Result<(), LayoutError> {
        let position = self
            .container_position(container_id)
            .ok_or_else(|| LayoutError::ContainerNotFound(container_id.to_string()))?;
        self.entries_mut()[position].children = signature_fields(container_id, ids);
        debug!(container = container_id, "signature fields populated");
        Ok(())
    }

    fn locate_control(&self, control: &NodeRef) -> Result<(usize, usize), LayoutError> {
        self.iter()
            .enumerate()
            .find_map(|(position, entry)| {
                entry
                    .children
                    .iter()
                    .position(|child| control.matches_control(child))
                    .map(|index| (position, index))
            })
            .ok_or_else(|| LayoutError::ControlNotFound(control.to_string()))
    }

    /// Removes `source[index]` and inserts it into `target` at `at`, clamped
    /// to the end. Returns the moved control's key.
    fn relocate(&mut self, source: usize, index: usize, target: usize, at: usize) -> String {
        let entries = self.entries_mut();
        let mut control = entries[source].children.remove(index);
        let target_entry = &mut entries[target];
        control.container_id = target_entry.container.internal_id.clone();
        let internal_id = control.internal_id.clone();

        let at = at.min(target_entry.children.len());
        target_entry.children.insert(at, control);

        renumber_controls(&mut entries[target].children);
        if source != target {
            renumber_controls(&mut entries[source].children);
        }

        debug!(control = %internal_id, from = source, to = target, at, "control relocated");
        internal_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form_builder::ids::SequentialIds;
    use crate::form_builder::layout::{ControlKind, ServerId};

    fn text_field() -> ControlTemplate {
        ControlTemplate::for_kind(ControlKind::TextField)
    }

    /// Two containers: `id-1` with controls `id-2`, `id-3`, `id-4`; `id-5` empty.
    fn fixture(ids: &SequentialIds) -> Layout {
        let mut layout = Layout::new();
        let first = layout.add_container(&ContainerTemplate::default(), ids);
        for _ in 0..3 {
            layout.add_control(&text_field(), &first, ids).unwrap();
        }
        layout.add_container(&ContainerTemplate::default(), ids);
        layout
    }

    fn keys(layout: &Layout, container: &str) -> Vec<String> {
        layout.container(container).unwrap().children.iter().map(|c| c.internal_id.clone()).collect()
    }

    fn sequences(layout: &Layout, container: &str) -> Vec<u32> {
        layout.container(container).unwrap().children.iter().map(|c| c.sequence).collect()
    }

    #[test]
    fn add_control_to_missing_container_is_reported() {
        let ids = SequentialIds::new();
        let mut layout = fixture(&ids);
        let before = layout.clone();

        let err = layout.add_control(&text_field(), "nope", &ids).unwrap_err();
        assert_eq!(err, LayoutError::ContainerNotFound("nope".into()));
        assert!(layout.same_snapshot(&before));
    }

    #[test]
    fn added_controls_own_their_items() {
        let ids = SequentialIds::new();
        let mut layout = fixture(&ids);
        let mut template = ControlTemplate::for_kind(ControlKind::RadioGroup);
        let key = layout.add_control(&template, "id-5", &ids).unwrap();

        template.items.as_mut().unwrap()[0].label = "changed".into();
        let stored = layout.control(&key).unwrap();
        assert_eq!(stored.items.as_ref().unwrap()[0].label, "Option 1");
        assert_eq!(stored.container_id, "id-5");
    }

    #[test]
    fn reorder_moves_and_renumbers() {
        let ids = SequentialIds::new();
        let mut layout = fixture(&ids);
        layout.reorder_control("id-1", 0, 2).unwrap();
        assert_eq!(keys(&layout, "id-1"), vec!["id-3", "id-4", "id-2"]);
        assert_eq!(sequences(&layout, "id-1"), vec![0, 1, 2]);

        let err = layout.reorder_control("id-1", 0, 3).unwrap_err();
        assert_eq!(err, LayoutError::PositionOutOfRange { index: 3, len: 3 });
    }

    #[test]
    fn move_from_side_without_position() {
        let ids = SequentialIds::new();
        let mut layout = fixture(&ids);
        let before = layout.clone();

        let moved = layout.move_control_from_side(&NodeRef::Internal("id-3".into()), "id-1", None).unwrap();
        assert_eq!(moved, None);
        assert!(layout.same_snapshot(&before));

        // Keeps the original index, clamped to the empty target.
        let moved = layout.move_control_from_side(&NodeRef::Internal("id-3".into()), "id-5", None).unwrap();
        assert_eq!(moved.as_deref(), Some("id-3"));
        assert_eq!(keys(&layout, "id-5"), vec!["id-3"]);
        assert_eq!(keys(&layout, "id-1"), vec!["id-2", "id-4"]);
        assert_eq!(sequences(&layout, "id-1"), vec![0, 1]);
    }

    #[test]
    fn move_from_side_by_server_id() {
        let ids = SequentialIds::new();
        let mut layout = fixture(&ids);
        layout.entries_mut()[0].children[1].id = Some(ServerId::from("77"));

        layout.move_control_from_side(&NodeRef::Server("77".into()), "id-1", Some(0)).unwrap();
        assert_eq!(keys(&layout, "id-1"), vec!["id-3", "id-2", "id-4"]);
    }

    #[test]
    fn transfer_appends_by_default() {
        let ids = SequentialIds::new();
        let mut layout = fixture(&ids);
        layout.transfer_control("id-2", "id-5", None).unwrap();
        layout.transfer_control("id-4", "id-5", None).unwrap();
        assert_eq!(keys(&layout, "id-5"), vec!["id-2", "id-4"]);
        assert_eq!(layout.control("id-4").unwrap().container_id, "id-5");
        assert_eq!(layout.control_count(), 3);
    }

    #[test]
    fn container_sequence_edit_repositions() {
        let ids = SequentialIds::new();
        let mut layout = fixture(&ids);
        let mut edit = ContainerEdit::from_container(&layout.entries()[1].container);
        edit.heading = "Second".into();
        edit.sequence = 1;
        layout.apply_container_edit(&edit).unwrap();

        let order: Vec<(&str, u32)> = layout
            .iter()
            .map(|e| (e.container.internal_id.as_str(), e.container.sequence))
            .collect();
        assert_eq!(order, vec![("id-5", 1), ("id-1", 2)]);
        assert_eq!(layout.entries()[0].container.heading, "Second");
    }

    #[test]
    fn control_edit_targets_the_named_container() {
        let ids = SequentialIds::new();
        let mut layout = fixture(&ids);
        let mut edit = ControlEdit::from_control(layout.control("id-3").unwrap());
        edit.label_name = "Email".into();
        edit.required = true;
        layout.apply_control_edit(&edit).unwrap();
        assert_eq!(layout.control("id-3").unwrap().label_name, "Email");

        edit.container_id = "id-5".into();
        assert_eq!(layout.apply_control_edit(&edit), Err(LayoutError::ControlNotFound("id-3".into())));
    }

    #[test]
    fn removing_a_container_renumbers_the_rest() {
        let ids = SequentialIds::new();
        let mut layout = fixture(&ids);
        let removed = layout.remove_container(&NodeRef::Internal("id-1".into())).unwrap();
        assert_eq!(removed.children.len(), 3);
        assert_eq!(layout.len(), 1);
        assert_eq!(layout.entries()[0].container.sequence, 1);
        assert!(layout.control("id-2").is_none());
    }

    #[test]
    fn clear_then_populate() {
        let ids = SequentialIds::new();
        let mut layout = fixture(&ids);
        layout.clear_container_fields("id-1").unwrap();
        assert!(layout.container("id-1").unwrap().children.is_empty());

        layout.populate_signature_fields("id-1", &ids).unwrap();
        assert_eq!(sequences(&layout, "id-1"), vec![1, 2, 3, 4, 5, 6]);
    }
}
