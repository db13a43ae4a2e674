use super::layout::{Container, Control, Layout, LayoutEntry, OptionItem};
use super::mutator::{ContainerEdit, ControlEdit};

/// Addresses the node open in the property panel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NodeKey {
    Container(String),
    Control { container_id: String, internal_id: String },
}

impl NodeKey {
    pub fn of_container(container: &Container) -> Self {
        NodeKey::Container(container.internal_id.clone())
    }

    pub fn of_control(control: &Control) -> Self {
        NodeKey::Control {
            container_id: control.container_id.clone(),
            internal_id: control.internal_id.clone(),
        }
    }
}

/// Borrowed view of the selected node.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SelectedNode<'a> {
    Container(&'a Container),
    Control(&'a Control),
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SelectionCursor {
    selected: Option<NodeKey>,
}

impl SelectionCursor {
    pub fn selected(&self) -> Option<&NodeKey> {
        self.selected.as_ref()
    }

    pub fn select(&mut self, key: NodeKey) {
        self.selected = Some(key);
    }

    pub fn clear(&mut self) {
        self.selected = None;
    }

    pub fn is_container(&self, internal_id: &str) -> bool {
        matches!(&self.selected, Some(NodeKey::Container(id)) if id == internal_id)
    }

    pub fn is_control(&self, internal_id: &str) -> bool {
        matches!(&self.selected, Some(NodeKey::Control { internal_id: id, .. }) if id == internal_id)
    }

    /// Drops the selection if it points into a removed container.
    pub fn forget_container(&mut self, removed: &LayoutEntry) {
        let hit = match &self.selected {
            Some(NodeKey::Container(id)) => *id == removed.container.internal_id,
            Some(NodeKey::Control { container_id, .. }) => *container_id == removed.container.internal_id,
            None => false,
        };
        if hit {
            self.clear();
        }
    }

    pub fn forget_control(&mut self, removed: &Control) {
        if self.is_control(&removed.internal_id) {
            self.clear();
        }
    }

    /// Looks the selection up in `layout`. A selection whose node is gone
    /// resolves to nothing.
    pub fn resolve<'a>(&self, layout: &'a Layout) -> Option<SelectedNode<'a>> {
        match self.selected.as_ref()? {
            NodeKey::Container(id) => layout.container(id).map(|entry| SelectedNode::Container(&entry.container)),
            NodeKey::Control { container_id, internal_id } => layout
                .container(container_id)?
                .children
                .iter()
                .find(|control| control.internal_id == *internal_id)
                .map(SelectedNode::Control),
        }
    }
}

/// Working copy of the selected node. Nothing here reaches the layout
/// until the draft is submitted.
#[derive(Clone, Debug, PartialEq)]
pub enum PropertyDraft {
    Container(ContainerEdit),
    Control(ControlEdit),
}

impl PropertyDraft {
    pub fn load(node: SelectedNode<'_>) -> Self {
        match node {
            SelectedNode::Container(container) => PropertyDraft::Container(ContainerEdit::from_container(container)),
            SelectedNode::Control(control) => PropertyDraft::Control(ControlEdit::from_control(control)),
        }
    }

    pub fn key(&self) -> NodeKey {
        match self {
            PropertyDraft::Container(edit) => NodeKey::Container(edit.internal_id.clone()),
            PropertyDraft::Control(edit) => NodeKey::Control {
                container_id: edit.container_id.clone(),
                internal_id: edit.internal_id.clone(),
            },
        }
    }

    pub fn items(&self) -> Option<&[OptionItem]> {
        match self {
            PropertyDraft::Control(edit) => edit.items.as_deref(),
            PropertyDraft::Container(_) => None,
        }
    }

    fn items_mut(&mut self) -> Option<&mut Vec<OptionItem>> {
        match self {
            PropertyDraft::Control(edit) => edit.items.as_mut(),
            PropertyDraft::Container(_) => None,
        }
    }

    /// Appends an option. Only controls that already carry a list accept one.
    pub fn add_item(&mut self, item: OptionItem) -> bool {
        match self.items_mut() {
            Some(items) => {
                items.push(item);
                true
            }
            None => false,
        }
    }

    pub fn edit_item(&mut self, id: &str, label: &str, value: &str) -> bool {
        let Some(item) = self.items_mut().and_then(|items| items.iter_mut().find(|item| item.id == id)) else {
            return false;
        };
        item.label = label.to_string();
        item.value = value.to_string();
        true
    }

    pub fn delete_item(&mut self, id: &str) -> bool {
        let Some(items) = self.items_mut() else {
            return false;
        };
        let before = items.len();
        items.retain(|item| item.id != id);
        items.len() != before
    }
}
