//! Drag gestures over the canvas.
//!
//! The engine never touches the layout itself. Hover events produce
//! [`Reorder`] commands and drops produce [`DropAction`]s which the editor
//! session applies through the layout mutations.

use super::layout::Control;
use super::palette::{ContainerTemplate, ControlTemplate};
use thiserror::Error;
use tracing::debug;

#[derive(Clone, Debug, PartialEq)]
pub enum DragItem {
    PaletteContainer(ContainerTemplate),
    PaletteControl(ControlTemplate),
    Control { internal_id: String, container_id: String },
}

impl DragItem {
    pub fn is_container(&self) -> bool {
        matches!(self, DragItem::PaletteContainer(_))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DropZone {
    /// The page-level area that holds containers.
    Page,
    /// The control list of the container with this key.
    Container(String),
}

/// Vertical extent of a hovered slot, in client coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SlotRect {
    pub top: f64,
    pub bottom: f64,
}

impl SlotRect {
    fn middle(&self) -> f64 {
        (self.bottom - self.top) / 2.0
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct DragGesture {
    pub item: DragItem,
    /// Current index of a dragged control inside its container.
    pub index: Option<usize>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub enum DragState {
    #[default]
    Idle,
    Dragging(DragGesture),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reorder {
    pub container_id: String,
    pub from: usize,
    pub to: usize,
}

#[derive(Clone, Debug, PartialEq)]
pub enum DropAction {
    AddContainer(ContainerTemplate),
    AddControl {
        template: ControlTemplate,
        container_id: String,
        position: Option<usize>,
    },
    MoveControl {
        internal_id: String,
        to_container: String,
        position: Option<usize>,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum DropRejection {
    #[error("nothing is being dragged")]
    NotDragging,
    #[error("this item cannot be dropped here")]
    IncompatibleTarget,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct DragEngine {
    state: DragState,
}

impl DragEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &DragState {
        &self.state
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging(_))
    }

    pub fn dragged(&self) -> Option<&DragItem> {
        match &self.state {
            DragState::Dragging(gesture) => Some(&gesture.item),
            DragState::Idle => None,
        }
    }

    pub fn begin_container(&mut self, template: ContainerTemplate) {
        self.begin(DragItem::PaletteContainer(template), None);
    }

    pub fn begin_palette_control(&mut self, template: ControlTemplate) {
        self.begin(DragItem::PaletteControl(template), None);
    }

    /// Picks up a control that already sits at `index` in its container.
    pub fn begin_control(&mut self, control: &Control, index: usize) {
        let item = DragItem::Control {
            internal_id: control.internal_id.clone(),
            container_id: control.container_id.clone(),
        };
        self.begin(item, Some(index));
    }

    fn begin(&mut self, item: DragItem, index: Option<usize>) {
        debug!(?item, ?index, "drag started");
        self.state = DragState::Dragging(DragGesture { item, index });
    }

    pub fn cancel(&mut self) {
        if self.is_dragging() {
            debug!("drag cancelled");
        }
        self.state = DragState::Idle;
    }

    /// Whether the current item may be dropped on `zone`.
    pub fn accepts(&self, zone: &DropZone) -> bool {
        match (self.dragged(), zone) {
            (Some(item), DropZone::Page) => item.is_container(),
            (Some(item), DropZone::Container(_)) => !item.is_container(),
            (None, _) => false,
        }
    }

    /// Evaluates the pointer over the control slot at `hover_index` of
    /// `container_id`. Returns a reorder once the pointer has crossed the
    /// slot's midpoint in the direction of travel.
    pub fn hover(&mut self, container_id: &str, hover_index: usize, slot: SlotRect, pointer_y: f64) -> Option<Reorder> {
        let DragState::Dragging(gesture) = &mut self.state else {
            return None;
        };
        let DragItem::Control { container_id: source, .. } = &gesture.item else {
            return None;
        };
        if source != container_id {
            return None;
        }
        let drag_index = gesture.index?;
        if drag_index == hover_index {
            return None;
        }

        let middle = slot.middle();
        let offset = pointer_y - slot.top;
        if drag_index < hover_index && offset < middle {
            return None;
        }
        if drag_index > hover_index && offset > middle {
            return None;
        }

        gesture.index = Some(hover_index);
        Some(Reorder {
            container_id: container_id.to_string(),
            from: drag_index,
            to: hover_index,
        })
    }

    /// Ends the gesture on `zone`. A rejected drop keeps the gesture alive so
    /// the item can still land somewhere valid.
    pub fn drop(&mut self, zone: DropZone, position: Option<usize>) -> Result<DropAction, DropRejection> {
        let DragState::Dragging(gesture) = &self.state else {
            return Err(DropRejection::NotDragging);
        };

        let action = match (&gesture.item, zone) {
            (DragItem::PaletteContainer(template), DropZone::Page) => DropAction::AddContainer(template.clone()),
            (DragItem::PaletteControl(template), DropZone::Container(container_id)) => DropAction::AddControl {
                template: template.clone(),
                container_id,
                position,
            },
            (DragItem::Control { internal_id, container_id }, DropZone::Container(to_container)) => {
                // Hover already placed it; settle at the tracked index.
                let position = if *container_id == to_container {
                    position.or(gesture.index)
                } else {
                    position
                };
                DropAction::MoveControl {
                    internal_id: internal_id.clone(),
                    to_container,
                    position,
                }
            }
            _ => return Err(DropRejection::IncompatibleTarget),
        };

        debug!(?action, "drag dropped");
        self.state = DragState::Idle;
        Ok(action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form_builder::layout::ControlKind;

    const SLOT: SlotRect = SlotRect { top: 100.0, bottom: 140.0 };

    fn control(key: &str, container: &str) -> Control {
        Control {
            id: None,
            internal_id: key.into(),
            control_name: ControlKind::TextField,
            label_name: "Name".into(),
            name: "name".into(),
            description: String::new(),
            placeholder: String::new(),
            required: false,
            items: None,
            container_id: container.into(),
            sequence: 0,
        }
    }

    #[test]
    fn hovering_own_slot_is_ignored() {
        let mut engine = DragEngine::new();
        engine.begin_control(&control("a", "box"), 1);
        assert_eq!(engine.hover("box", 1, SLOT, 139.0), None);
    }

    #[test]
    fn downward_drag_waits_for_lower_half() {
        let mut engine = DragEngine::new();
        engine.begin_control(&control("a", "box"), 0);

        assert_eq!(engine.hover("box", 1, SLOT, 110.0), None);
        let reorder = engine.hover("box", 1, SLOT, 125.0).unwrap();
        assert_eq!(reorder, Reorder { container_id: "box".into(), from: 0, to: 1 });

        // The tracked index moved with the item.
        assert_eq!(engine.hover("box", 1, SLOT, 139.0), None);
    }

    #[test]
    fn upward_drag_waits_for_upper_half() {
        let mut engine = DragEngine::new();
        engine.begin_control(&control("a", "box"), 3);

        assert_eq!(engine.hover("box", 2, SLOT, 130.0), None);
        let reorder = engine.hover("box", 2, SLOT, 105.0).unwrap();
        assert_eq!((reorder.from, reorder.to), (3, 2));
    }

    #[test]
    fn hover_in_other_container_does_not_reorder() {
        let mut engine = DragEngine::new();
        engine.begin_control(&control("a", "box"), 0);
        assert_eq!(engine.hover("other", 2, SLOT, 139.0), None);
    }

    #[test]
    fn drops_are_type_gated() {
        let mut engine = DragEngine::new();
        engine.begin_container(ContainerTemplate::default());
        assert!(!engine.accepts(&DropZone::Container("box".into())));
        assert_eq!(
            engine.drop(DropZone::Container("box".into()), None),
            Err(DropRejection::IncompatibleTarget)
        );
        assert!(engine.is_dragging());
        assert!(matches!(engine.drop(DropZone::Page, None), Ok(DropAction::AddContainer(_))));
        assert!(!engine.is_dragging());

        engine.begin_palette_control(ControlTemplate::for_kind(ControlKind::Signature));
        assert!(!engine.accepts(&DropZone::Page));
        assert_eq!(engine.drop(DropZone::Page, None), Err(DropRejection::IncompatibleTarget));
        engine.cancel();
        assert_eq!(engine.drop(DropZone::Page, None), Err(DropRejection::NotDragging));
    }

    #[test]
    fn dropping_back_home_settles_at_tracked_index() {
        let mut engine = DragEngine::new();
        engine.begin_control(&control("a", "box"), 0);
        engine.hover("box", 2, SLOT, 139.0);

        let action = engine.drop(DropZone::Container("box".into()), None).unwrap();
        assert_eq!(
            action,
            DropAction::MoveControl { internal_id: "a".into(), to_container: "box".into(), position: Some(2) }
        );
    }

    #[test]
    fn dropping_elsewhere_appends() {
        let mut engine = DragEngine::new();
        engine.begin_control(&control("a", "box"), 0);
        let action = engine.drop(DropZone::Container("other".into()), None).unwrap();
        assert_eq!(
            action,
            DropAction::MoveControl { internal_id: "a".into(), to_container: "other".into(), position: None }
        );
    }
}
