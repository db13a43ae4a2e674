pub mod catalog;
pub mod drag;
pub mod ids;
pub mod layout;
pub mod mutator;
pub mod palette;
pub mod preview;
pub mod schema;
pub mod selection;
pub mod session;
pub mod template;

pub use catalog::{catalog, FormSummary};
pub use drag::{DragEngine, DragItem, DropAction, DropZone, SlotRect};
pub use ids::{IdGenerator, SequentialIds, UuidGenerator};
pub use layout::{BlockType, Container, Control, ControlKind, Layout, LayoutEntry, NodeRef, OptionItem, ServerId};
pub use mutator::{ContainerEdit, ControlEdit};
pub use palette::{container_palette, control_palette, ContainerTemplate, ControlTemplate};
pub use preview::PreviewStepper;
pub use schema::{convert, convert_form, FieldType, Form, FormBlocks};
pub use selection::{NodeKey, PropertyDraft, SelectedNode, SelectionCursor};
pub use session::{Confirm, EditorSession, PendingRequest};
pub use template::{PublishStatus, Template};
