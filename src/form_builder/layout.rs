use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::rc::Rc;

/// Control name every container carries.
pub const STEP_CONTAINER: &str = "step-container";

/// Identifier assigned by the backend. Accepts numbers or strings on the wire.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ServerId(pub String);

impl<'de> Deserialize<'de> for ServerId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Number(i64),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Text(text) => ServerId(text),
            Raw::Number(number) => ServerId(number.to_string()),
        })
    }
}

impl fmt::Display for ServerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ServerId {
    fn from(value: &str) -> Self {
        ServerId(value.to_string())
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BlockType {
    #[default]
    Input,
    Signature,
    /// Any block type the editor has no special handling for.
    #[serde(other)]
    Unknown,
}

impl BlockType {
    pub const ALL: [BlockType; 2] = [BlockType::Input, BlockType::Signature];

    pub fn as_str(self) -> &'static str {
        match self {
            BlockType::Input => "INPUT",
            BlockType::Signature => "SIGNATURE",
            BlockType::Unknown => "UNKNOWN",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == raw)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ControlKind {
    TextField,
    MultilineTextField,
    Checkbox,
    RadioGroup,
    SelectDropDown,
    DateField,
    TimeField,
    FileUpload,
    ImageUpload,
    ScanCode,
    Signature,
    Toggle,
    Checklist,
    MultiChoices,
    Information,
    Unknown,
}

impl ControlKind {
    /// Everything the palette offers. `Unknown` only comes from the server.
    pub const PALETTE: [ControlKind; 15] = [
        ControlKind::TextField,
        ControlKind::MultilineTextField,
        ControlKind::Checkbox,
        ControlKind::RadioGroup,
        ControlKind::SelectDropDown,
        ControlKind::DateField,
        ControlKind::TimeField,
        ControlKind::FileUpload,
        ControlKind::ImageUpload,
        ControlKind::ScanCode,
        ControlKind::Signature,
        ControlKind::Toggle,
        ControlKind::Checklist,
        ControlKind::MultiChoices,
        ControlKind::Information,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ControlKind::TextField => "text-field",
            ControlKind::MultilineTextField => "multiline-text-field",
            ControlKind::Checkbox => "checkbox",
            ControlKind::RadioGroup => "radio-group",
            ControlKind::SelectDropDown => "select-drop-down",
            ControlKind::DateField => "date-field",
            ControlKind::TimeField => "time-field",
            ControlKind::FileUpload => "file-upload",
            ControlKind::ImageUpload => "image-upload",
            ControlKind::ScanCode => "scan-code",
            ControlKind::Signature => "signature",
            ControlKind::Toggle => "toggle",
            ControlKind::Checklist => "checklist",
            ControlKind::MultiChoices => "multi-choices",
            ControlKind::Information => "information",
            ControlKind::Unknown => "unknown",
        }
    }

    pub fn display_text(self) -> &'static str {
        match self {
            ControlKind::TextField => "Text Field",
            ControlKind::MultilineTextField => "Multiline Text",
            ControlKind::Checkbox => "Checkbox",
            ControlKind::RadioGroup => "Radio Group",
            ControlKind::SelectDropDown => "Select Drop Down",
            ControlKind::DateField => "Date Picker",
            ControlKind::TimeField => "Time Picker",
            ControlKind::FileUpload => "File Upload",
            ControlKind::ImageUpload => "Image Upload",
            ControlKind::ScanCode => "Scan Code",
            ControlKind::Signature => "Signature",
            ControlKind::Toggle => "Toggle",
            ControlKind::Checklist => "Checklist",
            ControlKind::MultiChoices => "Multi Choices",
            ControlKind::Information => "Information",
            ControlKind::Unknown => "Unknown",
        }
    }

    /// Choice controls carry an option list.
    pub fn has_items(self) -> bool {
        matches!(
            self,
            ControlKind::Checkbox
                | ControlKind::RadioGroup
                | ControlKind::SelectDropDown
                | ControlKind::Checklist
                | ControlKind::MultiChoices
        )
    }
}

impl fmt::Display for ControlKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionItem {
    pub id: String,
    pub label: String,
    pub value: String,
}

impl OptionItem {
    pub fn new(id: impl Into<String>, label: impl Into<String>, value: impl Into<String>) -> Self {
        Self { id: id.into(), label: label.into(), value: value.into() }
    }
}

/// One page of the form.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Container {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ServerId>,
    pub internal_id: String,
    pub control_name: String,
    pub heading: String,
    #[serde(default)]
    pub sub_heading: String,
    #[serde(rename = "type", default)]
    pub block_type: BlockType,
    #[serde(default)]
    pub skip_able: bool,
    pub sequence: u32,
}

/// One field inside a container.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Control {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ServerId>,
    pub internal_id: String,
    pub control_name: ControlKind,
    pub label_name: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub placeholder: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<OptionItem>>,
    pub container_id: String,
    pub sequence: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LayoutEntry {
    pub container: Container,
    pub children: Vec<Control>,
}

/// The whole form: containers in display order, each owning its controls.
///
/// Cloning is cheap and yields an independent snapshot; mutations copy
/// the entry list only when a snapshot is still shared.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Layout {
    entries: Rc<Vec<LayoutEntry>>,
}

impl Layout {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries(entries: Vec<LayoutEntry>) -> Self {
        Self { entries: Rc::new(entries) }
    }

    pub fn entries(&self) -> &[LayoutEntry] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, LayoutEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn control_count(&self) -> usize {
        self.entries.iter().map(|entry| entry.children.len()).sum()
    }

    /// True when both values are the very same snapshot.
    pub fn same_snapshot(&self, other: &Layout) -> bool {
        Rc::ptr_eq(&self.entries, &other.entries)
    }

    pub fn container(&self, internal_id: &str) -> Option<&LayoutEntry> {
        self.entries.iter().find(|entry| entry.container.internal_id == internal_id)
    }

    pub fn container_position(&self, internal_id: &str) -> Option<usize> {
        self.entries.iter().position(|entry| entry.container.internal_id == internal_id)
    }

    pub fn control(&self, internal_id: &str) -> Option<&Control> {
        self.entries
            .iter()
            .flat_map(|entry| entry.children.iter())
            .find(|control| control.internal_id == internal_id)
    }

    pub(crate) fn entries_mut(&mut self) -> &mut Vec<LayoutEntry> {
        Rc::make_mut(&mut self.entries)
    }
}

/// How callers address a node: by the backend id, or by the client key for
/// nodes that were never published.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NodeRef {
    Server(ServerId),
    Internal(String),
}

impl NodeRef {
    /// Prefers the server id, like the canvas delete buttons do.
    pub fn of_container(container: &Container) -> Self {
        match &container.id {
            Some(id) => NodeRef::Server(id.clone()),
            None => NodeRef::Internal(container.internal_id.clone()),
        }
    }

    pub fn of_control(control: &Control) -> Self {
        match &control.id {
            Some(id) => NodeRef::Server(id.clone()),
            None => NodeRef::Internal(control.internal_id.clone()),
        }
    }

    pub fn matches_container(&self, container: &Container) -> bool {
        match self {
            NodeRef::Server(id) => container.id.as_ref() == Some(id),
            NodeRef::Internal(key) => &container.internal_id == key,
        }
    }

    pub fn matches_control(&self, control: &Control) -> bool {
        match self {
            NodeRef::Server(id) => control.id.as_ref() == Some(id),
            NodeRef::Internal(key) => &control.internal_id == key,
        }
    }
}

impl fmt::Display for NodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeRef::Server(id) => write!(f, "#{id}"),
            NodeRef::Internal(key) => f.write_str(key),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn control_kind_names_match_serde() {
        for kind in ControlKind::PALETTE.into_iter().chain([ControlKind::Unknown]) {
            let encoded = serde_json::to_value(kind).unwrap();
            assert_eq!(encoded, serde_json::Value::String(kind.as_str().to_string()));
        }
    }

    #[test]
    fn server_id_accepts_numbers() {
        let id: ServerId = serde_json::from_str("42").unwrap();
        assert_eq!(id, ServerId::from("42"));
        let id: ServerId = serde_json::from_str("\"abc\"").unwrap();
        assert_eq!(id.to_string(), "abc");
    }

    #[test]
    fn clones_are_independent_snapshots() {
        let mut layout = Layout::new();
        let snapshot = layout.clone();
        assert!(layout.same_snapshot(&snapshot));

        layout.entries_mut().push(LayoutEntry {
            container: Container {
                id: None,
                internal_id: "c".into(),
                control_name: STEP_CONTAINER.into(),
                heading: "Step".into(),
                sub_heading: String::new(),
                block_type: BlockType::Input,
                skip_able: false,
                sequence: 1,
            },
            children: Vec::new(),
        });

        assert!(!layout.same_snapshot(&snapshot));
        assert!(snapshot.is_empty());
        assert_eq!(layout.len(), 1);
    }
}
