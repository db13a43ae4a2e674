//! Conversion between the editor layout and the backend block/field schema.

use super::ids::IdGenerator;
use super::layout::{
    BlockType, Container, Control, ControlKind, Layout, LayoutEntry, OptionItem, ServerId, STEP_CONTAINER,
};
use super::template::{PublishStatus, Template};
use crate::error::SchemaError;
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::{debug, warn};

/// Version tag stamped on every outbound field.
pub const SCHEMA_VERSION: &str = "1.1";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FieldType {
    Text,
    Radio,
    Datetime,
    #[serde(alias = "DROPDOWN")]
    Select,
    Signature,
    Checkbox,
    File,
    Image,
    Information,
    #[default]
    #[serde(other)]
    Unknown,
}

impl FieldType {
    /// Wire type for an editor control, if the backend has one.
    pub fn from_control(kind: ControlKind) -> Option<Self> {
        match kind {
            ControlKind::TextField => Some(FieldType::Text),
            ControlKind::RadioGroup => Some(FieldType::Radio),
            ControlKind::DateField => Some(FieldType::Datetime),
            ControlKind::SelectDropDown => Some(FieldType::Select),
            ControlKind::Signature => Some(FieldType::Signature),
            ControlKind::Checkbox => Some(FieldType::Checkbox),
            ControlKind::FileUpload => Some(FieldType::File),
            ControlKind::ImageUpload => Some(FieldType::Image),
            ControlKind::Information => Some(FieldType::Information),
            ControlKind::Unknown => Some(FieldType::Unknown),
            ControlKind::MultilineTextField
            | ControlKind::TimeField
            | ControlKind::ScanCode
            | ControlKind::Toggle
            | ControlKind::Checklist
            | ControlKind::MultiChoices => None,
        }
    }

    pub fn control_kind(self) -> ControlKind {
        match self {
            FieldType::Text => ControlKind::TextField,
            FieldType::Radio => ControlKind::RadioGroup,
            FieldType::Datetime => ControlKind::DateField,
            FieldType::Select => ControlKind::SelectDropDown,
            FieldType::Signature => ControlKind::Signature,
            FieldType::Checkbox => ControlKind::Checkbox,
            FieldType::File => ControlKind::FileUpload,
            FieldType::Image => ControlKind::ImageUpload,
            FieldType::Information => ControlKind::Information,
            FieldType::Unknown => ControlKind::Unknown,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WireOption {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ServerId>,
    #[serde(default, deserialize_with = "nullable")]
    pub value: String,
    #[serde(default, deserialize_with = "nullable")]
    pub label: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ServerId>,
    #[serde(rename = "type", default, deserialize_with = "nullable")]
    pub field_type: FieldType,
    #[serde(default, deserialize_with = "nullable")]
    pub name: String,
    #[serde(default, deserialize_with = "nullable")]
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub information: String,
    #[serde(default, deserialize_with = "nullable")]
    pub required: bool,
    #[serde(default, deserialize_with = "nullable")]
    pub sequence: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<WireOption>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ServerId>,
    #[serde(default, deserialize_with = "nullable")]
    pub sequence: u32,
    #[serde(default, deserialize_with = "nullable")]
    pub title: String,
    #[serde(rename = "type", default, deserialize_with = "nullable")]
    pub block_type: BlockType,
    #[serde(default, deserialize_with = "nullable")]
    pub skip_able: bool,
    #[serde(default)]
    pub fields: Vec<Field>,
}

/// Outbound result of [`convert`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FormBlocks {
    pub blocks: Vec<Block>,
}

/// The persisted form, as published and as returned by the backend.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Form {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ServerId>,
    #[serde(default)]
    pub form_id: i64,
    #[serde(default, deserialize_with = "nullable")]
    pub form_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pdf: Option<serde_json::Value>,
    #[serde(default)]
    pub blocks: Vec<Block>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creation_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modification_date: Option<String>,
}

fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn wire_type(control: &Control) -> Result<FieldType, SchemaError> {
    FieldType::from_control(control.control_name).ok_or_else(|| SchemaError::UnmappedControl {
        kind: control.control_name.to_string(),
        label: control.label_name.clone(),
    })
}

fn outbound_field(control: &Control, sequence: usize) -> Result<Field, SchemaError> {
    Ok(Field {
        id: None,
        field_type: wire_type(control)?,
        name: control.name.clone(),
        label: control.label_name.clone(),
        placeholder: (!control.placeholder.is_empty()).then(|| control.placeholder.clone()),
        information: control.description.clone(),
        required: control.required,
        sequence: sequence as u32,
        options: control.items.as_ref().map(|items| {
            items
                .iter()
                .map(|item| WireOption { id: None, value: item.value.clone(), label: item.label.clone() })
                .collect()
        }),
        version: Some(SCHEMA_VERSION.to_string()),
    })
}

/// Layout to wire blocks. Block sequences are one-based positions, field
/// sequences zero-based positions; stored sequence attributes are ignored.
pub fn convert(layout: &Layout) -> Result<FormBlocks, SchemaError> {
    let blocks = layout
        .iter()
        .enumerate()
        .map(|(position, entry)| -> Result<Block, SchemaError> {
            let fields = entry
                .children
                .iter()
                .enumerate()
                .map(|(index, control)| outbound_field(control, index))
                .collect::<Result<Vec<_>, _>>()?;

            Ok(Block {
                id: None,
                sequence: position as u32 + 1,
                title: entry.container.heading.clone(),
                block_type: entry.container.block_type,
                skip_able: entry.container.skip_able,
                fields,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    debug!(blocks = blocks.len(), "layout converted");
    Ok(FormBlocks { blocks })
}

/// Payload for a single field update: keeps the server ids and the stored
/// sequence.
pub fn field_update(control: &Control) -> Result<Field, SchemaError> {
    Ok(Field {
        id: control.id.clone(),
        field_type: wire_type(control)?,
        name: control.name.clone(),
        label: control.label_name.clone(),
        placeholder: Some(control.placeholder.clone()),
        information: control.description.clone(),
        required: control.required,
        sequence: control.sequence,
        options: control.items.as_ref().map(|items| {
            items
                .iter()
                .map(|item| WireOption {
                    id: Some(ServerId(item.id.clone())),
                    value: item.value.clone(),
                    label: item.label.clone(),
                })
                .collect()
        }),
        version: None,
    })
}

/// Payload for a single block update.
pub fn block_update(entry: &LayoutEntry) -> Result<Block, SchemaError> {
    Ok(Block {
        id: entry.container.id.clone(),
        sequence: entry.container.sequence,
        title: entry.container.heading.clone(),
        block_type: entry.container.block_type,
        skip_able: entry.container.skip_able,
        fields: entry.children.iter().map(field_update).collect::<Result<_, _>>()?,
    })
}

fn parse_timestamp(raw: Option<&str>) -> Option<DateTime<Utc>> {
    let raw = raw?;
    DateTime::parse_from_rfc3339(raw)
        .map(|stamp| stamp.with_timezone(&Utc))
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f").map(|naive| naive.and_utc()))
        .map_err(|err| warn!(raw, %err, "unparseable timestamp"))
        .ok()
}

fn inbound_control(field: &Field, container_id: &str, sequence: usize, ids: &dyn IdGenerator) -> Control {
    Control {
        id: field.id.clone(),
        internal_id: ids.generate(),
        control_name: field.field_type.control_kind(),
        label_name: field.label.clone(),
        name: field.name.clone(),
        description: field.information.clone(),
        placeholder: field.placeholder.clone().unwrap_or_default(),
        required: field.required,
        items: field.options.as_ref().map(|options| {
            options
                .iter()
                .map(|option| OptionItem {
                    id: option.id.as_ref().map(|id| id.0.clone()).unwrap_or_else(|| ids.generate()),
                    label: option.label.clone(),
                    value: option.value.clone(),
                })
                .collect()
        }),
        container_id: container_id.to_string(),
        sequence: sequence as u32,
    }
}

/// Wire blocks back to a layout. Server ids are kept, every node gets a
/// fresh internal key, and blocks and fields are ordered by their sequence.
pub fn convert_blocks(blocks: &[Block], ids: &dyn IdGenerator) -> Layout {
    let mut ordered: Vec<&Block> = blocks.iter().collect();
    ordered.sort_by_key(|block| block.sequence);

    let entries = ordered
        .into_iter()
        .enumerate()
        .map(|(position, block)| {
            let internal_id = ids.generate();
            let mut fields: Vec<&Field> = block.fields.iter().collect();
            fields.sort_by_key(|field| field.sequence);

            let children = fields
                .into_iter()
                .enumerate()
                .map(|(index, field)| inbound_control(field, &internal_id, index, ids))
                .collect();

            LayoutEntry {
                container: Container {
                    id: block.id.clone(),
                    internal_id,
                    control_name: STEP_CONTAINER.to_string(),
                    heading: block.title.clone(),
                    sub_heading: String::new(),
                    block_type: block.block_type,
                    skip_able: block.skip_able,
                    sequence: position as u32 + 1,
                },
                children,
            }
        })
        .collect();

    Layout::from_entries(entries)
}

/// A server form as an editor template.
pub fn convert_form(form: &Form, ids: &dyn IdGenerator, creator: &str) -> Template {
    let modified = parse_timestamp(form.modification_date.as_deref());
    Template {
        id: form.id.clone(),
        form_id: form.form_id,
        form_name: form.form_name.clone(),
        created_at: parse_timestamp(form.creation_date.as_deref()),
        updated_at: modified,
        last_published_at: modified,
        publish_status: PublishStatus::Saved,
        layout: convert_blocks(&form.blocks, ids),
        publish_history: Vec::new(),
        creator: creator.to_string(),
        file: form.pdf.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form_builder::ids::SequentialIds;
    use serde_json::json;

    fn single_step() -> Layout {
        Layout::from_entries(vec![LayoutEntry {
            container: Container {
                id: None,
                internal_id: "step".into(),
                control_name: STEP_CONTAINER.into(),
                heading: "Step 1".into(),
                sub_heading: String::new(),
                block_type: BlockType::Input,
                skip_able: false,
                sequence: 1,
            },
            children: vec![Control {
                id: None,
                internal_id: "name".into(),
                control_name: ControlKind::TextField,
                label_name: "Name".into(),
                name: "name".into(),
                description: String::new(),
                placeholder: String::new(),
                required: true,
                items: None,
                container_id: "step".into(),
                sequence: 1,
            }],
        }])
    }

    #[test]
    fn converts_single_step() {
        let blocks = convert(&single_step()).unwrap();
        assert_eq!(
            serde_json::to_value(&blocks).unwrap(),
            json!({
                "blocks": [{
                    "sequence": 1,
                    "title": "Step 1",
                    "type": "INPUT",
                    "skipAble": false,
                    "fields": [{
                        "type": "TEXT",
                        "label": "Name",
                        "name": "name",
                        "required": true,
                        "sequence": 0,
                        "information": "",
                        "version": "1.1"
                    }]
                }]
            })
        );
    }

    #[test]
    fn unmapped_controls_are_rejected() {
        let mut layout = single_step();
        layout.entries_mut()[0].children[0].control_name = ControlKind::Toggle;
        assert_eq!(
            convert(&layout),
            Err(SchemaError::UnmappedControl { kind: "toggle".into(), label: "Name".into() })
        );
    }

    #[test]
    fn options_go_out_without_ids() {
        let mut layout = single_step();
        let control = &mut layout.entries_mut()[0].children[0];
        control.control_name = ControlKind::RadioGroup;
        control.items = Some(vec![OptionItem::new("x1", "Yes", "yes")]);

        let blocks = convert(&layout).unwrap();
        let encoded = serde_json::to_value(&blocks.blocks[0].fields[0]).unwrap();
        assert_eq!(encoded["options"], json!([{ "value": "yes", "label": "Yes" }]));
    }

    #[test]
    fn reads_server_forms() {
        let payload = json!({
            "id": 12,
            "formId": 3,
            "formName": "Intake",
            "creationDate": "2024-03-01T09:30:00",
            "modificationDate": "2024-03-02T10:00:00Z",
            "blocks": [
                { "id": 5, "sequence": 2, "title": "Second", "type": "SIGNATURE", "skipAble": true, "fields": [] },
                { "id": 4, "sequence": 1, "title": "First", "type": "INPUT", "skipAble": null, "fields": [
                    { "id": 9, "type": "DROPDOWN", "name": "pick", "label": "Pick", "information": null,
                      "required": true, "sequence": 1, "options": [{ "id": 1, "value": "a", "label": "A" }, { "value": "b", "label": "B" }] },
                    { "id": 8, "type": "BARCODE", "name": "code", "label": "Code", "required": false, "sequence": 0 }
                ]}
            ]
        });
        let form: Form = serde_json::from_value(payload).unwrap();
        let template = convert_form(&form, &SequentialIds::new(), "Test User");

        assert_eq!(template.id, Some(ServerId::from("12")));
        assert_eq!(template.publish_status, PublishStatus::Saved);
        assert!(template.created_at.is_some() && template.updated_at.is_some());

        let layout = &template.layout;
        let first = &layout.entries()[0];
        assert_eq!(first.container.heading, "First");
        assert_eq!(first.container.control_name, STEP_CONTAINER);
        assert!(!first.container.skip_able);
        assert_eq!(layout.entries()[1].container.block_type, BlockType::Signature);

        let kinds: Vec<ControlKind> = first.children.iter().map(|c| c.control_name).collect();
        assert_eq!(kinds, vec![ControlKind::Unknown, ControlKind::SelectDropDown]);

        let pick = &first.children[1];
        assert_eq!(pick.container_id, first.container.internal_id);
        assert_eq!(pick.description, "");
        let items = pick.items.as_ref().unwrap();
        assert_eq!(items[0].id, "1");
        assert!(!items[1].id.is_empty());
    }

    #[test]
    fn tolerates_odd_block_types_and_missing_sequences() {
        let payload = json!({
            "formId": 3,
            "blocks": [
                { "sequence": null, "title": "Null", "type": null, "fields": [
                    { "type": null, "name": "a", "label": "A", "sequence": null }
                ]},
                { "sequence": 2, "title": "Other", "type": "OUTPUT", "fields": [] }
            ]
        });
        let form: Form = serde_json::from_value(payload).unwrap();

        assert_eq!(form.blocks[0].sequence, 0);
        assert_eq!(form.blocks[0].block_type, BlockType::Input);
        assert_eq!(form.blocks[0].fields[0].sequence, 0);
        assert_eq!(form.blocks[0].fields[0].field_type, FieldType::Unknown);
        assert_eq!(form.blocks[1].block_type, BlockType::Unknown);

        let layout = convert_blocks(&form.blocks, &SequentialIds::new());
        assert_eq!(layout.entries()[0].container.heading, "Null");
        assert_eq!(layout.entries()[1].container.block_type, BlockType::Unknown);
    }

    #[test]
    fn unknown_fields_go_back_out_as_unknown() {
        let mut layout = single_step();
        layout.entries_mut()[0].children[0].control_name = ControlKind::Unknown;
        let blocks = convert(&layout).unwrap();
        assert_eq!(serde_json::to_value(blocks.blocks[0].fields[0].field_type).unwrap(), json!("UNKNOWN"));
    }

    #[test]
    fn update_payloads_keep_ids() {
        let mut layout = single_step();
        layout.entries_mut()[0].container.id = Some(ServerId::from("b1"));
        layout.entries_mut()[0].children[0].id = Some(ServerId::from("f1"));

        let block = block_update(&layout.entries()[0]).unwrap();
        assert_eq!(block.id, Some(ServerId::from("b1")));
        assert_eq!(block.fields[0].id, Some(ServerId::from("f1")));
        assert_eq!(block.fields[0].sequence, 1);
        assert_eq!(block.fields[0].version, None);
    }
}
