use super::ids::IdGenerator;
use super::layout::{BlockType, Control, ControlKind, OptionItem};

/// A container as offered in the toolbox, before it gets keys.
#[derive(Clone, Debug, PartialEq)]
pub struct ContainerTemplate {
    pub display_text: &'static str,
    pub heading: String,
    pub sub_heading: String,
    pub block_type: BlockType,
    pub skip_able: bool,
}

impl Default for ContainerTemplate {
    fn default() -> Self {
        Self {
            display_text: "Step",
            heading: "Container Heading".to_string(),
            sub_heading: "Container subheading".to_string(),
            block_type: BlockType::Input,
            skip_able: false,
        }
    }
}

/// A control as offered in the toolbox.
#[derive(Clone, Debug, PartialEq)]
pub struct ControlTemplate {
    pub kind: ControlKind,
    pub label_name: String,
    pub name: String,
    pub description: String,
    pub placeholder: String,
    pub required: bool,
    pub items: Option<Vec<OptionItem>>,
}

impl ControlTemplate {
    pub fn for_kind(kind: ControlKind) -> Self {
        let items = match kind {
            ControlKind::Checkbox => Some(vec![OptionItem::new("1", "I agree", "agreed")]),
            kind if kind.has_items() => Some(vec![
                OptionItem::new("1", "Option 1", "option-1"),
                OptionItem::new("2", "Option 2", "option-2"),
            ]),
            _ => None,
        };

        Self {
            kind,
            label_name: kind.display_text().to_string(),
            name: kind.as_str().replace('-', "_"),
            description: String::new(),
            placeholder: String::new(),
            required: false,
            items,
        }
    }

    pub fn display_text(&self) -> &'static str {
        self.kind.display_text()
    }
}

pub fn container_palette() -> Vec<ContainerTemplate> {
    vec![
        ContainerTemplate::default(),
        ContainerTemplate {
            display_text: "Signature Step",
            heading: "Signature".to_string(),
            sub_heading: "Please review and sign".to_string(),
            block_type: BlockType::Signature,
            skip_able: false,
        },
    ]
}

pub fn control_palette() -> Vec<ControlTemplate> {
    ControlKind::PALETTE.into_iter().map(ControlTemplate::for_kind).collect()
}

const CONSENT_TEXT: &str = "By checking this box, I agree that all electronic signatures are the legal \
equivalent of my manual/handwritten signature and I consent to be legally bound to this agreement";

/// The standard e-signature block, numbered 1..6.
pub(crate) fn signature_fields(container_id: &str, ids: &dyn IdGenerator) -> Vec<Control> {
    let field = |sequence: u32,
                 kind: ControlKind,
                 label: &str,
                 name: &str,
                 description: &str,
                 placeholder: &str,
                 items: Option<Vec<OptionItem>>| Control {
        id: None,
        internal_id: ids.generate(),
        control_name: kind,
        label_name: label.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        placeholder: placeholder.to_string(),
        required: true,
        items,
        container_id: container_id.to_string(),
        sequence,
    };

    vec![
        field(
            1,
            ControlKind::TextField,
            "Full Name",
            "full_name",
            "Enter your full legal name",
            "Enter your full name",
            None,
        ),
        field(
            2,
            ControlKind::SelectDropDown,
            "Relationship",
            "relationship",
            "Select your relationship",
            "Select relationship",
            Some(vec![
                OptionItem::new("1", "Father", "father"),
                OptionItem::new("2", "Mother", "mother"),
                OptionItem::new("3", "Sibling", "sibling"),
                OptionItem::new("4", "Self", "self"),
                OptionItem::new("5", "Other", "other"),
            ]),
        ),
        field(
            3,
            ControlKind::DateField,
            "Date of Birth",
            "date_of_birth",
            "Select your date of birth",
            "Select date of birth",
            None,
        ),
        field(
            4,
            ControlKind::Checkbox,
            "E-signature Authorization",
            "e_signature_authorization",
            "",
            "",
            Some(vec![OptionItem::new("1", CONSENT_TEXT, "agreed")]),
        ),
        field(5, ControlKind::Signature, "Signature", "signature", "Please sign here", "Sign here", None),
        field(
            6,
            ControlKind::DateField,
            "Date of Signature",
            "date_of_signature",
            "Date when signature was provided",
            "Select signature date",
            None,
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form_builder::ids::SequentialIds;

    #[test]
    fn choice_templates_carry_items() {
        for template in control_palette() {
            assert_eq!(template.items.is_some(), template.kind.has_items(), "{}", template.kind);
        }
    }

    #[test]
    fn signature_block_is_numbered_from_one() {
        let fields = signature_fields("box", &SequentialIds::new());
        let sequences: Vec<u32> = fields.iter().map(|f| f.sequence).collect();
        assert_eq!(sequences, vec![1, 2, 3, 4, 5, 6]);
        assert!(fields.iter().all(|f| f.container_id == "box" && f.required));
        assert_eq!(fields[4].control_name, ControlKind::Signature);
    }
}
