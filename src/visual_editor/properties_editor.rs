use super::component::{dispatch, report};
use crate::form_builder::ids::{IdGenerator, UuidGenerator};
use crate::form_builder::layout::{BlockType, ControlKind, NodeRef, OptionItem};
use crate::form_builder::mutator::{ContainerEdit, ControlEdit};
use crate::form_builder::selection::PropertyDraft;
use crate::form_builder::session::EditorSession;
use crate::form_builder::template::PublishStatus;
use crate::services::FormBackend;
use dioxus::prelude::*;
use std::rc::Rc;
use tracing::warn;

const HEADING_STYLE: &str = "color: slate; text-align: center; margin: 24px 0 12px 0; font-size: 18px;";
const ROW_STYLE: &str = "display: flex; flex-direction: column; gap: 4px; margin-bottom: 12px;";

// Edits go into the session's working copy; the layout only changes on submit.
fn edit_container(mut editor: Signal<EditorSession>, change: impl FnOnce(&mut ContainerEdit)) {
    if let Some(PropertyDraft::Container(edit)) = editor.write().draft_mut() {
        change(edit);
    }
}

fn edit_control(mut editor: Signal<EditorSession>, change: impl FnOnce(&mut ControlEdit)) {
    if let Some(PropertyDraft::Control(edit)) = editor.write().draft_mut() {
        change(edit);
    }
}

fn submit(mut editor: Signal<EditorSession>, backend: Rc<dyn FormBackend>, status: PublishStatus) {
    let submitted = editor.write().submit_draft(status);
    match submitted {
        Ok(Some(request)) => dispatch(editor, backend, request),
        Ok(None) => {}
        Err(err) => warn!(%err, "property update rejected"),
    }
}

#[component]
pub fn PropertiesPanel() -> Element {
    let editor = use_context::<Signal<EditorSession>>();
    let draft = editor.read().draft().cloned();

    rsx! {
        div {
            class: "properties-panel",
            style: "display: flex; flex-direction: column; padding-inline: 12px;",
            h1 { style: HEADING_STYLE, "Properties" }

            match draft {
                None => rsx! {
                    div {
                        style: "padding: 16px; background: #fff3cd; border-radius: 4px;",
                        h4 { style: "margin: 0 0 8px 0;", "Note!" }
                        "You need to select a container/control to edit properties."
                    }
                },
                Some(PropertyDraft::Container(edit)) => rsx! {
                    ContainerProperties { key: "{edit.internal_id}", edit }
                },
                Some(PropertyDraft::Control(edit)) => rsx! {
                    ControlProperties { key: "{edit.internal_id}", edit }
                },
            }
        }
    }
}

#[component]
fn ContainerProperties(edit: ContainerEdit) -> Element {
    let mut editor = use_context::<Signal<EditorSession>>();
    let backend = use_context::<Rc<dyn FormBackend>>();
    let draft_backend = backend.clone();

    rsx! {
        form {
            onsubmit: move |e| {
                e.prevent_default();
                submit(editor, backend.clone(), PublishStatus::Saved);
            },

            div { style: ROW_STYLE,
                label { "Container Heading" }
                input {
                    r#type: "text",
                    value: "{edit.heading}",
                    oninput: move |e| edit_container(editor, |draft| draft.heading = e.value()),
                }
            }
            div { style: ROW_STYLE,
                label { "Container Sub-Heading" }
                input {
                    r#type: "text",
                    value: "{edit.sub_heading}",
                    oninput: move |e| edit_container(editor, |draft| draft.sub_heading = e.value()),
                }
            }
            div { style: ROW_STYLE,
                label { "Sequence" }
                input {
                    r#type: "number",
                    min: "1",
                    value: "{edit.sequence}",
                    oninput: move |e| {
                        if let Ok(sequence) = e.value().trim().parse::<u32>() {
                            edit_container(editor, |draft| draft.sequence = sequence);
                        }
                    },
                }
            }
            div { style: ROW_STYLE,
                label {
                    input {
                        r#type: "checkbox",
                        checked: edit.skip_able,
                        onchange: move |e| edit_container(editor, |draft| draft.skip_able = e.checked()),
                    }
                    " Container is skippable"
                }
            }
            div { style: ROW_STYLE,
                label { "Type" }
                select {
                    onchange: move |e| {
                        if let Some(kind) = BlockType::parse(&e.value()) {
                            edit_container(editor, |draft| draft.block_type = kind);
                        }
                    },
                    for kind in BlockType::ALL {
                        option { value: kind.as_str(), selected: kind == edit.block_type, {kind.as_str()} }
                    }
                }
            }

            div { style: "display: flex; flex-wrap: wrap; gap: 8px;",
                button { r#type: "submit", "Update Data" }
                button {
                    r#type: "button",
                    onclick: move |_| submit(editor, draft_backend.clone(), PublishStatus::Draft),
                    "Apply"
                }
                button { r#type: "button", onclick: move |_| editor.write().cancel_draft(), "Cancel" }
            }
        }
    }
}

#[component]
fn ControlProperties(edit: ControlEdit) -> Element {
    let mut editor = use_context::<Signal<EditorSession>>();
    let backend = use_context::<Rc<dyn FormBackend>>();
    let draft_backend = backend.clone();

    let (kind, containers) = {
        let session = editor.read();
        let layout = session.layout();
        let kind = layout
            .control(&edit.internal_id)
            .map(|control| control.control_name)
            .unwrap_or(ControlKind::Unknown);
        let containers: Vec<(String, String)> = layout
            .iter()
            .map(|entry| (entry.container.internal_id.clone(), entry.container.heading.clone()))
            .collect();
        (kind, containers)
    };
    let shows_placeholder = matches!(
        kind,
        ControlKind::TextField
            | ControlKind::MultilineTextField
            | ControlKind::Checkbox
            | ControlKind::RadioGroup
            | ControlKind::SelectDropDown
            | ControlKind::Signature
    );

    let mut move_target = use_signal(|| edit.container_id.clone());
    let mut move_position = use_signal(String::new);
    let target_now = move_target();
    let moved_key = edit.internal_id.clone();

    rsx! {
        form {
            onsubmit: move |e| {
                e.prevent_default();
                submit(editor, backend.clone(), PublishStatus::Saved);
            },

            div { style: "font-size: 12px; color: #666; margin-bottom: 12px;", {kind.display_text()} }

            div { style: ROW_STYLE,
                label { "Field Label" }
                input {
                    r#type: "text",
                    value: "{edit.label_name}",
                    oninput: move |e| edit_control(editor, |draft| draft.label_name = e.value()),
                }
            }
            div { style: ROW_STYLE,
                label { "Field Name" }
                input {
                    r#type: "text",
                    value: "{edit.name}",
                    oninput: move |e| edit_control(editor, |draft| draft.name = e.value()),
                }
            }
            if shows_placeholder {
                div { style: ROW_STYLE,
                    label { "Field Placeholder" }
                    input {
                        r#type: "text",
                        value: "{edit.placeholder}",
                        oninput: move |e| edit_control(editor, |draft| draft.placeholder = e.value()),
                    }
                }
            }
            div { style: ROW_STYLE,
                label { "Field Description" }
                input {
                    r#type: "text",
                    value: "{edit.description}",
                    oninput: move |e| edit_control(editor, |draft| draft.description = e.value()),
                }
            }
            div { style: ROW_STYLE,
                label {
                    input {
                        r#type: "checkbox",
                        checked: edit.required,
                        onchange: move |e| edit_control(editor, |draft| draft.required = e.checked()),
                    }
                    " Required"
                }
            }

            {edit.items.clone().map(|items| rsx! { ItemsList { items } })}

            div { style: "display: flex; flex-wrap: wrap; gap: 8px; margin-top: 12px;",
                button { r#type: "submit", "Update Data" }
                button {
                    r#type: "button",
                    onclick: move |_| submit(editor, draft_backend.clone(), PublishStatus::Draft),
                    "Apply"
                }
                button { r#type: "button", onclick: move |_| editor.write().cancel_draft(), "Cancel" }
            }

            h4 { style: "margin: 24px 0 8px 0; font-size: 14px;", "Move control" }
            div { style: ROW_STYLE,
                select {
                    onchange: move |e| move_target.set(e.value()),
                    for (id, heading) in containers.iter() {
                        option { key: "{id}", value: "{id}", selected: *id == target_now, "{heading}" }
                    }
                }
                input {
                    r#type: "number",
                    min: "0",
                    placeholder: "Position (optional)",
                    value: "{move_position}",
                    oninput: move |e| move_position.set(e.value()),
                }
                button {
                    r#type: "button",
                    onclick: move |_| {
                        let position = move_position.read().trim().parse::<usize>().ok();
                        let target = move_target();
                        report(editor.write().move_control_from_side(&NodeRef::Internal(moved_key.clone()), &target, position));
                    },
                    "Move"
                }
            }
        }
    }
}

#[component]
fn ItemsList(items: Vec<OptionItem>) -> Element {
    let mut editor = use_context::<Signal<EditorSession>>();
    let mut new_label = use_signal(String::new);
    let mut new_value = use_signal(String::new);

    rsx! {
        h4 { style: "margin: 12px 0 8px 0; font-size: 14px;", "List Items" }
        for item in items.iter() {
            ItemRow { key: "{item.id}", item: item.clone() }
        }
        div { style: "display: flex; gap: 4px; margin-top: 8px;",
            input {
                r#type: "text",
                placeholder: "Label",
                value: "{new_label}",
                oninput: move |e| new_label.set(e.value()),
            }
            input {
                r#type: "text",
                placeholder: "Value",
                value: "{new_value}",
                oninput: move |e| new_value.set(e.value()),
            }
            button {
                r#type: "button",
                onclick: move |_| {
                    let label = new_label();
                    if label.trim().is_empty() {
                        return;
                    }
                    let value = if new_value.read().trim().is_empty() { label.clone() } else { new_value() };
                    let item = OptionItem::new(UuidGenerator.generate(), label, value);
                    if let Some(draft) = editor.write().draft_mut() {
                        draft.add_item(item);
                    }
                    new_label.set(String::new());
                    new_value.set(String::new());
                },
                "Add"
            }
        }
    }
}

#[component]
fn ItemRow(item: OptionItem) -> Element {
    let mut editor = use_context::<Signal<EditorSession>>();
    let label_id = item.id.clone();
    let value_id = item.id.clone();
    let delete_id = item.id.clone();
    let kept_value = item.value.clone();
    let kept_label = item.label.clone();

    rsx! {
        div { style: "display: flex; gap: 4px; margin-bottom: 4px;",
            input {
                r#type: "text",
                value: "{item.label}",
                oninput: move |e| {
                    if let Some(draft) = editor.write().draft_mut() {
                        draft.edit_item(&label_id, &e.value(), &kept_value);
                    }
                },
            }
            input {
                r#type: "text",
                value: "{item.value}",
                oninput: move |e| {
                    if let Some(draft) = editor.write().draft_mut() {
                        draft.edit_item(&value_id, &kept_label, &e.value());
                    }
                },
            }
            button {
                r#type: "button",
                onclick: move |_| {
                    if let Some(draft) = editor.write().draft_mut() {
                        draft.delete_item(&delete_id);
                    }
                },
                "X"
            }
        }
    }
}
