use crate::form_builder::layout::{Control, ControlKind};
use crate::form_builder::preview::{PreviewStepper, EMPTY_PREVIEW};
use crate::form_builder::schema;
use crate::form_builder::session::EditorSession;
use dioxus::prelude::*;

#[component]
pub fn StepperPreview() -> Element {
    let editor = use_context::<Signal<EditorSession>>();
    let mut stepper = use_signal(PreviewStepper::default);
    let layout = editor.read().layout().clone();
    let step = stepper();

    let Some(entry) = step.current(&layout) else {
        return rsx! {
            div { style: "padding: 32px;", p { "{EMPTY_PREVIEW}" } }
        };
    };
    let next_layout = layout.clone();
    let back_layout = layout.clone();

    rsx! {
        div {
            style: "background: white; max-width: 720px; margin: 24px auto; padding: 32px;
                    border: 1px solid rgba(0,0,0,0.1); border-radius: 9px; box-shadow: 0 9px 90px #efefef;",
            form {
                onsubmit: move |e| e.prevent_default(),

                div { style: "margin-bottom: 24px;",
                    h5 { style: "font-size: 16px; margin: 0;", "{entry.container.heading}" }
                    p { "{entry.container.sub_heading}" }
                }

                for control in entry.children.iter() {
                    div { key: "{control.internal_id}", style: "margin: 16px 0;",
                        h5 { style: "font-size: 14px; font-weight: normal; margin: 0 0 4px 0;",
                            "{control.label_name}"
                            if control.required {
                                span { style: "color: #f44336;", " *" }
                            }
                        }
                        if !control.description.is_empty() {
                            p { style: "font-size: 12px; color: #666;", "{control.description}" }
                        }
                        PreviewField { control: control.clone() }
                    }
                }

                div { style: "display: flex; gap: 8px; flex-wrap: wrap;",
                    if step.has_back() {
                        input { r#type: "button", value: "Back", onclick: move |_| stepper.write().back(&back_layout) }
                    }
                    if step.has_next(&layout) {
                        input { r#type: "button", value: "Next", onclick: move |_| stepper.write().next(&next_layout) }
                    }
                    if step.is_last(&layout) {
                        input { r#type: "submit", value: "Submit" }
                    }
                }
            }
        }
    }
}

#[component]
fn PreviewField(control: Control) -> Element {
    let items = control.items.clone().unwrap_or_default();
    let name = control.name.clone();

    match control.control_name {
        ControlKind::TextField | ControlKind::ScanCode => rsx! {
            input { r#type: "text", name: "{name}", placeholder: "{control.placeholder}" }
        },
        ControlKind::MultilineTextField => rsx! {
            textarea { name: "{name}", rows: "3", placeholder: "{control.placeholder}" }
        },
        ControlKind::Checkbox | ControlKind::Checklist | ControlKind::MultiChoices => rsx! {
            for item in items.iter() {
                label { key: "{item.id}", style: "display: block;",
                    input { r#type: "checkbox", name: "{name}", value: "{item.value}" }
                    " {item.label}"
                }
            }
        },
        ControlKind::RadioGroup => rsx! {
            for item in items.iter() {
                label { key: "{item.id}", style: "display: block;",
                    input { r#type: "radio", name: "{name}", value: "{item.value}" }
                    " {item.label}"
                }
            }
        },
        ControlKind::SelectDropDown => rsx! {
            select { name: "{name}",
                option { value: "", "{control.placeholder}" }
                for item in items.iter() {
                    option { key: "{item.id}", value: "{item.value}", "{item.label}" }
                }
            }
        },
        ControlKind::DateField => rsx! { input { r#type: "date", name: "{name}" } },
        ControlKind::TimeField => rsx! { input { r#type: "time", name: "{name}" } },
        ControlKind::FileUpload => rsx! { input { r#type: "file", name: "{name}" } },
        ControlKind::ImageUpload => rsx! { input { r#type: "file", accept: "image/*", name: "{name}" } },
        ControlKind::Signature => rsx! {
            div {
                style: "height: 120px; border: 1px dashed #999; border-radius: 4px; display: flex;
                        align-items: center; justify-content: center; color: #999;",
                "{control.placeholder}"
            }
        },
        ControlKind::Toggle => rsx! { input { r#type: "checkbox", name: "{name}" } },
        ControlKind::Information => rsx! {},
        ControlKind::Unknown => rsx! { em { "This field type is not supported by the editor." } },
    }
}

/// The payload publishing would send, pretty printed.
#[component]
pub fn JsonPreview() -> Element {
    let editor = use_context::<Signal<EditorSession>>();
    let rendered = schema::convert(editor.read().layout())
        .map_err(|err| err.to_string())
        .and_then(|blocks| serde_json::to_string_pretty(&blocks).map_err(|err| err.to_string()));

    match rendered {
        Ok(json) => rsx! {
            pre { style: "margin: 24px; padding: 16px; background: white; border-radius: 8px; font-size: 12px; overflow: auto;",
                "{json}"
            }
        },
        Err(message) => rsx! {
            div { style: "margin: 24px; color: #f44336;", "{message}" }
        },
    }
}
