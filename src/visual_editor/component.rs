use super::form_picker::FormPicker;
use super::preview::{JsonPreview, StepperPreview};
use super::properties_editor::PropertiesPanel;
use crate::config::BuilderConfig;
use crate::error::EditorError;
use crate::form_builder::catalog::latest_draft;
use crate::form_builder::drag::{DragItem, DropZone, SlotRect};
use crate::form_builder::ids::UuidGenerator;
use crate::form_builder::layout::{BlockType, Control, NodeRef};
use crate::form_builder::palette::{container_palette, control_palette};
use crate::form_builder::selection::NodeKey;
use crate::form_builder::session::{EditorSession, PendingRequest};
use crate::form_builder::template::Template;
use crate::services::{
    FormBackend, HttpBackend, LocalStorageRepository, Notice, NoticeKind, Notifier, TemplateRepository,
};
use dioxus::prelude::*;
use gloo_timers::future::TimeoutFuture;
use std::rc::Rc;
use std::time::Duration;
use tracing::warn;

const DEFAULT_FORM_ID: i64 = 1;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum EditorMode {
    Editor,
    Preview,
    Json,
}

/// Notifier backed by a signal: the strip shows the latest notice and
/// clears it once its duration has passed.
#[derive(Clone, Copy)]
pub struct NoticeSignal {
    current: Signal<Option<Notice>>,
}

impl NoticeSignal {
    pub fn new(current: Signal<Option<Notice>>) -> Self {
        Self { current }
    }
}

impl Notifier for NoticeSignal {
    fn notify(&self, kind: NoticeKind, message: &str, duration: Duration) {
        let notice = Notice { kind, message: message.to_string(), duration };
        let mut current = self.current;
        current.set(Some(notice.clone()));

        spawn(async move {
            TimeoutFuture::new(timeout_millis(duration)).await;
            // A newer notice may have replaced this one meanwhile.
            let still_shown = *current.peek() == Some(notice);
            if still_shown {
                current.set(None);
            }
        });
    }
}

/// Timer length for a notice. Anything past `u32::MAX` milliseconds stays up.
fn timeout_millis(duration: Duration) -> u32 {
    u32::try_from(duration.as_millis()).unwrap_or(u32::MAX)
}

pub(super) fn report<T>(result: Result<T, EditorError>) -> Option<T> {
    result.map_err(|err| warn!(%err, "editor action failed")).ok()
}

/// Sends a prepared request in the background and hands the outcome back to
/// the session.
pub(super) fn dispatch(mut editor: Signal<EditorSession>, backend: Rc<dyn FormBackend>, request: PendingRequest) {
    spawn(async move {
        let result = request.send(backend.as_ref()).await;
        report(editor.write().complete(request, result));
    });
}

/// Fetches a published form and opens it once it arrives.
pub(super) fn dispatch_open(mut editor: Signal<EditorSession>, backend: Rc<dyn FormBackend>, form_id: i64) {
    spawn(async move {
        let fetched = backend.fetch_form(form_id).await;
        report(editor.write().open_form(fetched));
    });
}

fn browser_confirm(message: &str) -> bool {
    web_sys::window()
        .and_then(|window| window.confirm_with_message(message).ok())
        .unwrap_or(false)
}

fn slot_rect(element_id: &str) -> Option<SlotRect> {
    let rect = web_sys::window()?
        .document()?
        .get_element_by_id(element_id)?
        .get_bounding_client_rect();
    Some(SlotRect { top: rect.top(), bottom: rect.bottom() })
}

#[component]
pub fn FormBuilderApp() -> Element {
    let config = use_hook(BuilderConfig::default);
    let notice = use_signal(|| None::<Notice>);
    use_context_provider(|| notice);

    let repository = use_context_provider(|| {
        Rc::new(LocalStorageRepository::new(config.storage_key.clone())) as Rc<dyn TemplateRepository>
    });
    use_context_provider(|| Rc::new(HttpBackend::new(&config)) as Rc<dyn FormBackend>);
    use_context_provider(|| {
        let fresh = || Template::new_draft("Untitled Form", DEFAULT_FORM_ID, config.creator.clone());
        let template = match repository.list() {
            Ok(drafts) => latest_draft(drafts).unwrap_or_else(fresh),
            Err(err) => {
                warn!(%err, "stored drafts unreadable, starting fresh");
                fresh()
            }
        };
        Signal::new(EditorSession::new(
            template,
            config.clone(),
            Rc::new(UuidGenerator),
            Rc::new(NoticeSignal::new(notice)),
        ))
    });

    rsx! {
        FormBuilder {}
    }
}

#[component]
pub fn FormBuilder() -> Element {
    let editor = use_context::<Signal<EditorSession>>();
    let mut mode = use_signal(|| EditorMode::Editor);
    let mut picking = use_signal(|| false);
    let current = mode();
    let form_id = editor.read().template().form_id;
    let tab = |wanted: EditorMode| if current == wanted { "var(--color-primary, #2196F3)" } else { "var(--color-secondary, #e0e0e0)" };
    let (editor_bg, preview_bg, json_bg) = (tab(EditorMode::Editor), tab(EditorMode::Preview), tab(EditorMode::Json));

    rsx! {
        div {
            class: "form-builder",
            style: "display: flex; flex-direction: column; height: 100vh; font-family: system-ui;",

            NoticeStrip {}
            FormHeader { key: "{form_id}", on_pick: move |_| picking.set(true) }
            if picking() {
                FormPicker { on_close: move |_| picking.set(false) }
            }

            div {
                style: "display: flex; flex: 1; overflow: hidden;",

                div {
                    class: "toolbox",
                    style: "width: 220px; padding: 16px; border-right: 1px solid #ddd; overflow-y: auto;",

                    div {
                        class: "mode-toggle",
                        style: "margin-bottom: 16px; display: flex; gap: 8px;",
                        button { onclick: move |_| mode.set(EditorMode::Editor), style: "background: {editor_bg};", "Editor" }
                        button { onclick: move |_| mode.set(EditorMode::Preview), style: "background: {preview_bg};", "Preview" }
                        button { onclick: move |_| mode.set(EditorMode::Json), style: "background: {json_bg};", "JSON" }
                    }

                    if current == EditorMode::Editor {
                        Palette {}
                    }
                }

                div {
                    class: "canvas-wrapper",
                    style: "flex: 1; background: #f0f0f0; overflow-y: auto;",
                    match current {
                        EditorMode::Editor => rsx! { Canvas {} },
                        EditorMode::Preview => rsx! { StepperPreview {} },
                        EditorMode::Json => rsx! { JsonPreview {} },
                    }
                }

                if current == EditorMode::Editor {
                    div {
                        class: "properties",
                        style: "width: 320px; border-left: 1px solid #ddd; overflow-y: auto;",
                        PropertiesPanel {}
                    }
                }
            }
        }
    }
}

#[component]
fn NoticeStrip() -> Element {
    let mut notice = use_context::<Signal<Option<Notice>>>();
    let Some(current) = notice() else {
        return rsx! {};
    };
    let background = match current.kind {
        NoticeKind::Success => "#4CAF50",
        NoticeKind::Danger => "#f44336",
    };
    let kind = current.kind.as_str();

    rsx! {
        div {
            class: "notice notice-{kind}",
            style: "display: flex; justify-content: space-between; padding: 8px 16px; color: white; background: {background};",
            span { "{current.message}" }
            button {
                style: "background: none; border: none; color: white; cursor: pointer;",
                onclick: move |_| notice.set(None),
                "x"
            }
        }
    }
}

/// Keyed by form id so the name field resets when another form opens.
#[component]
fn FormHeader(on_pick: EventHandler<()>) -> Element {
    let mut editor = use_context::<Signal<EditorSession>>();
    let repository = use_context::<Rc<dyn TemplateRepository>>();
    let backend = use_context::<Rc<dyn FormBackend>>();

    let (stored_name, published) = {
        let session = editor.read();
        (session.template().form_name.clone(), session.template().id.is_some())
    };
    let mut name = use_signal(|| stored_name);

    let name_repository = repository.clone();
    let draft_repository = repository;
    let publish_backend = backend.clone();
    let reload_backend = backend;

    rsx! {
        div {
            class: "form-header",
            style: "display: flex; align-items: center; gap: 8px; padding: 12px 16px; border-bottom: 1px solid #ddd;",

            button { onclick: move |_| on_pick.call(()), "Forms" }
            input {
                r#type: "text",
                value: "{name}",
                oninput: move |e| name.set(e.value()),
            }
            button {
                onclick: move |_| {
                    report(editor.write().save_form_name(&name.read(), name_repository.as_ref()));
                },
                "Save name"
            }

            div { style: "flex: 1;" }

            button {
                onclick: move |_| {
                    report(editor.write().save_form(draft_repository.as_ref()));
                },
                "Save"
            }
            button {
                onclick: move |_| {
                    let prepared = editor.write().publish_form(None);
                    if let Some(request) = report(prepared) {
                        dispatch(editor, publish_backend.clone(), request);
                    }
                },
                "Publish"
            }
            if published {
                button {
                    onclick: move |_| {
                        let form_id = editor.read().template().form_id;
                        dispatch_open(editor, reload_backend.clone(), form_id);
                    },
                    "Reload"
                }
            }
        }
    }
}

#[component]
fn Palette() -> Element {
    let mut editor = use_context::<Signal<EditorSession>>();

    rsx! {
        h2 { style: "margin: 0 0 8px 0; font-size: 16px;", "Containers" }
        div {
            style: "display: flex; flex-direction: column; gap: 8px;",
            for template in container_palette() {
                {
                    let dragged = template.clone();
                    let clicked = template.clone();
                    rsx! {
                        div {
                            class: "palette-item",
                            style: "padding: 8px; background: #4CAF50; color: white; border-radius: 4px; cursor: grab;",
                            draggable: "true",
                            ondragstart: move |_| editor.write().begin_drag_container(dragged.clone()),
                            ondragend: move |_| editor.write().cancel_drag(),
                            onclick: move |_| {
                                editor.write().add_container(&clicked);
                            },
                            "{template.display_text}"
                        }
                    }
                }
            }
        }

        h2 { style: "margin: 16px 0 8px 0; font-size: 16px;", "Controls" }
        div {
            style: "display: flex; flex-direction: column; gap: 8px;",
            for template in control_palette() {
                {
                    let label = template.display_text();
                    rsx! {
                        div {
                            class: "palette-item",
                            style: "padding: 8px; background: #2196F3; color: white; border-radius: 4px; cursor: grab;",
                            draggable: "true",
                            ondragstart: move |_| editor.write().begin_drag_palette_control(template.clone()),
                            ondragend: move |_| editor.write().cancel_drag(),
                            "{label}"
                        }
                    }
                }
            }
        }

        div { style: "margin-top: 24px;",
            h3 { style: "margin: 0 0 8px 0; font-size: 14px;", "Instructions" }
            p { style: "font-size: 12px; color: #666; line-height: 1.4;",
                "Drag steps onto the page"
                br {}
                "Drag controls into a step"
                br {}
                "Click to edit properties"
            }
        }
    }
}

#[component]
fn Canvas() -> Element {
    let mut editor = use_context::<Signal<EditorSession>>();
    let layout = editor.read().layout().clone();

    rsx! {
        div {
            class: "canvas",
            style: "min-height: 100%; padding: 24px; display: flex; flex-direction: column; gap: 16px;",
            ondragover: move |e| {
                if editor.read().drop_accepted(&DropZone::Page) {
                    e.prevent_default();
                }
            },
            ondrop: move |e| {
                e.prevent_default();
                report(editor.write().drop_on(DropZone::Page, None));
            },

            if layout.is_empty() {
                div {
                    style: "padding: 48px; text-align: center; color: #666; border: 2px dashed #bbb; border-radius: 8px;",
                    "Drag a step here to start the form"
                }
            }
            for entry in layout.iter() {
                ContainerZone { key: "{entry.container.internal_id}", container_id: entry.container.internal_id.clone() }
            }
        }
    }
}

#[component]
fn ContainerZone(container_id: String) -> Element {
    let mut editor = use_context::<Signal<EditorSession>>();
    let (entry, selected) = {
        let session = editor.read();
        let Some(entry) = session.layout().container(&container_id).cloned() else {
            return rsx! {};
        };
        (entry, session.selection().is_container(&container_id))
    };

    let zone = DropZone::Container(container_id.clone());
    let accept_zone = zone.clone();
    let node = NodeRef::of_container(&entry.container);
    let border = if selected { "#f44336" } else { "#333" };
    let is_signature = entry.container.block_type == BlockType::Signature;
    let select_id = container_id.clone();
    let clear_id = container_id.clone();
    let fill_id = container_id;

    rsx! {
        div {
            class: "container-zone",
            style: "background: white; border: 2px solid {border}; border-radius: 8px; padding: 12px;",
            ondragover: move |e| {
                if editor.read().drop_accepted(&accept_zone) {
                    e.prevent_default();
                }
            },
            ondrop: move |e| {
                e.prevent_default();
                e.stop_propagation();
                report(editor.write().drop_on(zone.clone(), None));
            },

            div {
                class: "container-header",
                style: "display: flex; justify-content: space-between; cursor: pointer; margin-bottom: 8px;",
                onclick: move |_| {
                    report(editor.write().select(NodeKey::Container(select_id.clone())));
                },
                div {
                    div { style: "font-weight: bold; font-size: 14px;", "{entry.container.heading}" }
                    div { style: "font-size: 12px; color: #666;", "{entry.container.sub_heading}" }
                }
                div {
                    style: "display: flex; gap: 4px;",
                    button {
                        onclick: move |e| {
                            e.stop_propagation();
                            report(editor.write().clear_container_fields(&clear_id));
                        },
                        "Clear"
                    }
                    if is_signature {
                        button {
                            onclick: move |e| {
                                e.stop_propagation();
                                report(editor.write().populate_signature_fields(&fill_id));
                            },
                            "Signature fields"
                        }
                    }
                    button {
                        style: "background: #f44336; color: white; border: none; border-radius: 4px;",
                        onclick: move |e| {
                            e.stop_propagation();
                            report(editor.write().delete_container(&node, &browser_confirm));
                        },
                        "Delete"
                    }
                }
            }

            if entry.children.is_empty() {
                div {
                    style: "padding: 16px; text-align: center; font-size: 12px; color: #999; border: 1px dashed #ccc;",
                    "Drop controls here"
                }
            }
            for (index, control) in entry.children.iter().enumerate() {
                ControlSlot { key: "{control.internal_id}", index, control: control.clone() }
            }
        }
    }
}

#[component]
fn ControlSlot(index: usize, control: Control) -> Element {
    let mut editor = use_context::<Signal<EditorSession>>();
    let selected = editor.read().selection().is_control(&control.internal_id);

    let slot_id = format!("control-slot-{}", control.internal_id);
    let kind = control.control_name.display_text();
    let border = if selected { "#f44336" } else { "#ccc" };
    let key = NodeKey::of_control(&control);
    let node = NodeRef::of_control(&control);
    let owner = NodeRef::Internal(control.container_id.clone());
    let drag_key = control.internal_id.clone();
    let hover_slot = slot_id.clone();
    let hover_container = control.container_id.clone();
    let drop_container = control.container_id.clone();

    rsx! {
        div {
            id: "{slot_id}",
            class: "control-slot",
            style: "display: flex; justify-content: space-between; align-items: center; padding: 8px; margin-bottom: 6px;
                    border: 2px solid {border}; border-radius: 4px; background: #fafafa; cursor: grab; user-select: none;",
            draggable: "true",
            ondragstart: move |e| {
                e.stop_propagation();
                report(editor.write().begin_drag_control(&drag_key));
            },
            ondragend: move |_| editor.write().cancel_drag(),
            ondragover: move |e| {
                let zone = DropZone::Container(hover_container.clone());
                if !editor.read().drop_accepted(&zone) {
                    return;
                }
                e.prevent_default();
                if let Some(slot) = slot_rect(&hover_slot) {
                    let pointer_y = e.client_coordinates().y;
                    report(editor.write().hover_control(&hover_container, index, slot, pointer_y));
                }
            },
            ondrop: move |e| {
                e.prevent_default();
                e.stop_propagation();
                // Controls from this container were already placed by hovering.
                let position = match editor.read().drag().dragged() {
                    Some(DragItem::Control { container_id, .. }) if *container_id == drop_container => None,
                    _ => Some(index),
                };
                report(editor.write().drop_on(DropZone::Container(drop_container.clone()), position));
            },
            onclick: move |e| {
                e.stop_propagation();
                report(editor.write().select(key.clone()));
            },

            div {
                div { style: "font-size: 13px;",
                    "{control.label_name}"
                    if control.required {
                        span { style: "color: #f44336;", " *" }
                    }
                }
                div { style: "font-size: 11px; color: #666;", "{kind}" }
            }
            button {
                onclick: move |e| {
                    e.stop_propagation();
                    report(editor.write().delete_control(&node, &owner));
                },
                "Delete"
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notice_timers_saturate_instead_of_wrapping() {
        assert_eq!(timeout_millis(Duration::from_millis(1500)), 1500);
        assert_eq!(timeout_millis(Duration::from_millis(u64::from(u32::MAX) + 1)), u32::MAX);
        assert_eq!(timeout_millis(Duration::from_secs(u64::MAX)), u32::MAX);
    }
}
