use super::component::{dispatch_open, report};
use crate::form_builder::catalog::catalog;
use crate::form_builder::schema::Form;
use crate::form_builder::session::EditorSession;
use crate::services::{FormBackend, TemplateRepository};
use dioxus::prelude::*;
use std::rc::Rc;
use tracing::warn;

/// Lists local drafts and published forms, and starts new ones.
#[component]
pub fn FormPicker(on_close: EventHandler<()>) -> Element {
    let mut editor = use_context::<Signal<EditorSession>>();
    let repository = use_context::<Rc<dyn TemplateRepository>>();
    let backend = use_context::<Rc<dyn FormBackend>>();

    let mut published = use_signal(Vec::<Form>::new);
    let mut loading = use_signal(|| true);
    let mut new_name = use_signal(String::new);
    let mut new_id = use_signal(String::new);

    let list_backend = backend.clone();
    use_effect(move || {
        let backend = list_backend.clone();
        spawn(async move {
            match backend.list_forms().await {
                Ok(forms) => published.set(forms),
                Err(err) => warn!(%err, "published forms unavailable"),
            }
            loading.set(false);
        });
    });

    let drafts = repository.list().unwrap_or_else(|err| {
        warn!(%err, "stored drafts unreadable");
        Vec::new()
    });
    let entries = catalog(&drafts, &published.read());
    let current = editor.read().template().form_id;

    let parsed_id = new_id.read().trim().parse::<i64>().ok();
    let create_entries = entries.clone();
    let create_repository = repository.clone();

    rsx! {
        div {
            class: "form-picker",
            style: "position: fixed; inset: 0; background: rgba(0,0,0,0.3); display: flex; align-items: center; justify-content: center;",
            div {
                style: "background: white; width: 420px; max-height: 80vh; overflow-y: auto; padding: 16px; border-radius: 8px;",
                div { style: "display: flex; justify-content: space-between; align-items: center;",
                    h3 { style: "margin: 0;", "Forms" }
                    button { onclick: move |_| on_close.call(()), "x" }
                }
                if loading() {
                    p { style: "font-size: 12px; color: #666;", "Loading published forms..." }
                }

                for entry in entries {
                    {
                        let repository = repository.clone();
                        let backend = backend.clone();
                        let form_id = entry.form_id;
                        let has_draft = entry.has_draft;
                        let state = match (entry.has_draft, entry.published) {
                            (true, true) => "draft, published",
                            (true, false) => "draft",
                            _ => "published",
                        };
                        rsx! {
                            div { key: "{form_id}",
                                style: "display: flex; align-items: center; gap: 8px; padding: 6px 0; border-bottom: 1px solid #eee;",
                                span { style: "flex: 1;", "#{form_id} {entry.form_name}" }
                                span { style: "font-size: 12px; color: #666;", "{state}" }
                                button {
                                    disabled: form_id == current,
                                    onclick: move |_| {
                                        if has_draft {
                                            report(editor.write().open_draft(form_id, repository.as_ref()));
                                        } else {
                                            dispatch_open(editor, backend.clone(), form_id);
                                        }
                                        on_close.call(());
                                    },
                                    "Open"
                                }
                            }
                        }
                    }
                }

                h4 { style: "margin: 16px 0 8px 0;", "New form" }
                div { style: "display: flex; gap: 8px;",
                    input {
                        r#type: "text",
                        placeholder: "Form name",
                        value: "{new_name}",
                        oninput: move |e| new_name.set(e.value()),
                    }
                    input {
                        r#type: "number",
                        placeholder: "Form ID",
                        style: "width: 90px;",
                        value: "{new_id}",
                        oninput: move |e| new_id.set(e.value()),
                    }
                    button {
                        disabled: parsed_id.is_none(),
                        onclick: move |_| {
                            let Some(form_id) = parsed_id else { return };
                            let created = editor.write().create_form(
                                &new_name.read(),
                                form_id,
                                &create_entries,
                                create_repository.as_ref(),
                            );
                            if report(created).is_some() {
                                on_close.call(());
                            }
                        },
                        "Create"
                    }
                }
            }
        }
    }
}
