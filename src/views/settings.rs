use crate::credentials::CredentialSlot;
use crate::theme::{THEMES, theme_definition};
use crate::types::ThemeMode;
use dioxus::prelude::*;

/// `key_request` is raised when the service rejected the current key; the
/// key form stays highlighted until a new key is saved.
#[component]
pub fn SettingsView(theme: Signal<ThemeMode>, key_request: SyncSignal<bool>) -> Element {
    let mut key_request = key_request;
    let credentials = use_context::<CredentialSlot>();
    let mut draft = use_signal(String::new);
    let mut status = use_signal(|| Option::<&'static str>::None);

    let requested = key_request();
    let key_state = if credentials.is_set() {
        "An API key is set for this session."
    } else {
        "No API key is set."
    };

    let save_slot = credentials.clone();
    let on_save = move |_| {
        let value = draft();
        if value.trim().is_empty() {
            status.set(Some("Enter a key first."));
            return;
        }
        save_slot.set(Some(value));
        draft.set(String::new());
        key_request.set(false);
        status.set(Some("API key saved."));
        tracing::info!("api key replaced from settings");
    };
    let clear_slot = credentials;
    let on_clear = move |_| {
        clear_slot.set(None);
        status.set(Some("API key cleared."));
    };

    rsx! {
        div { class: "main-container",
            div { class: "settings-section",
                h3 { class: "section-title", "Display" }
                div { class: "theme-toggle",
                    for mode in THEMES {
                        button {
                            class: format_args!(
                                "btn theme-option {}",
                                if theme() == mode { "active" } else { "" }
                            ),
                            r#type: "button",
                            onclick: move |_| theme.set(mode),
                            "{theme_definition(mode).label}"
                        }
                    }
                }
            }
            div {
                class: format_args!(
                    "settings-section {}",
                    if requested { "highlight" } else { "" }
                ),
                h3 { class: "section-title", "API key" }
                if requested {
                    p { "Your API key was not recognized. Enter a valid key to continue." }
                }
                p { class: "text-muted", "{key_state}" }
                div { class: "key-form",
                    input {
                        r#type: "password",
                        placeholder: "Paste a Gemini API key",
                        value: "{draft}",
                        oninput: move |ev| draft.set(ev.value()),
                    }
                    button { class: "btn btn-primary", r#type: "button", onclick: on_save, "Save" }
                    button { class: "btn", r#type: "button", onclick: on_clear, "Clear" }
                }
                if let Some(message) = status() {
                    p { class: "text-muted", "{message}" }
                }
            }
        }
    }
}
