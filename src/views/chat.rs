use crate::attachment::{self, Attachment, AttachmentSource, PreviewHandle};
use crate::orchestrator::{TurnInput, TurnOrchestrator};
use crate::policy::ConversationMode;
use crate::session::{SessionState, SessionStore};
use crate::types::{CitationSource, Message, Role};
use crate::views::shared::{markdown_to_html, role_class};
use dioxus::events::Key;
use dioxus::prelude::*;
use std::path::Path;

impl SessionStore for Signal<SessionState> {
    fn current(&self) -> SessionState {
        self.read().clone()
    }

    fn replace(&mut self, state: SessionState) {
        self.set(state);
    }
}

fn submit(
    turns: &TurnOrchestrator,
    session: Signal<SessionState>,
    mut input: Signal<String>,
    mut staged: Signal<Option<Attachment>>,
) {
    if session.read().is_flight_active() {
        return;
    }
    let text = input();
    let attachment = staged.write().take();
    if text.trim().is_empty() && attachment.is_none() {
        return;
    }
    input.set(String::new());

    let turns = turns.clone();
    let mut store = session;
    spawn(async move {
        let mut turn = TurnInput::text(text);
        turn.attachment = attachment;
        let outcome = turns.submit_turn(&mut store, turn).await;
        tracing::debug!(?outcome, "chat turn settled");
    });
}

/// Stages a picked file with a data-URL preview.
fn stage_file(name: &str, bytes: Vec<u8>) -> Attachment {
    let display_name = Path::new(name)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(name)
        .to_string();
    let staged = Attachment::from_bytes(display_name, bytes);
    let media_type = staged.resolved_media_type();
    let preview = match &staged.source {
        AttachmentSource::Bytes(bytes) => Some(attachment::data_url(&media_type, bytes)),
        AttachmentSource::Path(_) => None,
    };
    match preview {
        Some(url) => staged.with_preview(PreviewHandle::new(url)),
        None => staged,
    }
}

#[component]
pub fn ChatView(default_mode: ConversationMode) -> Element {
    let turns = use_context::<TurnOrchestrator>();
    let mut session = use_signal(|| SessionState::new(default_mode));
    let mut input = use_signal(String::new);
    let mut staged = use_signal(|| Option::<Attachment>::None);

    let state = session();
    let in_flight = state.is_flight_active();
    let mode = state.mode();
    let staged_ref = staged.read().as_ref().map(Attachment::reference);
    let can_send = !in_flight && (!input().trim().is_empty() || staged_ref.is_some());

    let on_pick = move |evt: FormEvent| async move {
        let mut staged = staged;
        let Some(engine) = evt.files() else {
            return;
        };
        let Some(name) = engine.files().into_iter().next() else {
            return;
        };
        match engine.read_file(&name).await {
            Some(bytes) => staged.set(Some(stage_file(&name, bytes))),
            None => tracing::warn!(file = %name, "picked file could not be read"),
        }
    };

    let mode_turns = turns.clone();
    let key_turns = turns.clone();
    let click_turns = turns;

    rsx! {
        div { class: "main-container",
            div { id: "chat-list", class: "chat-list",
                if state.is_empty() {
                    p { class: "chat-empty", "Ask anything. Attach an image in Standard mode." }
                }
                for msg in state.turns().iter() {
                    MessageRow { key: "{msg.id}", message: msg.clone() }
                }
                if in_flight {
                    div { class: "message-row ai",
                        div { class: "avatar", "AI" }
                        div { class: "message-stack",
                            div { class: "shimmer-text", "Processing…" }
                        }
                    }
                }
            }
        }

        form { class: "composer",
            div { class: "composer-inner",
                div { class: "composer-toolbar",
                    select {
                        value: "{mode.key()}",
                        onchange: move |evt: FormEvent| {
                            match evt.value().parse::<ConversationMode>() {
                                Ok(next) => mode_turns.change_mode(&mut session, next),
                                Err(err) => tracing::warn!("{}", err),
                            }
                        },
                        for choice in ConversationMode::ALL {
                            option {
                                value: choice.key(),
                                selected: choice == mode,
                                "{choice.label()}"
                            }
                        }
                    }
                    label { class: "file-label",
                        "Attach image"
                        input {
                            r#type: "file",
                            accept: "image/*",
                            disabled: in_flight,
                            onchange: on_pick,
                        }
                    }
                    if let Some(pending) = staged_ref {
                        div { class: "staged",
                            if let Some(url) = &pending.preview_url {
                                img { src: "{url}", alt: "{pending.name}" }
                            }
                            span { "{pending.name}" }
                            button {
                                class: "action-btn",
                                r#type: "button",
                                onclick: move |_| staged.set(None),
                                "Remove"
                            }
                        }
                    }
                }
                div { class: "composer-row",
                    textarea {
                        rows: "1",
                        placeholder: "What can I help you with?",
                        value: "{input}",
                        oninput: move |ev| input.set(ev.value()),
                        onkeydown: move |ev| {
                            if ev.key() == Key::Enter && !ev.modifiers().shift() {
                                ev.prevent_default();
                                submit(&key_turns, session, input, staged);
                            }
                        },
                        disabled: in_flight,
                        autofocus: true,
                    }
                    button {
                        class: "btn btn-primary",
                        r#type: "button",
                        disabled: !can_send,
                        onclick: move |_| submit(&click_turns, session, input, staged),
                        "Send"
                    }
                }
            }
        }
    }
}

#[component]
fn MessageRow(message: Message) -> Element {
    let class = role_class(message.role);
    let timestamp = message.display_time();
    rsx! {
        div { class: "message-row {class}",
            if matches!(message.role, Role::Ai) {
                div { class: "avatar", "AI" }
            }
            div { class: "message-stack",
                div { class: "bubble {class}",
                    if let Some(image) = &message.attachment {
                        if let Some(url) = &image.preview_url {
                            img { class: "bubble-image", src: "{url}", alt: "{image.name}" }
                        }
                    }
                    if matches!(message.role, Role::Ai) {
                        AiBubble { content: message.content.clone(), sources: message.sources.clone() }
                    } else {
                        "{message.content}"
                    }
                }
                if let Some(ts) = timestamp {
                    div {
                        class: format_args!(
                            "message-meta {}",
                            match message.role { Role::User => "align-end", Role::Ai => "align-start" }
                        ),
                        span { class: "message-timestamp", "{ts}" }
                    }
                }
            }
        }
    }
}

#[component]
fn AiBubble(content: String, sources: Vec<CitationSource>) -> Element {
    let content_html = markdown_to_html(&content);
    let copy_payload = content.clone();
    let on_copy = move |_| {
        #[cfg(feature = "desktop")]
        {
            match arboard::Clipboard::new() {
                Ok(mut clipboard) => {
                    if let Err(err) = clipboard.set_text(copy_payload.clone()) {
                        tracing::warn!("copy failed: {}", err);
                    }
                }
                Err(err) => tracing::warn!("clipboard unavailable: {}", err),
            }
        }
        #[cfg(not(feature = "desktop"))]
        let _ = &copy_payload;
    };

    rsx! {
        div { class: "bubble-controls",
            button { class: "action-btn", title: "Copy markdown", onclick: on_copy, "Copy" }
        }
        div { class: "md", dangerous_inner_html: "{content_html}" }
        if !sources.is_empty() {
            div { class: "sources",
                span { class: "text-muted", "Sources" }
                ol {
                    for source in sources.iter() {
                        li {
                            a {
                                href: "{source.uri}",
                                target: "_blank",
                                rel: "noopener noreferrer",
                                "{source.display_title()}"
                            }
                        }
                    }
                }
            }
        }
    }
}
