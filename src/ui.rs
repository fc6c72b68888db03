use crate::ai::GeminiGateway;
use crate::config::Config;
use crate::credentials::CredentialSlot;
use crate::orchestrator::TurnOrchestrator;
use crate::theme::theme_definition;
use crate::types::ThemeMode;
use crate::views::{ChatView, SettingsView};
use dioxus::prelude::*;
use std::sync::Arc;

const PARLEY_CSS: Asset = asset!("/assets/parley.css");

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum AppTab {
    Chat,
    Settings,
}

fn load_config() -> Config {
    Config::from_env().unwrap_or_else(|err| {
        tracing::warn!("{}; starting in the default mode", err);
        Config::from_lookup(|key: &str| match key {
            "PARLEY_DEFAULT_MODE" => None,
            _ => std::env::var(key).ok(),
        })
        .unwrap_or_default()
    })
}

#[component]
pub fn App() -> Element {
    let config = use_hook(load_config);
    let key_request = use_signal_sync(|| false);
    let mut active_tab = use_signal(|| AppTab::Chat);
    let theme = use_signal(ThemeMode::default);

    let credentials = use_context_provider(|| CredentialSlot::new(config.api_key.clone()));
    use_context_provider(|| {
        let gateway = Arc::new(GeminiGateway::new(&config, credentials.clone()));
        let reselect = move || {
            let mut requested = key_request;
            requested.set(true);
        };
        TurnOrchestrator::new(gateway, Arc::new(reselect))
    });

    use_effect(move || {
        if key_request() {
            active_tab.set(AppTab::Settings);
        }
    });

    rsx! {
        ThemeStyles { theme }
        AppHeader { active_tab }
        div { class: "tab-panels",
            TabPanel {
                active_tab,
                tab: AppTab::Chat,
                children: rsx!( ChatView { default_mode: config.default_mode } ),
            }
            TabPanel {
                active_tab,
                tab: AppTab::Settings,
                children: rsx!( SettingsView { theme, key_request } ),
            }
        }
    }
}

#[component]
fn ThemeStyles(theme: Signal<ThemeMode>) -> Element {
    let definition = theme_definition(theme());
    rsx! {
        document::Link { rel: "stylesheet", href: PARLEY_CSS }
        style { dangerous_inner_html: "{definition.css}" }
    }
}

#[component]
fn AppHeader(active_tab: Signal<AppTab>) -> Element {
    rsx! {
        div { class: "header",
            div { class: "header-content",
                h1 { class: "wordmark", "Parley" }
                div { class: "tabs",
                    TabButton { active_tab, tab: AppTab::Chat, label: "Chat" }
                    TabButton { active_tab, tab: AppTab::Settings, label: "Settings" }
                }
            }
        }
    }
}

#[component]
fn TabPanel(active_tab: Signal<AppTab>, tab: AppTab, children: Element) -> Element {
    let is_active = active_tab() == tab;
    rsx! {
        div {
            class: format_args!("tab-panel {}", if is_active { "active" } else { "" }),
            aria_hidden: (!is_active).to_string(),
            {children}
        }
    }
}

#[component]
fn TabButton(active_tab: Signal<AppTab>, tab: AppTab, label: &'static str) -> Element {
    let mut active_tab = active_tab;
    let class = if active_tab() == tab { "tab active" } else { "tab" };
    rsx! {
        h2 {
            class: class,
            onclick: move |_| active_tab.set(tab),
            "{label}"
        }
    }
}
