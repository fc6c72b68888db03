use crate::types::ThemeMode;

pub struct ThemeDefinition {
    pub label: &'static str,
    pub css: &'static str,
}

pub const THEMES: [ThemeMode; 2] = [ThemeMode::Dark, ThemeMode::Light];

pub fn theme_definition(mode: ThemeMode) -> ThemeDefinition {
    match mode {
        ThemeMode::Dark => ThemeDefinition {
            label: "Dark",
            css: DARK_THEME,
        },
        ThemeMode::Light => ThemeDefinition {
            label: "Light",
            css: LIGHT_THEME,
        },
    }
}

const DARK_THEME: &str = r#"
:root {
    --color-bg-primary: #0b0d10;
    --color-bg-overlay: rgba(11, 13, 16, 0.92);
    --color-text-primary: #f2f4f7;
    --color-text-muted: #a3a9b3;
    --color-border: #2c313a;
    --color-surface-muted: #161a20;
    --color-input-bg: #11151a;
    --color-chat-user-bg: #2d6cdf;
    --color-chat-user-text: #ffffff;
    --color-chat-ai-bg: #161a20;
    --color-chat-ai-text: #f2f4f7;
    --color-link: #7fb0ff;
    --color-timestamp: #7d8590;
    --color-highlight: #f5a524;
    --color-shimmer-base: rgba(127, 176, 255, 0.25);
    --color-shimmer-highlight: #7fb0ff;
}
"#;

const LIGHT_THEME: &str = r#"
:root {
    --color-bg-primary: #ffffff;
    --color-bg-overlay: rgba(255, 255, 255, 0.94);
    --color-text-primary: #111418;
    --color-text-muted: #59606b;
    --color-border: #d5d9e0;
    --color-surface-muted: #f1f3f6;
    --color-input-bg: #ffffff;
    --color-chat-user-bg: #2d6cdf;
    --color-chat-user-text: #ffffff;
    --color-chat-ai-bg: #f1f3f6;
    --color-chat-ai-text: #111418;
    --color-link: #1f5bc4;
    --color-timestamp: #6b7280;
    --color-highlight: #c77700;
    --color-shimmer-base: rgba(31, 91, 196, 0.2);
    --color-shimmer-highlight: #1f5bc4;
}
"#;
