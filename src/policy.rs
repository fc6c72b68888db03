//! Conversation modes and the capability each one selects.

use std::fmt;
use std::str::FromStr;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ConversationMode {
    #[default]
    Standard,
    SearchGrounded,
    FastResponse,
}

impl ConversationMode {
    pub const ALL: [ConversationMode; 3] = [
        ConversationMode::Standard,
        ConversationMode::SearchGrounded,
        ConversationMode::FastResponse,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ConversationMode::Standard => "Standard",
            ConversationMode::SearchGrounded => "Search Grounded",
            ConversationMode::FastResponse => "Fast Response",
        }
    }

    /// Short key used by config values, the REPL and form controls.
    pub fn key(self) -> &'static str {
        match self {
            ConversationMode::Standard => "standard",
            ConversationMode::SearchGrounded => "search",
            ConversationMode::FastResponse => "fast",
        }
    }

    pub fn policy(self) -> ModePolicy {
        ModePolicy::for_mode(self)
    }
}

impl fmt::Display for ConversationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown mode '{0}' (expected standard, search or fast)")]
pub struct UnknownMode(pub String);

impl FromStr for ConversationMode {
    type Err = UnknownMode;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "standard" => Ok(ConversationMode::Standard),
            "search" | "search-grounded" | "grounded" => Ok(ConversationMode::SearchGrounded),
            "fast" | "fast-response" | "lite" => Ok(ConversationMode::FastResponse),
            _ => Err(UnknownMode(raw.to_string())),
        }
    }
}

/// Gateway entry point a turn is routed to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Capability {
    Multimodal,
    SearchGrounded,
    Lite,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ModePolicy {
    pub allows_attachment: bool,
    pub capability: Capability,
}

impl ModePolicy {
    pub const fn for_mode(mode: ConversationMode) -> Self {
        match mode {
            ConversationMode::Standard => Self {
                allows_attachment: true,
                capability: Capability::Multimodal,
            },
            ConversationMode::SearchGrounded => Self {
                allows_attachment: false,
                capability: Capability::SearchGrounded,
            },
            ConversationMode::FastResponse => Self {
                allows_attachment: false,
                capability: Capability::Lite,
            },
        }
    }
}
