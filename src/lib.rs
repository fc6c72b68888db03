pub mod ai;
pub mod attachment;
pub mod config;
pub mod credentials;
pub mod orchestrator;
pub mod policy;
pub mod session;
pub mod types;

#[cfg(feature = "gui")]
pub mod theme;
#[cfg(feature = "gui")]
pub mod ui;
#[cfg(feature = "gui")]
pub mod views;

pub use ai::{Completion, CompletionGateway, GatewayError, GatewayErrorKind, GeminiGateway};
pub use attachment::{Attachment, AttachmentError, InlineData, PreviewHandle};
pub use config::Config;
pub use credentials::{CredentialReselector, CredentialSlot, NoReselect};
pub use orchestrator::{FailureKind, IgnoreReason, TurnInput, TurnOrchestrator, TurnOutcome};
pub use policy::{Capability, ConversationMode, ModePolicy};
pub use session::{Session, SessionEvent, SessionState, SessionStore, TransitionError};
pub use types::{AttachmentRef, CitationSource, Message, Role};

/// Installs the `tracing` subscriber used by both front ends. `RUST_LOG`
/// overrides the default `parley=info` filter.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("parley=info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
