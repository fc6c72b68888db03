//! Turn orchestration: one user submission from input to AI reply.
//!
//! [`TurnOrchestrator::submit_turn`] checks the mode policy, records the user
//! turn, calls the gateway entry point the policy selects and records the
//! reply. Every path that accepted a submission leaves the session idle and
//! the attachment preview released.

use crate::ai::{Completion, CompletionGateway, GatewayError, GatewayErrorKind};
use crate::attachment::{Attachment, AttachmentError, PreviewHandle};
use crate::credentials::CredentialReselector;
use crate::policy::{Capability, ConversationMode, ModePolicy};
use crate::session::{SessionEvent, SessionStore};
use crate::types::TurnDraft;
use std::sync::Arc;

pub const CREDENTIAL_ISSUE_MESSAGE: &str =
    "Your API key was not recognized. Please select a valid API key and try again.";

pub const MISSING_CREDENTIAL_MESSAGE: &str =
    "No API key configured. Please select an API key and try again.";

pub fn attachment_not_supported_message(mode: ConversationMode) -> String {
    format!(
        "File uploads are not supported in {} mode. Please switch to Standard mode to attach an image.",
        mode.label()
    )
}

pub fn gateway_failure_message(err: &GatewayError) -> String {
    match err.kind {
        GatewayErrorKind::MissingCredential => MISSING_CREDENTIAL_MESSAGE.to_string(),
        GatewayErrorKind::CredentialNotRecognized => CREDENTIAL_ISSUE_MESSAGE.to_string(),
        _ => format!("Sorry, I encountered an error: {}", err.message),
    }
}

pub fn attachment_failure_message(err: &AttachmentError) -> String {
    format!("Sorry, I couldn't read the attached file: {}", err)
}

#[derive(Debug, Default)]
pub struct TurnInput {
    pub text: String,
    pub attachment: Option<Attachment>,
}

impl TurnInput {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            attachment: None,
        }
    }

    pub fn with_attachment(mut self, attachment: Attachment) -> Self {
        self.attachment = Some(attachment);
        self
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IgnoreReason {
    FlightActive,
    EmptyInput,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FailureKind {
    Attachment,
    Gateway,
    CredentialMissing,
    CredentialNotRecognized,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TurnOutcome {
    /// Nothing was appended.
    Ignored(IgnoreReason),
    /// Answered locally with the mode's attachment advisory.
    Advised,
    Answered,
    Failed(FailureKind),
}

#[derive(Clone)]
pub struct TurnOrchestrator {
    gateway: Arc<dyn CompletionGateway>,
    reselector: Arc<dyn CredentialReselector>,
}

impl TurnOrchestrator {
    pub fn new(
        gateway: Arc<dyn CompletionGateway>,
        reselector: Arc<dyn CredentialReselector>,
    ) -> Self {
        Self {
            gateway,
            reselector,
        }
    }

    pub fn change_mode<S: SessionStore>(&self, store: &mut S, mode: ConversationMode) {
        if store.apply(SessionEvent::ModeChanged(mode)).is_ok() {
            tracing::debug!(mode = mode.key(), "mode changed");
        }
    }

    pub async fn submit_turn<S: SessionStore>(&self, store: &mut S, input: TurnInput) -> TurnOutcome {
        let TurnInput {
            text,
            mut attachment,
        } = input;
        let reference = attachment.as_ref().map(Attachment::reference);
        // Held until this function returns, whichever way it returns.
        let _preview: Option<PreviewHandle> =
            attachment.as_mut().and_then(Attachment::take_preview);

        let state = store.current();
        if state.is_flight_active() {
            tracing::warn!("dropping submission while a response is in flight");
            return TurnOutcome::Ignored(IgnoreReason::FlightActive);
        }
        if text.trim().is_empty() && attachment.is_none() {
            return TurnOutcome::Ignored(IgnoreReason::EmptyInput);
        }

        let mode = state.mode();
        let policy = ModePolicy::for_mode(mode);
        // The log keeps the text as typed; only the request is trimmed.
        let prompt = text.trim().to_string();
        let user = TurnDraft::user(text, reference);

        if attachment.is_some() && !policy.allows_attachment {
            tracing::info!(mode = mode.key(), "attachment rejected by mode policy");
            let advisory = TurnDraft::ai(attachment_not_supported_message(mode));
            return match store.apply(SessionEvent::TurnAdvised { user, advisory }) {
                Ok(()) => TurnOutcome::Advised,
                Err(err) => {
                    tracing::warn!("advisory turn not recorded: {}", err);
                    TurnOutcome::Ignored(IgnoreReason::FlightActive)
                }
            };
        }

        if let Err(err) = store.apply(SessionEvent::TurnStarted { user }) {
            tracing::warn!("turn not started: {}", err);
            return TurnOutcome::Ignored(IgnoreReason::FlightActive);
        }

        let (reply, outcome) = self.run(policy.capability, &prompt, attachment).await;
        if let Err(err) = store.apply(SessionEvent::TurnResolved { reply }) {
            tracing::warn!("reply not recorded: {}", err);
        }
        outcome
    }

    async fn run(
        &self,
        capability: Capability,
        prompt: &str,
        attachment: Option<Attachment>,
    ) -> (TurnDraft, TurnOutcome) {
        let inline = match attachment {
            Some(attachment) => match attachment.encode().await {
                Ok(inline) => Some(inline),
                Err(err) => {
                    tracing::warn!("attachment unreadable: {}", err);
                    return (
                        TurnDraft::ai(attachment_failure_message(&err)),
                        TurnOutcome::Failed(FailureKind::Attachment),
                    );
                }
            },
            None => None,
        };

        tracing::debug!(?capability, with_attachment = inline.is_some(), "dispatching turn");
        let result = match capability {
            Capability::Multimodal => self.gateway.complete_multimodal(prompt, inline).await,
            Capability::SearchGrounded => self.gateway.complete_search_grounded(prompt).await,
            Capability::Lite => self.gateway.complete_lite(prompt).await,
        };

        match result {
            Ok(Completion { text, sources }) => {
                tracing::info!(?capability, sources = sources.len(), "turn answered");
                (
                    TurnDraft::ai(text).with_sources(sources),
                    TurnOutcome::Answered,
                )
            }
            Err(err) => {
                tracing::warn!(?capability, kind = ?err.kind, "turn failed: {}", err);
                let outcome = match err.kind {
                    GatewayErrorKind::MissingCredential => FailureKind::CredentialMissing,
                    GatewayErrorKind::CredentialNotRecognized => {
                        FailureKind::CredentialNotRecognized
                    }
                    _ => FailureKind::Gateway,
                };
                if err.is_credential_issue() {
                    self.reselector.reselect();
                }
                (
                    TurnDraft::ai(gateway_failure_message(&err)),
                    TurnOutcome::Failed(outcome),
                )
            }
        }
    }
}
