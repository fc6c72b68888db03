//! AI module for Parley
//!
//! This module is the boundary toward the hosted completion service. The rest
//! of the crate only sees the [`CompletionGateway`] trait and its three entry
//! points, one per capability.
//!
//! # Architecture
//!
//! - `error` - Classified gateway failures
//! - `gemini` - Gateway backed by the Gemini `generateContent` REST endpoint
//!
//! # Usage
//!
//! ```rust,no_run
//! use parley::ai::{CompletionGateway, GeminiGateway};
//! use parley::config::Config;
//! use parley::credentials::CredentialSlot;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = Config::from_env()?;
//! let gateway = GeminiGateway::new(&config, CredentialSlot::new(config.api_key.clone()));
//! let completion = gateway.complete_lite("Hello!").await?;
//! println!("{}", completion.text);
//! # Ok(())
//! # }
//! ```

mod error;
mod gemini;

pub use error::{
    CREDENTIAL_NOT_FOUND_SIGNATURE, GatewayError, GatewayErrorKind, is_credential_signature,
};
pub use gemini::GeminiGateway;

use crate::attachment::InlineData;
use crate::types::CitationSource;
use async_trait::async_trait;

pub type GatewayResult<T> = Result<T, GatewayError>;

/// Generated text plus whatever sources the service cited for it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Completion {
    pub text: String,
    pub sources: Vec<CitationSource>,
}

impl Completion {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            sources: Vec::new(),
        }
    }
}

/// One method per capability. Only the multimodal entry point accepts an
/// attachment. Implementations never retry.
#[async_trait]
pub trait CompletionGateway: Send + Sync {
    async fn complete_multimodal(
        &self,
        prompt: &str,
        attachment: Option<InlineData>,
    ) -> GatewayResult<Completion>;

    async fn complete_search_grounded(&self, prompt: &str) -> GatewayResult<Completion>;

    async fn complete_lite(&self, prompt: &str) -> GatewayResult<Completion>;
}
