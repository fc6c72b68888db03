//! Gateway error types

use thiserror::Error;

/// Message the hosted API returns when the API key does not belong to a
/// project it knows. There is no dedicated error code for this case, so
/// classification relies on the text.
pub const CREDENTIAL_NOT_FOUND_SIGNATURE: &str = "Requested entity was not found.";

/// Gateway failure with classification
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct GatewayError {
    pub kind: GatewayErrorKind,
    pub message: String,
}

impl GatewayError {
    pub fn new(kind: GatewayErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorKind::Network, message)
    }

    pub fn auth(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorKind::Auth, message)
    }

    pub fn missing_credential(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorKind::MissingCredential, message)
    }

    pub fn credential_not_recognized(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorKind::CredentialNotRecognized, message)
    }

    pub fn rate_limit(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorKind::RateLimit, message)
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorKind::InvalidRequest, message)
    }

    pub fn server_error(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorKind::ServerError, message)
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorKind::MalformedResponse, message)
    }

    pub fn unknown(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorKind::Unknown, message)
    }

    /// Unknown-kind error whose text still gets checked for the credential
    /// signature, for failures that did not come from an HTTP status.
    pub fn from_message(message: impl Into<String>) -> Self {
        let message = message.into();
        let kind = if is_credential_signature(&message) {
            GatewayErrorKind::CredentialNotRecognized
        } else {
            GatewayErrorKind::Unknown
        };
        Self::new(kind, message)
    }

    /// Either kind of key problem; both call for a new key.
    pub fn is_credential_issue(&self) -> bool {
        matches!(
            self.kind,
            GatewayErrorKind::MissingCredential | GatewayErrorKind::CredentialNotRecognized
        )
    }
}

pub fn is_credential_signature(message: &str) -> bool {
    message.contains(CREDENTIAL_NOT_FOUND_SIGNATURE)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayErrorKind {
    /// Connection failures, timeouts, unreadable bodies
    Network,
    /// 401/403
    Auth,
    /// No key has been configured; nothing was sent
    MissingCredential,
    /// Key unknown to the service
    CredentialNotRecognized,
    /// 429
    RateLimit,
    /// 400
    InvalidRequest,
    /// 5xx
    ServerError,
    /// 2xx whose body could not be used
    MalformedResponse,
    Unknown,
}
