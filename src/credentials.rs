//! API key storage shared between the gateway and the host, and the hook
//! the host provides for picking a new key.

use std::sync::{Arc, RwLock};

/// Process-wide API key. The gateway reads it on every call; only the host
/// (settings form, REPL `/key`) writes it.
#[derive(Clone, Default)]
pub struct CredentialSlot {
    key: Arc<RwLock<Option<String>>>,
}

impl CredentialSlot {
    pub fn new(key: Option<String>) -> Self {
        let slot = Self::default();
        slot.set(key);
        slot
    }

    pub fn get(&self) -> Option<String> {
        self.key.read().ok().and_then(|guard| guard.clone())
    }

    /// Blank keys clear the slot.
    pub fn set(&self, key: Option<String>) {
        let key = key
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty());
        if let Ok(mut guard) = self.key.write() {
            *guard = key;
        }
    }

    pub fn is_set(&self) -> bool {
        self.key.read().map(|guard| guard.is_some()).unwrap_or(false)
    }
}

impl std::fmt::Debug for CredentialSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialSlot")
            .field("is_set", &self.is_set())
            .finish()
    }
}

/// Asks the host to let the user choose another key. Fire and forget.
pub trait CredentialReselector: Send + Sync {
    fn reselect(&self);
}

impl<F> CredentialReselector for F
where
    F: Fn() + Send + Sync,
{
    fn reselect(&self) {
        self()
    }
}

pub struct NoReselect;

impl CredentialReselector for NoReselect {
    fn reselect(&self) {}
}
