//! Credential handler registry
//!
//! Handlers are keyed by the pair (credential kind, store kind). At most one
//! handler may exist per pair; a second registration is rejected instead of
//! being resolved at validation time.

use std::collections::HashMap;
use std::sync::Arc;

use crate::credential::{Credential, TOKEN, ValidationResult};
use crate::store::IdentityStore;
use crate::{Error, Result};

/// Validates one kind of credential against one kind of store
pub trait CredentialHandler: Send + Sync {
    fn validate(
        &self,
        credential: &dyn Credential,
        store: &dyn IdentityStore,
    ) -> Result<ValidationResult>;
}

impl<F> CredentialHandler for F
where
    F: Fn(&dyn Credential, &dyn IdentityStore) -> Result<ValidationResult> + Send + Sync,
{
    fn validate(
        &self,
        credential: &dyn Credential,
        store: &dyn IdentityStore,
    ) -> Result<ValidationResult> {
        self(credential, store)
    }
}

/// Validates token credentials against stored `TokenCredential` records
#[derive(Debug, Clone, Copy, Default)]
pub struct TokenHandler;

impl CredentialHandler for TokenHandler {
    fn validate(
        &self,
        credential: &dyn Credential,
        store: &dyn IdentityStore,
    ) -> Result<ValidationResult> {
        let Some(token) = credential.as_token() else {
            return Ok(ValidationResult::NOT_VALIDATED);
        };
        store.validate_credential(credential.caller(), TOKEN, token)
    }
}

#[derive(Default)]
pub struct ValidatorRegistry {
    handlers: HashMap<(String, String), Arc<dyn CredentialHandler>>,
}

impl std::fmt::Debug for ValidatorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut keys: Vec<_> = self.handlers.keys().collect();
        keys.sort();
        f.debug_struct("ValidatorRegistry")
            .field("handlers", &keys)
            .finish()
    }
}

impl ValidatorRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for credentials of kind `credential` on stores of
    /// kind `store`.
    ///
    /// Fails with [`Error::AmbiguousValidator`] if the pair already has a
    /// handler.
    pub fn register(
        &mut self,
        credential: impl Into<String>,
        store: impl Into<String>,
        handler: Arc<dyn CredentialHandler>,
    ) -> Result<()> {
        let key = (credential.into(), store.into());
        if self.handlers.contains_key(&key) {
            let (credential, store) = key;
            return Err(Error::AmbiguousValidator { credential, store });
        }

        tracing::debug!(credential = %key.0, store = %key.1, "Registered credential handler");
        self.handlers.insert(key, handler);
        Ok(())
    }

    /// Register a closure as a handler
    pub fn register_fn<F>(
        &mut self,
        credential: impl Into<String>,
        store: impl Into<String>,
        handler: F,
    ) -> Result<()>
    where
        F: Fn(&dyn Credential, &dyn IdentityStore) -> Result<ValidationResult>
            + Send
            + Sync
            + 'static,
    {
        self.register(credential, store, Arc::new(handler))
    }

    #[must_use]
    pub fn lookup(&self, credential: &str, store: &str) -> Option<&Arc<dyn CredentialHandler>> {
        self.handlers
            .get(&(credential.to_string(), store.to_string()))
    }

    #[must_use]
    pub fn contains(&self, credential: &str, store: &str) -> bool {
        self.lookup(credential, store).is_some()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}
