//! Identity stores and credential dispatch

use std::sync::Arc;

use crate::Result;
use crate::credential::{Credential, USERNAME_PASSWORD, ValidationResult};
use crate::registry::ValidatorRegistry;

/// A store that can validate credentials
pub trait IdentityStore: Send + Sync + std::fmt::Debug {
    /// Store kind used as the second half of registry keys
    fn store_kind(&self) -> &str;

    /// Validate a raw credential value of kind `kind` for `caller`
    fn validate_credential(
        &self,
        caller: Option<&str>,
        kind: &str,
        raw: &str,
    ) -> Result<ValidationResult>;

    fn validate_username_password(
        &self,
        caller: Option<&str>,
        password: &str,
    ) -> Result<ValidationResult> {
        self.validate_credential(caller, USERNAME_PASSWORD, password)
    }
}

/// Routes presented credentials to the right validation path.
///
/// A handler registered for the credential's kind and the store's kind takes
/// precedence. Otherwise credentials exposing a username/password go through
/// [`IdentityStore::validate_username_password`], and anything else is
/// reported as [`ValidationResult::NOT_VALIDATED`].
#[derive(Debug)]
pub struct Authenticator {
    store: Arc<dyn IdentityStore>,
    registry: ValidatorRegistry,
}

impl Authenticator {
    #[must_use]
    pub fn new(store: Arc<dyn IdentityStore>) -> Self {
        Self::with_registry(store, ValidatorRegistry::new())
    }

    #[must_use]
    pub fn with_registry(store: Arc<dyn IdentityStore>, registry: ValidatorRegistry) -> Self {
        Self { store, registry }
    }

    #[must_use]
    pub fn store(&self) -> &Arc<dyn IdentityStore> {
        &self.store
    }

    #[must_use]
    pub const fn registry(&self) -> &ValidatorRegistry {
        &self.registry
    }

    pub fn validate(&self, credential: &dyn Credential) -> Result<ValidationResult> {
        let kind = credential.kind();
        let store_kind = self.store.store_kind();

        if let Some(handler) = self.registry.lookup(kind, store_kind) {
            tracing::debug!(credential = kind, store = store_kind, "Dispatching to registered handler");
            return handler.validate(credential, self.store.as_ref());
        }

        if let Some(pair) = credential.as_username_password() {
            if !credential.is_valid() {
                return Ok(ValidationResult::INVALID);
            }
            return self
                .store
                .validate_username_password(pair.caller, pair.password);
        }

        tracing::debug!(credential = kind, store = store_kind, "No validation path for credential");
        Ok(ValidationResult::NOT_VALIDATED)
    }
}
