//! Cached identity store with salted-digest credential validation

pub mod cache;
pub mod config;
pub mod credential;
mod error;
pub mod model;
pub mod observability;
pub mod registry;
pub mod reload;
pub mod source;
pub mod store;
pub mod validator;

pub use cache::{
    CacheStats, IdentityCache, LoadReport, STORE_KIND, Snapshot, SnapshotBuilder, has_role,
    is_member,
};
pub use config::{Config, ConfigBuilder, TelemetryConfig};
pub use credential::{
    BASIC_AUTHENTICATION, BasicAuthenticationCredential, Credential, HashAlgorithm, HashError,
    TOKEN, TokenCredential, USERNAME_PASSWORD, UsernamePasswordCredential, ValidationResult,
    ValidationStatus,
};
pub use error::{Error, Result};
pub use model::{CallerRecord, CredentialRecord};
pub use registry::{CredentialHandler, TokenHandler, ValidatorRegistry};
pub use reload::ReloadTask;
pub use source::{CallerIter, IdentitySource, JsonFileSource, MemorySource};
pub use store::{Authenticator, IdentityStore};
