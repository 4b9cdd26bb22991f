//! Credential types, hashing and validation results
//!
//! # Modules
//!
//! - [`hasher`] - Salted digest preparation and constant-time comparison
//! - [`ValidationResult`] - Outcome of a validation
//! - [`Credential`] - Presented credentials and their kind tags

pub mod hasher;
mod result;
mod types;

pub use hasher::{HashAlgorithm, HashError};
pub use result::{ValidationResult, ValidationStatus};
pub use types::{
    BASIC_AUTHENTICATION, BasicAuthenticationCredential, Credential, TOKEN, TokenCredential,
    USERNAME_PASSWORD, UsernamePassword, UsernamePasswordCredential,
};
