//! Credential validation outcome

use serde::Serialize;

/// Validation status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValidationStatus {
    NotValidated,
    Invalid,
    Valid,
}

impl ValidationStatus {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::NotValidated => "not_validated",
            Self::Invalid => "invalid",
            Self::Valid => "valid",
        }
    }
}

/// Immutable result of validating one credential.
///
/// Caller name, groups and roles are only ever populated for
/// [`ValidationStatus::Valid`]. An unknown caller and a wrong credential both
/// produce [`ValidationResult::INVALID`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    status: ValidationStatus,
    caller_name: Option<String>,
    groups: Option<Vec<String>>,
    roles: Option<Vec<String>>,
}

impl ValidationResult {
    pub const INVALID: Self = Self::without_caller(ValidationStatus::Invalid);
    pub const NOT_VALIDATED: Self = Self::without_caller(ValidationStatus::NotValidated);

    const fn without_caller(status: ValidationStatus) -> Self {
        Self {
            status,
            caller_name: None,
            groups: None,
            roles: None,
        }
    }

    #[must_use]
    pub fn valid(
        caller_name: impl Into<String>,
        groups: Option<Vec<String>>,
        roles: Option<Vec<String>>,
    ) -> Self {
        Self {
            status: ValidationStatus::Valid,
            caller_name: Some(caller_name.into()),
            groups,
            roles,
        }
    }

    #[must_use]
    pub const fn status(&self) -> ValidationStatus {
        self.status
    }

    #[must_use]
    pub const fn is_valid(&self) -> bool {
        matches!(self.status, ValidationStatus::Valid)
    }

    #[must_use]
    pub fn caller_name(&self) -> Option<&str> {
        self.caller_name.as_deref()
    }

    #[must_use]
    pub fn groups(&self) -> Option<&[String]> {
        self.groups.as_deref()
    }

    #[must_use]
    pub fn roles(&self) -> Option<&[String]> {
        self.roles.as_deref()
    }
}
