//! Caller and credential records as ingested from an identity source

use std::collections::HashMap;

/// A stored credential for one caller.
///
/// `value` holds either the plaintext credential or, when `hash_algorithm` is
/// set, the lowercase hex digest of `raw + hash_salt`.
#[derive(Clone, PartialEq, Eq)]
pub struct CredentialRecord {
    /// Credential kind tag, e.g. `UsernamePasswordCredential`
    pub kind: String,
    pub value: String,
    pub hash_algorithm: Option<String>,
    pub hash_salt: Option<String>,
    pub attributes: HashMap<String, String>,
}

// Stored values and salts stay out of logs
impl std::fmt::Debug for CredentialRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialRecord")
            .field("kind", &self.kind)
            .field("hash_algorithm", &self.hash_algorithm)
            .field("attributes", &self.attributes)
            .finish_non_exhaustive()
    }
}

impl CredentialRecord {
    #[must_use]
    pub fn new(kind: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            value: value.into(),
            hash_algorithm: None,
            hash_salt: None,
            attributes: HashMap::new(),
        }
    }

    #[must_use]
    pub fn with_hash(mut self, algorithm: impl Into<String>, salt: Option<String>) -> Self {
        self.hash_algorithm = Some(algorithm.into());
        self.hash_salt = salt;
        self
    }

    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Hash algorithm, treating an empty string as absent
    #[must_use]
    pub fn algorithm(&self) -> Option<&str> {
        self.hash_algorithm.as_deref().filter(|s| !s.is_empty())
    }

    /// Hash salt, treating an empty string as absent
    #[must_use]
    pub fn salt(&self) -> Option<&str> {
        self.hash_salt.as_deref().filter(|s| !s.is_empty())
    }
}

/// One caller as supplied by an identity source.
///
/// `groups` and `roles` are `None` when the source does not supply them,
/// which is distinct from an empty list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerRecord {
    pub name: String,
    pub groups: Option<Vec<String>>,
    pub roles: Option<Vec<String>>,
    pub credentials: Vec<CredentialRecord>,
    pub attributes: HashMap<String, String>,
}

impl CallerRecord {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            groups: None,
            roles: None,
            credentials: Vec::new(),
            attributes: HashMap::new(),
        }
    }

    #[must_use]
    pub fn with_groups<I, S>(mut self, groups: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.groups = Some(groups.into_iter().map(Into::into).collect());
        self
    }

    #[must_use]
    pub fn with_roles<I, S>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.roles = Some(roles.into_iter().map(Into::into).collect());
        self
    }

    #[must_use]
    pub fn with_credential(mut self, credential: CredentialRecord) -> Self {
        self.credentials.push(credential);
        self
    }

    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_caller_record_builder() {
        let caller = CallerRecord::new("jsmith")
            .with_groups(["admin", "user"])
            .with_roles(["VIEW_ACCT"])
            .with_credential(CredentialRecord::new("UsernamePasswordCredential", "welcome1"))
            .with_attribute("locked", "true");

        assert_eq!(caller.name, "jsmith");
        assert_eq!(caller.groups, Some(vec!["admin".into(), "user".into()]));
        assert_eq!(caller.roles, Some(vec!["VIEW_ACCT".into()]));
        assert_eq!(caller.credentials.len(), 1);
        assert_eq!(caller.attributes.get("locked").map(String::as_str), Some("true"));
    }

    #[test]
    fn test_absent_groups_distinct_from_empty() {
        let absent = CallerRecord::new("a");
        let empty = CallerRecord::new("b").with_groups(Vec::<String>::new());
        assert!(absent.groups.is_none());
        assert_eq!(empty.groups, Some(vec![]));
    }

    #[test]
    fn test_empty_algorithm_and_salt_are_absent() {
        let cred = CredentialRecord::new("UsernamePasswordCredential", "x")
            .with_hash("", Some(String::new()));
        assert!(cred.algorithm().is_none());
        assert!(cred.salt().is_none());

        let cred = cred.with_hash("SHA-256", Some("NaCl".to_string()));
        assert_eq!(cred.algorithm(), Some("SHA-256"));
        assert_eq!(cred.salt(), Some("NaCl"));
    }

    #[test]
    fn test_credential_debug_redacts_value() {
        let cred = CredentialRecord::new("UsernamePasswordCredential", "welcome1")
            .with_hash("SHA-256", Some("NaCl".to_string()));
        let debug_str = format!("{cred:?}");
        assert!(debug_str.contains("UsernamePasswordCredential"));
        assert!(!debug_str.contains("welcome1"));
        assert!(!debug_str.contains("NaCl"));
    }
}
