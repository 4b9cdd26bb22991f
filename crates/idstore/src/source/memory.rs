//! In-memory identity source

use super::{CallerIter, IdentitySource};
use crate::Result;
use crate::model::CallerRecord;

/// Identity source backed by a fixed collection of caller records
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    callers: Vec<CallerRecord>,
}

impl MemorySource {
    #[must_use]
    pub fn new(callers: impl IntoIterator<Item = CallerRecord>) -> Self {
        Self {
            callers: callers.into_iter().collect(),
        }
    }

    #[must_use]
    pub fn with_caller(mut self, caller: CallerRecord) -> Self {
        self.callers.push(caller);
        self
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.callers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.callers.is_empty()
    }
}

impl IdentitySource for MemorySource {
    fn iterate(&self) -> Result<CallerIter<'_>> {
        Ok(Box::new(self.callers.iter().cloned().map(Ok)))
    }

    fn describe(&self) -> String {
        format!("memory({} callers)", self.callers.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CredentialRecord;

    fn sample_source() -> MemorySource {
        MemorySource::new([
            CallerRecord::new("jsmith")
                .with_groups(["admin", "user"])
                .with_roles(["VIEW_ACCT", "EDIT_ACCT"])
                .with_credential(CredentialRecord::new(
                    "UsernamePasswordCredential",
                    "welcome1",
                )),
            CallerRecord::new("jlee")
                .with_groups(["deployer"])
                .with_roles(["VIEW_ACCT"]),
        ])
    }

    #[test]
    fn test_iterate_yields_all_callers() {
        let source = sample_source();
        let names: Vec<String> = source
            .iterate()
            .unwrap()
            .map(|r| r.unwrap().name)
            .collect();
        assert_eq!(names, vec!["jsmith", "jlee"]);
    }

    #[test]
    fn test_iterate_restarts() {
        let source = sample_source();
        let first = source.iterate().unwrap().count();
        let second = source.iterate().unwrap().count();
        assert_eq!(first, 2);
        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_source() {
        let source = MemorySource::default();
        assert!(source.is_empty());
        assert_eq!(source.iterate().unwrap().count(), 0);
    }

    #[test]
    fn test_with_caller_and_describe() {
        let source = MemorySource::default().with_caller(CallerRecord::new("a"));
        assert_eq!(source.len(), 1);
        assert_eq!(source.describe(), "memory(1 callers)");
    }
}
