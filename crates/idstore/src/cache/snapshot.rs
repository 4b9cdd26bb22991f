//! Immutable identity snapshot
//!
//! A [`Snapshot`] holds the forward maps read from a source plus the derived
//! group→callers and role→callers maps. The derived maps are only ever built
//! by [`SnapshotBuilder::build`], together with the forward maps they invert.

use std::collections::{BTreeSet, HashMap};
use std::time::SystemTime;

use super::stats::LoadReport;
use crate::model::{CallerRecord, CredentialRecord};

#[derive(Debug)]
pub struct Snapshot {
    generation: u64,
    loaded_at: SystemTime,
    skipped: usize,
    /// Caller names in load order
    order: Vec<String>,
    callers: BTreeSet<String>,
    groups: BTreeSet<String>,
    roles: BTreeSet<String>,
    caller_groups: HashMap<String, Vec<String>>,
    caller_roles: HashMap<String, Vec<String>>,
    caller_credentials: HashMap<String, Vec<CredentialRecord>>,
    caller_attributes: HashMap<String, HashMap<String, String>>,
    group_callers: HashMap<String, Vec<String>>,
    role_callers: HashMap<String, Vec<String>>,
}

impl Snapshot {
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    #[must_use]
    pub const fn loaded_at(&self) -> SystemTime {
        self.loaded_at
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    #[must_use]
    pub fn contains_caller(&self, name: &str) -> bool {
        self.callers.contains(name)
    }

    /// Caller names in the order the source produced them
    pub fn caller_names(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    #[must_use]
    pub const fn callers(&self) -> &BTreeSet<String> {
        &self.callers
    }

    #[must_use]
    pub const fn groups(&self) -> &BTreeSet<String> {
        &self.groups
    }

    #[must_use]
    pub const fn roles(&self) -> &BTreeSet<String> {
        &self.roles
    }

    /// Groups of `caller`; `None` if unknown or the source supplied no groups
    #[must_use]
    pub fn caller_groups(&self, caller: &str) -> Option<&[String]> {
        self.caller_groups.get(caller).map(Vec::as_slice)
    }

    /// Roles of `caller`; `None` if unknown or the source supplied no roles
    #[must_use]
    pub fn caller_roles(&self, caller: &str) -> Option<&[String]> {
        self.caller_roles.get(caller).map(Vec::as_slice)
    }

    #[must_use]
    pub fn caller_credentials(&self, caller: &str) -> Option<&[CredentialRecord]> {
        self.caller_credentials.get(caller).map(Vec::as_slice)
    }

    #[must_use]
    pub fn caller_attributes(&self, caller: &str) -> Option<&HashMap<String, String>> {
        self.caller_attributes.get(caller)
    }

    /// Members of `group` in first-observed order; empty if unknown
    #[must_use]
    pub fn callers_in_group(&self, group: &str) -> &[String] {
        self.group_callers.get(group).map_or(&[], Vec::as_slice)
    }

    /// Holders of `role` in first-observed order; empty if unknown
    #[must_use]
    pub fn callers_with_role(&self, role: &str) -> &[String] {
        self.role_callers.get(role).map_or(&[], Vec::as_slice)
    }

    #[must_use]
    pub fn report(&self) -> LoadReport {
        LoadReport {
            generation: self.generation,
            callers: self.callers.len(),
            groups: self.groups.len(),
            roles: self.roles.len(),
            skipped: self.skipped,
        }
    }
}

/// Accumulates caller records for a new [`Snapshot`]
#[derive(Debug, Default)]
pub struct SnapshotBuilder {
    order: Vec<String>,
    records: HashMap<String, CallerRecord>,
    skipped: usize,
}

impl SnapshotBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one caller record.
    ///
    /// Records with an empty name are skipped. A repeated name replaces the
    /// earlier record's data but keeps its position.
    pub fn add(&mut self, record: CallerRecord) {
        if record.name.is_empty() {
            tracing::warn!("Skipping caller record with empty name");
            self.skipped += 1;
            return;
        }

        if self.records.contains_key(&record.name) {
            tracing::warn!(caller = %record.name, "Duplicate caller record replaces earlier entry");
        } else {
            self.order.push(record.name.clone());
        }

        self.records.insert(record.name.clone(), record);
    }

    #[must_use]
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    #[must_use]
    pub fn build(mut self, generation: u64) -> Snapshot {
        let mut snapshot = Snapshot {
            generation,
            loaded_at: SystemTime::now(),
            skipped: self.skipped,
            order: Vec::with_capacity(self.order.len()),
            callers: BTreeSet::new(),
            groups: BTreeSet::new(),
            roles: BTreeSet::new(),
            caller_groups: HashMap::new(),
            caller_roles: HashMap::new(),
            caller_credentials: HashMap::with_capacity(self.order.len()),
            caller_attributes: HashMap::with_capacity(self.order.len()),
            group_callers: HashMap::new(),
            role_callers: HashMap::new(),
        };

        for name in std::mem::take(&mut self.order) {
            let Some(record) = self.records.remove(&name) else {
                continue;
            };

            if let Some(groups) = record.groups {
                invert(&name, &groups, &mut snapshot.group_callers, &mut snapshot.groups);
                snapshot.caller_groups.insert(name.clone(), groups);
            }

            if let Some(roles) = record.roles {
                invert(&name, &roles, &mut snapshot.role_callers, &mut snapshot.roles);
                snapshot.caller_roles.insert(name.clone(), roles);
            }

            snapshot
                .caller_credentials
                .insert(name.clone(), record.credentials);
            snapshot
                .caller_attributes
                .insert(name.clone(), record.attributes);
            snapshot.callers.insert(name.clone());
            snapshot.order.push(name);
        }

        snapshot
    }
}

/// Record `caller` once under each of `names` in `index`.
///
/// Callers are visited one at a time, so a caller already recorded for a name
/// is always the last element of that name's list.
fn invert(
    caller: &str,
    names: &[String],
    index: &mut HashMap<String, Vec<String>>,
    all: &mut BTreeSet<String>,
) {
    for name in names {
        let members = index.entry(name.clone()).or_default();
        if members.last().map(String::as_str) != Some(caller) {
            members.push(caller.to_string());
        }
        all.insert(name.clone());
    }
}
