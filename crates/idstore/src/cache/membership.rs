//! Membership checks over a snapshot

use super::snapshot::Snapshot;

/// Whether `caller` lists `group` among its groups
#[must_use]
pub fn is_member(snapshot: &Snapshot, caller: &str, group: &str) -> bool {
    snapshot
        .caller_groups(caller)
        .is_some_and(|groups| groups.iter().any(|g| g == group))
}

/// Whether `caller` directly holds `role`
#[must_use]
pub fn has_role(snapshot: &Snapshot, caller: &str, role: &str) -> bool {
    snapshot
        .caller_roles(caller)
        .is_some_and(|roles| roles.iter().any(|r| r == role))
}
