//! Identity cache
//!
//! [`IdentityCache`] holds the active [`Snapshot`] behind an
//! [`ArcSwapOption`]. Readers load the current snapshot without locking and
//! keep using it for as long as they hold the `Arc`, so a reader sees either
//! the old or the new snapshot, never a mix.
//!
//! Loads build the replacement snapshot off to the side and publish it with
//! a single swap. Loads are serialized by a mutex; a reload that arrives
//! while another is running waits for it to finish and then runs.
//!
//! # Example
//!
//! ```ignore
//! use idstore::{IdentityCache, JsonFileSource, USERNAME_PASSWORD};
//!
//! let cache = IdentityCache::new();
//! cache.load(JsonFileSource::new("callers.json"))?;
//!
//! let result = cache.validate(Some("jsmith"), USERNAME_PASSWORD, "welcome1")?;
//! assert!(result.is_valid());
//! ```

mod membership;
mod snapshot;
mod stats;

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use arc_swap::ArcSwapOption;
pub use membership::{has_role, is_member};
use parking_lot::Mutex;
pub use snapshot::{Snapshot, SnapshotBuilder};
pub use stats::{CacheStats, LoadReport};

use crate::credential::{USERNAME_PASSWORD, ValidationResult};
use crate::source::IdentitySource;
use crate::store::IdentityStore;
use crate::{Error, Result, validator};

/// Store kind reported by [`IdentityCache`]
pub const STORE_KIND: &str = "cached";

/// Read-mostly identity cache with atomic snapshot replacement
pub struct IdentityCache {
    current: ArcSwapOption<Snapshot>,
    /// Remembered source; the lock also serializes loads
    source: Mutex<Option<Arc<dyn IdentitySource>>>,
    loads: AtomicU64,
    failed_loads: AtomicU64,
}

impl std::fmt::Debug for IdentityCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityCache")
            .field(
                "generation",
                &self.current.load().as_ref().map(|s| s.generation()),
            )
            .field("loads", &self.loads.load(Ordering::Relaxed))
            .field("failed_loads", &self.failed_loads.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

impl Default for IdentityCache {
    fn default() -> Self {
        Self::new()
    }
}

impl IdentityCache {
    #[must_use]
    pub fn new() -> Self {
        Self {
            current: ArcSwapOption::empty(),
            source: Mutex::new(None),
            loads: AtomicU64::new(0),
            failed_loads: AtomicU64::new(0),
        }
    }

    /// Create an uninitialized cache that reloads from `source`
    #[must_use]
    pub fn with_source(source: impl IdentitySource + 'static) -> Self {
        let cache = Self::new();
        *cache.source.lock() = Some(Arc::new(source));
        cache
    }

    /// Load a new snapshot from `source`.
    ///
    /// On success `source` becomes the source used by [`Self::reload`]. On
    /// failure the previous snapshot and source stay active.
    pub fn load(&self, source: impl IdentitySource + 'static) -> Result<LoadReport> {
        self.load_shared(Arc::new(source))
    }

    /// Same as [`Self::load`] for a source that is already shared
    pub fn load_shared(&self, source: Arc<dyn IdentitySource>) -> Result<LoadReport> {
        let mut remembered = self.source.lock();
        let report = self.load_locked(source.as_ref())?;
        *remembered = Some(source);
        Ok(report)
    }

    /// Reload from the remembered source
    pub fn reload(&self) -> Result<LoadReport> {
        let remembered = self.source.lock();
        let Some(source) = remembered.as_ref() else {
            return Err(Error::Config("No identity source configured".into()));
        };
        self.load_locked(source.as_ref())
    }

    fn load_locked(&self, source: &dyn IdentitySource) -> Result<LoadReport> {
        let started = Instant::now();
        let label = source.describe();
        let generation = self
            .current
            .load()
            .as_ref()
            .map_or(1, |s| s.generation() + 1);

        let outcome = build_snapshot(source, generation);

        #[cfg(feature = "metrics")]
        crate::observability::record_reload(outcome.is_ok(), started.elapsed());

        match outcome {
            Ok(snapshot) => {
                let report = snapshot.report();
                self.current.store(Some(Arc::new(snapshot)));
                self.loads.fetch_add(1, Ordering::Relaxed);

                #[cfg(feature = "metrics")]
                crate::observability::set_snapshot_size(report.callers, report.groups, report.roles);

                tracing::info!(
                    source = %label,
                    generation = report.generation,
                    callers = report.callers,
                    groups = report.groups,
                    roles = report.roles,
                    skipped = report.skipped,
                    elapsed_ms = started.elapsed().as_millis(),
                    "Identity snapshot published"
                );
                Ok(report)
            }
            Err(e) => {
                self.failed_loads.fetch_add(1, Ordering::Relaxed);
                tracing::warn!(source = %label, error = %e, "Identity load failed, keeping previous snapshot");
                Err(e)
            }
        }
    }

    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.current.load().is_some()
    }

    /// Current snapshot, for several queries against one consistent view
    pub fn snapshot(&self) -> Result<Arc<Snapshot>> {
        self.current.load_full().ok_or(Error::NotInitialized)
    }

    fn with_snapshot<R>(&self, f: impl FnOnce(&Snapshot) -> R) -> Result<R> {
        let guard = self.current.load();
        let snapshot = guard.as_ref().ok_or(Error::NotInitialized)?;
        Ok(f(snapshot))
    }

    #[must_use]
    pub fn stats(&self) -> CacheStats {
        let guard = self.current.load();
        let snapshot = guard.as_ref();
        CacheStats {
            loads: self.loads.load(Ordering::Relaxed),
            failed_loads: self.failed_loads.load(Ordering::Relaxed),
            generation: snapshot.map(|s| s.generation()),
            callers: snapshot.map_or(0, |s| s.callers().len()),
            groups: snapshot.map_or(0, |s| s.groups().len()),
            roles: snapshot.map_or(0, |s| s.roles().len()),
            last_loaded: snapshot.map(|s| s.loaded_at()),
        }
    }

    /// Groups of `caller`; `None` if unknown or not supplied by the source
    pub fn caller_groups(&self, caller: &str) -> Result<Option<Vec<String>>> {
        self.with_snapshot(|s| s.caller_groups(caller).map(<[String]>::to_vec))
    }

    /// Roles of `caller`; `None` if unknown or not supplied by the source
    pub fn caller_roles(&self, caller: &str) -> Result<Option<Vec<String>>> {
        self.with_snapshot(|s| s.caller_roles(caller).map(<[String]>::to_vec))
    }

    /// Roles of `caller`, optionally including roles granted through groups.
    ///
    /// Group-to-role resolution is not supported; `include_group_roles`
    /// returns `None`.
    pub fn caller_roles_including(
        &self,
        caller: &str,
        include_group_roles: bool,
    ) -> Result<Option<Vec<String>>> {
        let roles = self.caller_roles(caller)?;
        Ok(if include_group_roles { None } else { roles })
    }

    pub fn caller_attributes(&self, caller: &str) -> Result<Option<HashMap<String, String>>> {
        self.with_snapshot(|s| s.caller_attributes(caller).cloned())
    }

    /// Caller names matching `pattern`.
    ///
    /// Only the match-all pattern (absent or empty) is supported; any other
    /// pattern returns `None`.
    pub fn callers(&self, pattern: Option<&str>) -> Result<Option<BTreeSet<String>>> {
        self.with_snapshot(|s| match_all(pattern).then(|| s.callers().clone()))
    }

    /// Group names matching `pattern`, with the same contract as [`Self::callers`]
    pub fn groups(&self, pattern: Option<&str>) -> Result<Option<BTreeSet<String>>> {
        self.with_snapshot(|s| match_all(pattern).then(|| s.groups().clone()))
    }

    /// Role names matching `pattern`, with the same contract as [`Self::callers`]
    pub fn roles(&self, pattern: Option<&str>) -> Result<Option<BTreeSet<String>>> {
        self.with_snapshot(|s| match_all(pattern).then(|| s.roles().clone()))
    }

    /// Roles assigned to at least one caller or group.
    ///
    /// Every known role is held by some caller, so this equals
    /// [`Self::roles`] and shares its pattern contract.
    pub fn assigned_roles(&self, pattern: Option<&str>) -> Result<Option<BTreeSet<String>>> {
        self.roles(pattern)
    }

    /// Roles assigned to neither a caller nor a group.
    ///
    /// Role names are only learned from caller records, so no role can be
    /// told apart as unassigned; the full role set is returned under the same
    /// pattern contract as [`Self::roles`].
    pub fn unassigned_roles(&self, pattern: Option<&str>) -> Result<Option<BTreeSet<String>>> {
        self.roles(pattern)
    }

    /// Members of `group` in first-observed order; empty if unknown
    pub fn callers_in_group(&self, group: &str) -> Result<Vec<String>> {
        self.with_snapshot(|s| s.callers_in_group(group).to_vec())
    }

    /// Holders of `role` in first-observed order.
    ///
    /// `include_group_roles` is not supported and returns `None`. An unknown
    /// role returns an empty list.
    pub fn callers_with_role(
        &self,
        role: &str,
        include_group_roles: bool,
    ) -> Result<Option<Vec<String>>> {
        self.with_snapshot(|s| (!include_group_roles).then(|| s.callers_with_role(role).to_vec()))
    }

    /// Validate a presented credential of kind `kind` for `caller`
    pub fn validate(
        &self,
        caller: Option<&str>,
        kind: &str,
        raw: &str,
    ) -> Result<ValidationResult> {
        let result = self.with_snapshot(|s| validator::validate(s, caller, kind, raw))??;
        record_outcome(&result);
        Ok(result)
    }

    /// Validate a binary credential; the bytes are compared in base64 form
    pub fn validate_bytes(
        &self,
        caller: Option<&str>,
        kind: &str,
        raw: &[u8],
    ) -> Result<ValidationResult> {
        let result = self.with_snapshot(|s| validator::validate_bytes(s, caller, kind, raw))??;
        record_outcome(&result);
        Ok(result)
    }
}

impl IdentityStore for IdentityCache {
    fn store_kind(&self) -> &str {
        STORE_KIND
    }

    fn validate_credential(
        &self,
        caller: Option<&str>,
        kind: &str,
        raw: &str,
    ) -> Result<ValidationResult> {
        self.validate(caller, kind, raw)
    }

    fn validate_username_password(
        &self,
        caller: Option<&str>,
        password: &str,
    ) -> Result<ValidationResult> {
        self.validate(caller, USERNAME_PASSWORD, password)
    }
}

fn match_all(pattern: Option<&str>) -> bool {
    pattern.is_none_or(str::is_empty)
}

fn build_snapshot(source: &dyn IdentitySource, generation: u64) -> Result<Snapshot> {
    let mut builder = SnapshotBuilder::new();
    for record in source.iterate()? {
        builder.add(record?);
    }
    Ok(builder.build(generation))
}

fn record_outcome(result: &ValidationResult) {
    tracing::debug!(
        status = result.status().as_str(),
        caller = result.caller_name(),
        "Credential validated"
    );

    #[cfg(feature = "metrics")]
    crate::observability::record_validation(result.status().as_str());
}
