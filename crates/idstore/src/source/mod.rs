//! Identity sources feeding the cache
//!
//! A source produces the entire identity universe as a finite sequence of
//! [`CallerRecord`]s. Every call to [`IdentitySource::iterate`] starts over
//! from the beginning, so the same source can back any number of reloads.
//!
//! # Available Sources
//!
//! - [`MemorySource`] - Fixed in-memory collection
//! - [`JsonFileSource`] - JSON document on disk, re-read on every iteration

mod json;
mod memory;

pub use json::JsonFileSource;
pub use memory::MemorySource;

use crate::Result;
use crate::model::CallerRecord;

/// Lazy sequence of caller records.
///
/// An `Err` item aborts the load that is consuming the sequence.
pub type CallerIter<'a> = Box<dyn Iterator<Item = Result<CallerRecord>> + Send + 'a>;

/// Supplier of caller records
pub trait IdentitySource: Send + Sync + std::fmt::Debug {
    /// Start a fresh pass over all callers
    fn iterate(&self) -> Result<CallerIter<'_>>;

    /// Short label used in log fields
    fn describe(&self) -> String;
}
