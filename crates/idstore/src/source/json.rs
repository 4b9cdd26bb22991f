//! JSON file identity source
//!
//! Document layout:
//!
//! ```json
//! {
//!   "callers": [
//!     {
//!       "name": "jsmith",
//!       "groups": ["admin", "user"],
//!       "roles": ["VIEW_ACCT"],
//!       "credentials": [
//!         {
//!           "type": "UsernamePasswordCredential",
//!           "value": "70a5b4...",
//!           "hash-algorithm": "SHA-256",
//!           "hash-salt": "NaCl",
//!           "attributes": [{ "name": "expires", "value": "never" }]
//!         }
//!       ],
//!       "attributes": [{ "name": "locked", "value": "false" }]
//!     }
//!   ]
//! }
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::Value;

use super::{CallerIter, IdentitySource};
use crate::model::{CallerRecord, CredentialRecord};
use crate::{Error, Result};

/// Identity source reading a JSON document from disk.
///
/// The file is read and parsed on every [`IdentitySource::iterate`] call, so
/// edits become visible on the next reload.
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Parse a JSON identity document held in memory.
    ///
    /// Entries that cannot be turned into a caller are skipped with a warning.
    pub fn parse_document(content: &str) -> Result<Vec<CallerRecord>> {
        let entries = parse_entries(content, "<memory>")?;
        entries_iter(entries, "<memory>".to_string()).collect()
    }
}

impl IdentitySource for JsonFileSource {
    fn iterate(&self) -> Result<CallerIter<'_>> {
        let label = self.path.display().to_string();
        let content = std::fs::read_to_string(&self.path).map_err(|e| {
            Error::SourceRead(format!("Failed to read identity file {label}: {e}"))
        })?;

        let entries = parse_entries(&content, &label)?;
        tracing::debug!(source = %label, entries = entries.len(), "Parsed identity document");

        Ok(Box::new(entries_iter(entries, label)))
    }

    fn describe(&self) -> String {
        format!("json({})", self.path.display())
    }
}

fn parse_entries(content: &str, label: &str) -> Result<Vec<Value>> {
    let document: Value = serde_json::from_str(content).map_err(|e| {
        Error::SourceRead(format!("Failed to parse identity file {label}: {e}"))
    })?;

    let Value::Object(mut root) = document else {
        return Err(Error::SourceRead(format!(
            "Bad schema for identity file {label}: expected a top-level object"
        )));
    };

    match root.remove("callers") {
        None | Some(Value::Null) => {
            tracing::warn!(source = label, "Identity document has no callers array");
            Ok(Vec::new())
        }
        Some(Value::Array(entries)) => Ok(entries),
        Some(_) => Err(Error::SourceRead(format!(
            "Bad schema for identity file {label}: \"callers\" must be an array"
        ))),
    }
}

fn entries_iter(
    entries: Vec<Value>,
    label: String,
) -> impl Iterator<Item = Result<CallerRecord>> + Send {
    entries
        .into_iter()
        .enumerate()
        .filter_map(move |(index, entry)| caller_from_entry(index, entry, &label).map(Ok))
}

fn caller_from_entry(index: usize, entry: Value, label: &str) -> Option<CallerRecord> {
    let entry: CallerEntry = match serde_json::from_value(entry) {
        Ok(entry) => entry,
        Err(e) => {
            tracing::warn!(source = label, index, error = %e, "Skipping malformed caller entry");
            return None;
        }
    };

    let Some(name) = entry.name.filter(|n| !n.is_empty()) else {
        tracing::warn!(source = label, index, "Skipping caller entry without a name");
        return None;
    };

    let credentials = entry
        .credentials
        .unwrap_or_default()
        .into_iter()
        .flatten()
        .filter_map(|c| credential_from_entry(c, &name, label))
        .collect();

    Some(CallerRecord {
        groups: entry.groups.map(strings),
        roles: entry.roles.map(strings),
        credentials,
        attributes: attributes(entry.attributes),
        name,
    })
}

fn credential_from_entry(
    entry: CredentialEntry,
    caller: &str,
    label: &str,
) -> Option<CredentialRecord> {
    let (Some(kind), Some(value)) = (entry.kind, entry.value) else {
        tracing::warn!(
            source = label,
            caller,
            "Skipping credential without type or value"
        );
        return None;
    };

    Some(CredentialRecord {
        kind,
        value,
        hash_algorithm: entry.hash_algorithm,
        hash_salt: entry.hash_salt,
        attributes: attributes(entry.attributes),
    })
}

fn strings(values: Vec<Option<String>>) -> Vec<String> {
    values.into_iter().flatten().collect()
}

fn attributes(entries: Option<Vec<Option<AttributeEntry>>>) -> HashMap<String, String> {
    entries
        .unwrap_or_default()
        .into_iter()
        .flatten()
        .filter_map(|a| Some((a.name?, a.value?)))
        .collect()
}

#[derive(Debug, Deserialize)]
struct CallerEntry {
    name: Option<String>,
    groups: Option<Vec<Option<String>>>,
    roles: Option<Vec<Option<String>>>,
    credentials: Option<Vec<Option<CredentialEntry>>>,
    attributes: Option<Vec<Option<AttributeEntry>>>,
}

#[derive(Debug, Deserialize)]
struct CredentialEntry {
    #[serde(rename = "type")]
    kind: Option<String>,
    value: Option<String>,
    #[serde(rename = "hash-algorithm")]
    hash_algorithm: Option<String>,
    #[serde(rename = "hash-salt")]
    hash_salt: Option<String>,
    attributes: Option<Vec<Option<AttributeEntry>>>,
}

#[derive(Debug, Deserialize)]
struct AttributeEntry {
    name: Option<String>,
    value: Option<String>,
}
