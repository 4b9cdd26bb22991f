//! Credential validation against a snapshot

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::cache::Snapshot;
use crate::credential::{ValidationResult, hasher};
use crate::{Error, Result};

/// Validate a presented credential against the stored records of `caller`.
///
/// Unknown callers and wrong credentials both yield
/// [`ValidationResult::INVALID`]. The first stored record of the matching
/// kind whose prepared value equals the stored value wins.
pub fn validate(
    snapshot: &Snapshot,
    caller: Option<&str>,
    kind: &str,
    raw: &str,
) -> Result<ValidationResult> {
    if kind.is_empty() {
        return Err(Error::invalid_argument("credential type must not be empty"));
    }

    let Some(caller) = caller else {
        return Ok(ValidationResult::INVALID);
    };

    let Some(records) = snapshot.caller_credentials(caller) else {
        tracing::debug!(caller, "Validation for unknown caller");
        return Ok(ValidationResult::INVALID);
    };

    for record in records.iter().filter(|r| r.kind == kind) {
        let prepared = match hasher::prepare(raw, record.salt(), record.algorithm()) {
            Ok(prepared) => prepared,
            Err(e) => {
                tracing::warn!(caller, kind, error = %e, "Skipping credential record");
                continue;
            }
        };

        if hasher::matches(&prepared, &record.value) {
            return Ok(ValidationResult::valid(
                caller,
                snapshot.caller_groups(caller).map(<[String]>::to_vec),
                snapshot.caller_roles(caller).map(<[String]>::to_vec),
            ));
        }
    }

    Ok(ValidationResult::INVALID)
}

/// Validate a binary credential.
///
/// The bytes are base64 encoded (standard alphabet, padded) and compared
/// through the same path as [`validate`].
pub fn validate_bytes(
    snapshot: &Snapshot,
    caller: Option<&str>,
    kind: &str,
    raw: &[u8],
) -> Result<ValidationResult> {
    validate(snapshot, caller, kind, &STANDARD.encode(raw))
}
