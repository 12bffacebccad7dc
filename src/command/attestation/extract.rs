// src/command/attestation/extract.rs

use crate::command::attestation::surface::{FieldState, ReasonControl};
use crate::command::attestation::types::Profile;
use crate::error::FormResult;
use crate::normalize::to_ascii_value;
use crate::types::{FIELD_PREFIX, RELEASE_DATE_FIELD_ID};

/// Snapshot a field collection into `key -> ASCII value`.
///
/// Keys are field ids without the `field-` prefix. The release date is
/// rewritten from `YYYY-MM-DD` to `DD/MM/YYYY` before folding.
pub fn extract_profile<'a, I>(fields: I) -> FormResult<Profile>
where
    I: IntoIterator<Item = &'a FieldState>,
{
    let mut profile = Profile::new();

    for field in fields {
        let value = if field.id == RELEASE_DATE_FIELD_ID {
            match field.value.as_str() {
                Some(s) => serde_json::Value::String(reorder_release_date(s)),
                None => field.value.clone(),
            }
        } else {
            field.value.clone()
        };

        let key = field
            .id
            .strip_prefix(FIELD_PREFIX)
            .unwrap_or(&field.id)
            .to_string();

        profile.insert(key, to_ascii_value(&value)?);
    }

    Ok(profile)
}

/// `2021-05-03` -> `03/05/2021`. Anything that does not split into exactly
/// three `-` components is returned unchanged.
pub fn reorder_release_date(s: &str) -> String {
    let parts: Vec<&str> = s.split('-').collect();
    match parts.as_slice() {
        [y, m, d] => format!("{d}/{m}/{y}"),
        _ => s.to_string(),
    }
}

/// Values of the checked controls, joined with `", "`.
pub fn extract_reasons(controls: &[ReasonControl]) -> String {
    controls
        .iter()
        .filter(|c| c.checked)
        .map(|c| c.value.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

// ======================================================
// Unit Tests
// ======================================================
