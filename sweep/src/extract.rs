//! Brace-balanced value extraction from raw fixture text.
//!
//! Request payloads are cut straight out of the fixture source instead of
//! being re-serialized from a parsed tree, so the report shows them exactly
//! as recorded. The scan counts `{` and `}` without tracking string
//! literals: a brace inside a quoted value is counted like any other.

use itsweep_core::{EnvPayloads, ExtractedPayload};

/// Occurrence number of the staging block.
pub const STAGING_OCCURRENCE: usize = 1;

/// Occurrence number of the production block.
pub const PRODUCTION_OCCURRENCE: usize = 2;

/// Returns the byte offset of the `n`-th (1-based) occurrence of `key` in
/// `haystack`, searching sequentially past each previous match.
///
/// # Examples
///
/// ```
/// use itsweep::extract::index_nth;
///
/// let text = "a-key b-key c-key";
/// assert_eq!(index_nth(text, "key", 1), Some(2));
/// assert_eq!(index_nth(text, "key", 3), Some(14));
/// assert_eq!(index_nth(text, "key", 4), None);
/// assert_eq!(index_nth(text, "key", 0), None);
/// ```
pub fn index_nth(haystack: &str, key: &str, n: usize) -> Option<usize> {
    if n == 0 || key.is_empty() {
        return None;
    }
    let mut offset = 0;
    for occurrence in 1..=n {
        let found = haystack[offset..].find(key)?;
        offset += found;
        if occurrence == n {
            return Some(offset);
        }
        offset += key.len();
    }
    None
}

/// Extracts the object bound to the staging and production occurrences of
/// `key` in `document`.
///
/// - A missing occurrence yields [`ExtractedPayload::Absent`] for its slot.
/// - When `key` occurs and `null_marker` is found anywhere in the document,
///   both slots are [`ExtractedPayload::Null`] and nothing is scanned.
/// - The function never fails; absence is data.
///
/// # Examples
///
/// ```
/// use itsweep::extract::extract_value;
/// use itsweep_core::ExtractedPayload;
///
/// let doc = r#"{"structure": [
///     {"env": "staging", "variables": {"id": 1}},
///     {"env": "production", "variables": {"id": 2, "nested": {"a": 1}}}
/// ]}"#;
/// let payloads = extract_value(doc, "variables", None);
/// assert_eq!(payloads.staging.as_str(), r#"{"id": 1}"#);
/// assert_eq!(payloads.production.as_str(), r#"{"id": 2, "nested": {"a": 1}}"#);
///
/// let missing = extract_value(doc, "responseString", None);
/// assert_eq!(missing.staging, ExtractedPayload::Absent);
/// assert_eq!(missing.production.as_str(), "{}");
/// ```
pub fn extract_value(document: &str, key: &str, null_marker: Option<&str>) -> EnvPayloads {
    let Some(first) = index_nth(document, key, STAGING_OCCURRENCE) else {
        return EnvPayloads::default();
    };

    if let Some(marker) = null_marker.filter(|marker| !marker.is_empty()) {
        if document.contains(marker) {
            return EnvPayloads::both(ExtractedPayload::Null);
        }
    }

    let production = index_nth(document, key, PRODUCTION_OCCURRENCE)
        .map(|start| extract_at(document, key, start))
        .unwrap_or_default();

    EnvPayloads {
        staging: extract_at(document, key, first),
        production,
    }
}

/// Extracts the balanced object that follows the occurrence of `key` at
/// byte offset `start`.
///
/// The slice begins past the key token, its closing quote, the colon and
/// any layout whitespace, and ends at the `}` where the running open count
/// first equals the close count. A value that does not open with `{`
/// (`null`, a string, a number) or a scan that never balances yields
/// `Absent`.
///
/// # Examples
///
/// ```
/// use itsweep::extract::extract_at;
/// use itsweep_core::ExtractedPayload;
///
/// let doc = r#"{"variables": null, "responseString": {"ok": true}}"#;
/// assert_eq!(extract_at(doc, "variables", 2), ExtractedPayload::Absent);
/// ```
pub fn extract_at(document: &str, key: &str, start: usize) -> ExtractedPayload {
    let bytes = document.as_bytes();
    let value_start = skip_key_layout(bytes, start + key.len());
    if bytes.get(value_start) != Some(&b'{') {
        return ExtractedPayload::Absent;
    }

    let mut depth = 0usize;
    for (idx, byte) in bytes.iter().enumerate().skip(value_start) {
        match byte {
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return ExtractedPayload::Object(document[value_start..=idx].to_string());
                }
            }
            _ => {}
        }
    }
    ExtractedPayload::Absent
}

fn skip_key_layout(bytes: &[u8], mut idx: usize) -> usize {
    while let Some(byte) = bytes.get(idx) {
        if matches!(byte, b'"' | b':') || byte.is_ascii_whitespace() {
            idx += 1;
        } else {
            break;
        }
    }
    idx
}
