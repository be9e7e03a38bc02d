//! Payload values cut out of raw fixture text.

use std::fmt;

use serde::{Serialize, Serializer};

/// Sentinel text for a payload that was not found.
pub const ABSENT_SENTINEL: &str = "{}";

/// Sentinel text for a payload explicitly set to JSON `null`.
pub const NULL_SENTINEL: &str = "null";

/// A request payload extracted from a fixture document.
///
/// Renders as the extracted text, or as the `"{}"` / `"null"` sentinels.
///
/// # Examples
///
/// ```
/// use itsweep_core::ExtractedPayload;
///
/// assert_eq!(ExtractedPayload::Absent.as_str(), "{}");
/// assert_eq!(ExtractedPayload::Null.to_string(), "null");
/// let object = ExtractedPayload::Object(r#"{"id": 1}"#.into());
/// assert_eq!(object.as_str(), r#"{"id": 1}"#);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ExtractedPayload {
    /// A balanced `{...}` slice of the source text.
    Object(String),
    /// The key (or the requested occurrence of it) was not found.
    #[default]
    Absent,
    /// The payload was explicitly `null`.
    Null,
}

impl ExtractedPayload {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Object(raw) => raw,
            Self::Absent => ABSENT_SENTINEL,
            Self::Null => NULL_SENTINEL,
        }
    }

    /// Returns `true` when the payload renders as the empty-object sentinel,
    /// including an extracted literal `{}`.
    pub fn is_empty_object(&self) -> bool {
        self.as_str() == ABSENT_SENTINEL
    }
}

impl fmt::Display for ExtractedPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ExtractedPayload {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Payloads for the staging (first occurrence) and production (second
/// occurrence) blocks of one fixture.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EnvPayloads {
    pub staging: ExtractedPayload,
    pub production: ExtractedPayload,
}

impl EnvPayloads {
    /// Both slots set to the same payload.
    pub fn both(payload: ExtractedPayload) -> Self {
        Self {
            staging: payload.clone(),
            production: payload,
        }
    }
}
