//! Text normalization shared by the sweep modes and the Postman exporter.
//!
//! Fixture targets carry a `{host}` placeholder and `{key}` route
//! placeholders filled from the environment's parameter map. The helpers
//! here turn such a target into the form declared in source.

use serde_json::{Map, Value};

use crate::config::{HOST_PLACEHOLDER, RESERVED_PARAMS};

/// Parameter maps with more keys than this carry route variables.
pub const ROUTE_PARAM_THRESHOLD: usize = 2;

/// Removes every `{host}` placeholder from a fixture target.
///
/// # Examples
///
/// ```
/// use itsweep::normalize::strip_host;
///
/// assert_eq!(strip_host("{host}/remind/add"), "/remind/add");
/// assert_eq!(strip_host("/plain"), "/plain");
/// ```
pub fn strip_host(target: &str) -> String {
    target.replace(HOST_PLACEHOLDER, "")
}

/// Returns `true` when a parameter map carries route variables.
///
/// Host keys count toward the threshold.
pub fn has_route_params(params: &Map<String, Value>) -> bool {
    params.len() > ROUTE_PARAM_THRESHOLD
}

/// Returns `true` for keys that never become route variables.
pub fn is_reserved(key: &str) -> bool {
    RESERVED_PARAMS.contains(&key)
}

/// Renders a parameter value as it appears inside a route.
///
/// Integers render in decimal, floats with zero decimals, strings verbatim
/// (unquoted), anything else as JSON text.
///
/// # Examples
///
/// ```
/// use itsweep::normalize::render_literal;
/// use serde_json::json;
///
/// assert_eq!(render_literal(&json!(5)), "5");
/// assert_eq!(render_literal(&json!(12.6)), "13");
/// assert_eq!(render_literal(&json!("abc")), "abc");
/// assert_eq!(render_literal(&json!(true)), "true");
/// ```
pub fn render_literal(value: &Value) -> String {
    match value {
        Value::Number(number) => match number.as_i64() {
            Some(int) => int.to_string(),
            None => match number.as_u64() {
                Some(uint) => uint.to_string(),
                None => format!("{:.0}", number.as_f64().unwrap_or_default()),
            },
        },
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// Builds the route-variable payload `{"k": v,...}` from the non-reserved
/// entries of `params`, in key order.
///
/// # Examples
///
/// ```
/// use itsweep::normalize::route_payload;
/// use serde_json::json;
///
/// let params = json!({"id": 5, "host": "h", "consulHost": "c", "slug": "x"});
/// let payload = route_payload(params.as_object().unwrap());
/// assert_eq!(payload, r#"{"id": 5,"slug": x}"#);
/// ```
pub fn route_payload(params: &Map<String, Value>) -> String {
    let entries: Vec<String> = params
        .iter()
        .filter(|(key, _)| !is_reserved(key))
        .map(|(key, value)| format!("\"{key}\": {}", render_literal(value)))
        .collect();
    format!("{{{}}}", entries.join(","))
}

/// Cuts a path at its first `?`.
pub fn truncate_query(path: &str) -> &str {
    match path.find('?') {
        Some(idx) => &path[..idx],
        None => path,
    }
}

/// Replaces `{key}` placeholders in `path` with the rendered values of the
/// non-reserved entries of `params`.
///
/// # Examples
///
/// ```
/// use itsweep::normalize::substitute_placeholders;
/// use serde_json::json;
///
/// let params = json!({"id": 5, "host": "h"});
/// let path = substitute_placeholders("/item/{id}/{host}", params.as_object().unwrap());
/// assert_eq!(path, "/item/5/{host}");
/// ```
pub fn substitute_placeholders(path: &str, params: &Map<String, Value>) -> String {
    params
        .iter()
        .filter(|(key, _)| !is_reserved(key))
        .fold(path.to_string(), |acc, (key, value)| {
            acc.replace(&format!("{{{key}}}"), &render_literal(value))
        })
}

/// Uppercases the first letter of every alphanumeric run.
///
/// # Examples
///
/// ```
/// use itsweep::normalize::title_case;
///
/// assert_eq!(title_case("sampleapp"), "Sampleapp");
/// assert_eq!(title_case("sample-app"), "Sample-App");
/// assert_eq!(title_case(""), "");
/// ```
pub fn title_case(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut at_word_start = true;
    for ch in value.chars() {
        if ch.is_alphanumeric() {
            if at_word_start {
                out.extend(ch.to_uppercase());
            } else {
                out.push(ch);
            }
            at_word_start = false;
        } else {
            out.push(ch);
            at_word_start = true;
        }
    }
    out
}

/// Returns `true` when `token` occurs in `text` bounded on both sides by a
/// non-alphanumeric character or the edge of the text.
///
/// # Examples
///
/// ```
/// use itsweep::normalize::contains_token;
///
/// assert!(contains_token("query { GetProductDetail(id: 1) }", "GetProductDetail"));
/// assert!(!contains_token("query { GetProductDetail }", "Get"));
/// assert!(!contains_token("GetProductDetailFromSomewhere", "GetProductDetail"));
/// ```
pub fn contains_token(text: &str, token: &str) -> bool {
    if token.is_empty() {
        return false;
    }
    let mut offset = 0;
    while let Some(found) = text[offset..].find(token) {
        let start = offset + found;
        let end = start + token.len();
        let before = text[..start].chars().next_back();
        let after = text[end..].chars().next();
        if !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
        {
            return true;
        }
        offset = start + text[start..].chars().next().map_or(1, char::len_utf8);
    }
    false
}
