//! Tolerant extraction of typed overrides from a `serde_json::Value` object.
//!
//! A missing key or a value of the wrong JSON type falls back to the default.
//! Range checking happens afterwards in [`FieldConfig::validate`](crate::config::FieldConfig::validate).

use serde_json::Value;

/// Reads `params[name]` as `f64` (integers accepted), else `default`.
pub fn param_f64(params: &Value, name: &str, default: f64) -> f64 {
    params.get(name).and_then(Value::as_f64).unwrap_or(default)
}

/// Reads `params[name]` as a non-negative integer, else `default`.
pub fn param_usize(params: &Value, name: &str, default: usize) -> usize {
    params
        .get(name)
        .and_then(Value::as_u64)
        .and_then(|v| usize::try_from(v).ok())
        .unwrap_or(default)
}

/// Reads `params[name]` as a string, else `default`.
pub fn param_string(params: &Value, name: &str, default: &str) -> String {
    params
        .get(name)
        .and_then(Value::as_str)
        .map(String::from)
        .unwrap_or_else(|| default.to_owned())
}

/// Reads `params[name]` as an array of strings.
///
/// Returns `None` when the key is missing, is not an array, or holds any
/// non-string element, so callers can keep their default list.
pub fn param_string_list(params: &Value, name: &str) -> Option<Vec<String>> {
    params
        .get(name)?
        .as_array()?
        .iter()
        .map(|v| v.as_str().map(String::from))
        .collect()
}
