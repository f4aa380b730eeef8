//! User-defined metadata carried in `x-ms-meta-*` headers.

use std::collections::HashMap;

use http::HeaderMap;

use crate::{Error, Result};

/// Prefix of metadata headers.
pub const METADATA_PREFIX: &str = "x-ms-meta-";

/// Metadata names must be usable as C# identifiers, so keywords are out.
const RESERVED_KEYWORDS: &[&str] = &[
    "abstract", "as", "base", "bool", "break", "byte", "case", "catch", "char", "checked",
    "class", "const", "continue", "decimal", "default", "delegate", "do", "double", "else",
    "enum", "event", "explicit", "extern", "false", "finally", "fixed", "float", "for",
    "foreach", "goto", "if", "implicit", "in", "int", "interface", "internal", "is", "lock",
    "long", "namespace", "new", "null", "object", "operator", "out", "override", "params",
    "private", "protected", "public", "readonly", "ref", "return", "sbyte", "sealed", "short",
    "sizeof", "stackalloc", "static", "string", "struct", "switch", "this", "throw", "true",
    "try", "typeof", "uint", "ulong", "unchecked", "unsafe", "ushort", "using", "void",
    "volatile", "while",
];

/// Check that every key is a valid metadata name.
pub fn validate(meta: &HashMap<String, String>) -> Result<()> {
    for key in meta.keys() {
        validate_key(key)?;
    }
    Ok(())
}

fn validate_key(key: &str) -> Result<()> {
    let mut chars = key.chars();
    let valid_start = chars
        .next()
        .map(|c| c.is_ascii_alphabetic() || c == '_')
        .unwrap_or(false);
    if !valid_start || !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(Error::invalid_input(format!(
            "metadata key {key:?} must start with a letter or underscore and contain only letters, digits and underscores"
        )));
    }
    if RESERVED_KEYWORDS.contains(&key) {
        return Err(Error::invalid_input(format!(
            "metadata key {key:?} is a reserved keyword"
        )));
    }
    Ok(())
}

/// Render metadata as headers, sorted by key.
pub fn to_headers(meta: &HashMap<String, String>) -> Vec<(String, String)> {
    let mut headers: Vec<(String, String)> = meta
        .iter()
        .map(|(k, v)| (format!("{METADATA_PREFIX}{k}"), v.clone()))
        .collect();
    headers.sort();
    headers
}

/// Collect metadata from response headers.
///
/// Header names are case-insensitive, so keys come back lower-cased.
pub fn from_headers(headers: &HeaderMap) -> HashMap<String, String> {
    headers
        .iter()
        .filter_map(|(name, value)| {
            let key = name.as_str().strip_prefix(METADATA_PREFIX)?;
            let value = value.to_str().ok()?;
            Some((key.to_string(), value.to_string()))
        })
        .collect()
}
