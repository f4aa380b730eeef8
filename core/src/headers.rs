//! Helpers to read response headers.

use std::str::FromStr;

use http::header::{CONTENT_LENGTH, ETAG, LAST_MODIFIED};
use http::HeaderMap;

use crate::time::{self, DateTime};
use crate::{Error, Result};

pub const X_MS_REQUEST_ID: &str = "x-ms-request-id";
pub const X_MS_ERROR_CODE: &str = "x-ms-error-code";

/// Get a header as `&str`, `None` if missing or not visible ASCII.
pub fn get_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

/// Get a header as an owned `String`.
pub fn get_string(headers: &HeaderMap, name: &str) -> Option<String> {
    get_str(headers, name).map(String::from)
}

/// Get a required header.
pub fn require_str<'a>(headers: &'a HeaderMap, name: &str) -> Result<&'a str> {
    get_str(headers, name)
        .ok_or_else(|| Error::unexpected(format!("response is missing the {name} header")))
}

/// Parse a header with `FromStr`.
pub fn parse<T: FromStr>(headers: &HeaderMap, name: &str) -> Result<Option<T>> {
    match get_str(headers, name) {
        None => Ok(None),
        Some(v) => v.trim().parse::<T>().map(Some).map_err(|_| {
            Error::unexpected(format!("header {name} has an invalid value {v:?}"))
        }),
    }
}

/// Parse a boolean header such as `x-ms-server-encrypted`.
pub fn parse_bool(headers: &HeaderMap, name: &str) -> Result<Option<bool>> {
    match get_str(headers, name) {
        None => Ok(None),
        Some(v) if v.eq_ignore_ascii_case("true") => Ok(Some(true)),
        Some(v) if v.eq_ignore_ascii_case("false") => Ok(Some(false)),
        Some(v) => Err(Error::unexpected(format!(
            "header {name} has an invalid boolean {v:?}"
        ))),
    }
}

/// Parse an http date header.
pub fn parse_date(headers: &HeaderMap, name: &str) -> Result<Option<DateTime>> {
    get_str(headers, name).map(time::parse_http_date).transpose()
}

pub fn parse_content_length(headers: &HeaderMap) -> Result<Option<u64>> {
    parse(headers, CONTENT_LENGTH.as_str())
}

pub fn parse_etag(headers: &HeaderMap) -> Option<String> {
    get_string(headers, ETAG.as_str())
}

pub fn parse_last_modified(headers: &HeaderMap) -> Result<Option<DateTime>> {
    parse_date(headers, LAST_MODIFIED.as_str())
}

pub fn parse_request_id(headers: &HeaderMap) -> Option<String> {
    get_string(headers, X_MS_REQUEST_ID)
}
