//! Utility functions and types.

use std::fmt;

/// Displays a url with its query string hidden.
///
/// Copy sources are usually SAS urls, so they are logged through this.
pub struct RedactedUrl<'a>(&'a str);

impl<'a> From<&'a str> for RedactedUrl<'a> {
    fn from(value: &'a str) -> Self {
        RedactedUrl(value)
    }
}

impl<'a> From<&'a String> for RedactedUrl<'a> {
    fn from(value: &'a String) -> Self {
        RedactedUrl(value.as_str())
    }
}

impl fmt::Display for RedactedUrl<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.split_once('?') {
            Some((base, query)) if !query.is_empty() => write!(f, "{base}?***"),
            Some((base, _)) => f.write_str(base),
            None => f.write_str(self.0),
        }
    }
}

impl fmt::Debug for RedactedUrl<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self}")
    }
}
