//! Time related utils.

use chrono::{TimeZone, Utc};

use crate::{Error, Result};

/// DateTime in UTC.
pub type DateTime = chrono::DateTime<Utc>;

/// Current time in UTC.
#[inline]
pub fn now() -> DateTime {
    Utc::now()
}

/// Format time into an http date: `Sun, 06 Nov 1994 08:49:37 GMT`.
pub fn format_http_date(t: DateTime) -> String {
    t.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

/// Format time into RFC 3339 with seconds precision: `2022-03-13T07:20:04Z`.
pub fn format_rfc3339(t: DateTime) -> String {
    t.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

/// Parse an http date such as `Sun, 06 Nov 1994 08:49:37 GMT`.
pub fn parse_http_date(s: &str) -> Result<DateTime> {
    let t = chrono::DateTime::parse_from_rfc2822(s)
        .map_err(|e| Error::unexpected(format!("parse {s:?} as http date")).with_source(e))?;
    Ok(t.with_timezone(&Utc))
}

/// Parse an RFC 3339 timestamp such as `2022-03-01T08:12:34Z`.
pub fn parse_rfc3339(s: &str) -> Result<DateTime> {
    let t = chrono::DateTime::parse_from_rfc3339(s)
        .map_err(|e| Error::unexpected(format!("parse {s:?} as rfc3339")).with_source(e))?;
    Ok(t.with_timezone(&Utc))
}

/// Build a UTC timestamp from unix seconds.
pub fn from_timestamp(secs: i64) -> Result<DateTime> {
    Utc.timestamp_opt(secs, 0)
        .single()
        .ok_or_else(|| Error::unexpected(format!("{secs} is not a valid unix timestamp")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn test_time() -> DateTime {
        from_timestamp(784111777).unwrap()
    }

    #[test]
    fn test_format_http_date() {
        assert_eq!(format_http_date(test_time()), "Sun, 06 Nov 1994 08:49:37 GMT");
    }

    #[test]
    fn test_format_rfc3339() {
        assert_eq!(format_rfc3339(test_time()), "1994-11-06T08:49:37Z");
    }

    #[test]
    fn test_parse_round_trip() {
        assert_eq!(parse_http_date("Sun, 06 Nov 1994 08:49:37 GMT").unwrap(), test_time());
        assert_eq!(parse_rfc3339("1994-11-06T08:49:37Z").unwrap(), test_time());
        assert!(parse_http_date("yesterday").is_err());
    }
}
