//! Client-side validation shared by the service clients.
//!
//! Every check runs before a request is built, so a failure never reaches
//! the network.

use crate::{Error, Result};

/// Reject empty values.
pub fn non_empty(field: &str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(Error::invalid_input(format!(
            "`{field}` cannot be an empty string"
        )));
    }
    Ok(())
}

/// Reject empty values and values containing upper-case characters.
///
/// Names are never normalized on the caller's behalf.
pub fn lower_case_name(field: &str, value: &str) -> Result<()> {
    non_empty(field, value)?;
    if value.to_lowercase() != value {
        return Err(Error::invalid_input(format!(
            "`{field}` must be a lower-cased string"
        )));
    }
    Ok(())
}

/// Reject values whose length is outside `min..=max` characters.
pub fn length_between(field: &str, value: &str, min: usize, max: usize) -> Result<()> {
    let len = value.chars().count();
    if len < min || len > max {
        return Err(Error::invalid_input(format!(
            "`{field}` must be between {min} and {max} characters, got {len}"
        )));
    }
    Ok(())
}

/// Reject numbers outside `min..=max`.
pub fn in_range<T>(field: &str, value: T, min: T, max: T) -> Result<()>
where
    T: PartialOrd + std::fmt::Display,
{
    if value < min || value > max {
        return Err(Error::invalid_input(format!(
            "`{field}` must be between {min} and {max}, got {value}"
        )));
    }
    Ok(())
}
