//! Stored access policies, the `SignedIdentifiers` document used by the
//! `comp=acl` operations of shares, queues and tables.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// A service stores at most this many policies per resource.
pub const MAX_SIGNED_IDENTIFIERS: usize = 5;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename = "SignedIdentifiers")]
pub struct SignedIdentifiers {
    #[serde(rename = "SignedIdentifier", default)]
    pub items: Vec<SignedIdentifier>,
}

impl SignedIdentifiers {
    pub fn new(items: Vec<SignedIdentifier>) -> Result<Self> {
        if items.len() > MAX_SIGNED_IDENTIFIERS {
            return Err(Error::invalid_input(format!(
                "at most {MAX_SIGNED_IDENTIFIERS} signed identifiers are allowed, got {}",
                items.len()
            )));
        }
        if let Some(item) = items.iter().find(|i| i.id.is_empty() || i.id.len() > 64) {
            return Err(Error::invalid_input(format!(
                "signed identifier id {:?} must be 1 to 64 characters",
                item.id
            )));
        }
        Ok(Self { items })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SignedIdentifier {
    pub id: String,
    pub access_policy: AccessPolicy,
}

/// Times are ISO 8601 strings such as `2024-01-01T00:00:00.0000000Z`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AccessPolicy {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry: Option<String>,
    /// Permission letters, e.g. `rwdl`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permission: Option<String>,
}
