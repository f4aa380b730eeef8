use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use azstorage_core::copy::CopyProgress;
use azstorage_core::time::DateTime;
use azstorage_core::{headers, metadata, Error, Result, StorageRequest};
use http::header::{CACHE_CONTROL, CONTENT_DISPOSITION, CONTENT_ENCODING, CONTENT_LANGUAGE, CONTENT_TYPE};
use http::HeaderMap;
use serde::Deserialize;

use crate::lease::{LeaseState, LeaseStatus, X_MS_LEASE_STATE, X_MS_LEASE_STATUS};

pub(crate) const X_MS_BLOB_TYPE: &str = "x-ms-blob-type";
pub(crate) const X_MS_ACCESS_TIER: &str = "x-ms-access-tier";
const X_MS_ACCESS_TIER_INFERRED: &str = "x-ms-access-tier-inferred";
const X_MS_BLOB_SEQUENCE_NUMBER: &str = "x-ms-blob-sequence-number";
const X_MS_BLOB_COMMITTED_BLOCK_COUNT: &str = "x-ms-blob-committed-block-count";
const X_MS_SERVER_ENCRYPTED: &str = "x-ms-server-encrypted";
const X_MS_CREATION_TIME: &str = "x-ms-creation-time";
const X_MS_COPY_SOURCE: &str = "x-ms-copy-source";
const X_MS_LEGAL_HOLD: &str = "x-ms-legal-hold";
const X_MS_IMMUTABILITY_POLICY_UNTIL_DATE: &str = "x-ms-immutability-policy-until-date";
const X_MS_IMMUTABILITY_POLICY_MODE: &str = "x-ms-immutability-policy-mode";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
pub enum BlobType {
    BlockBlob,
    PageBlob,
    AppendBlob,
}

impl BlobType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BlobType::BlockBlob => "BlockBlob",
            BlobType::PageBlob => "PageBlob",
            BlobType::AppendBlob => "AppendBlob",
        }
    }
}

impl FromStr for BlobType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "BlockBlob" => Ok(BlobType::BlockBlob),
            "PageBlob" => Ok(BlobType::PageBlob),
            "AppendBlob" => Ok(BlobType::AppendBlob),
            _ => Err(Error::unexpected(format!("unknown blob type {s:?}"))),
        }
    }
}

impl fmt::Display for BlobType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Access tier of a blob.
///
/// Premium page blob tiers (`P4`, `P10`, ...) are kept as `Premium`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
#[serde(from = "String")]
pub enum AccessTier {
    Hot,
    Cool,
    Cold,
    Archive,
    Premium(String),
}

impl AccessTier {
    pub fn as_str(&self) -> &str {
        match self {
            AccessTier::Hot => "Hot",
            AccessTier::Cool => "Cool",
            AccessTier::Cold => "Cold",
            AccessTier::Archive => "Archive",
            AccessTier::Premium(tier) => tier,
        }
    }
}

impl From<String> for AccessTier {
    fn from(s: String) -> Self {
        match s.as_str() {
            "Hot" => AccessTier::Hot,
            "Cool" => AccessTier::Cool,
            "Cold" => AccessTier::Cold,
            "Archive" => AccessTier::Archive,
            _ => AccessTier::Premium(s),
        }
    }
}

impl FromStr for AccessTier {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Ok(AccessTier::from(s.to_string()))
    }
}

impl fmt::Display for AccessTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Standard http properties stored with a blob, sent as
/// `x-ms-blob-content-*` when writing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentSettings {
    pub content_type: Option<String>,
    pub content_encoding: Option<String>,
    pub content_language: Option<String>,
    pub content_disposition: Option<String>,
    pub cache_control: Option<String>,
    /// Base64 encoded MD5 of the whole blob.
    pub content_md5: Option<String>,
}

impl ContentSettings {
    pub(crate) fn apply(&self, req: StorageRequest) -> StorageRequest {
        req.header_opt("x-ms-blob-content-type", self.content_type.as_deref())
            .header_opt("x-ms-blob-content-encoding", self.content_encoding.as_deref())
            .header_opt("x-ms-blob-content-language", self.content_language.as_deref())
            .header_opt("x-ms-blob-content-disposition", self.content_disposition.as_deref())
            .header_opt("x-ms-blob-cache-control", self.cache_control.as_deref())
            .header_opt("x-ms-blob-content-md5", self.content_md5.as_deref())
    }

    fn from_headers(h: &HeaderMap) -> Self {
        Self {
            content_type: headers::get_string(h, CONTENT_TYPE.as_str()),
            content_encoding: headers::get_string(h, CONTENT_ENCODING.as_str()),
            content_language: headers::get_string(h, CONTENT_LANGUAGE.as_str()),
            content_disposition: headers::get_string(h, CONTENT_DISPOSITION.as_str()),
            cache_control: headers::get_string(h, CACHE_CONTROL.as_str()),
            content_md5: headers::get_string(h, "content-md5"),
        }
    }
}

/// Properties returned by `get_properties` and `get`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlobProperties {
    pub blob_type: BlobType,
    pub content_length: u64,
    pub content: ContentSettings,
    pub etag: Option<String>,
    pub last_modified: Option<DateTime>,
    pub creation_time: Option<DateTime>,
    pub access_tier: Option<AccessTier>,
    pub access_tier_inferred: bool,
    pub sequence_number: Option<u64>,
    pub committed_block_count: Option<u64>,
    pub server_encrypted: bool,
    pub lease_status: Option<LeaseStatus>,
    pub lease_state: Option<LeaseState>,
    /// Set once a copy has targeted this blob.
    pub copy: Option<CopyProgress>,
    pub copy_source: Option<String>,
    pub legal_hold: bool,
    pub immutability_policy_until: Option<DateTime>,
    pub immutability_policy_mode: Option<String>,
    pub metadata: HashMap<String, String>,
}

impl BlobProperties {
    pub(crate) fn from_headers(h: &HeaderMap) -> Result<Self> {
        let blob_type = headers::require_str(h, X_MS_BLOB_TYPE)?.parse()?;
        let copy = match headers::get_str(h, azstorage_core::copy::X_MS_COPY_STATUS) {
            Some(_) => Some(CopyProgress::from_headers(h)?),
            None => None,
        };

        Ok(Self {
            blob_type,
            content_length: headers::parse_content_length(h)?.unwrap_or_default(),
            content: ContentSettings::from_headers(h),
            etag: headers::parse_etag(h),
            last_modified: headers::parse_last_modified(h)?,
            creation_time: headers::parse_date(h, X_MS_CREATION_TIME)?,
            access_tier: headers::parse(h, X_MS_ACCESS_TIER)?,
            access_tier_inferred: headers::parse_bool(h, X_MS_ACCESS_TIER_INFERRED)?
                .unwrap_or_default(),
            sequence_number: headers::parse(h, X_MS_BLOB_SEQUENCE_NUMBER)?,
            committed_block_count: headers::parse(h, X_MS_BLOB_COMMITTED_BLOCK_COUNT)?,
            server_encrypted: headers::parse_bool(h, X_MS_SERVER_ENCRYPTED)?.unwrap_or_default(),
            lease_status: headers::parse(h, X_MS_LEASE_STATUS)?,
            lease_state: headers::parse(h, X_MS_LEASE_STATE)?,
            copy,
            copy_source: headers::get_string(h, X_MS_COPY_SOURCE),
            legal_hold: headers::parse_bool(h, X_MS_LEGAL_HOLD)?.unwrap_or_default(),
            immutability_policy_until: headers::parse_date(h, X_MS_IMMUTABILITY_POLICY_UNTIL_DATE)?,
            immutability_policy_mode: headers::get_string(h, X_MS_IMMUTABILITY_POLICY_MODE),
            metadata: metadata::from_headers(h),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use azstorage_core::copy::CopyStatus;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_access_tier() {
        assert_eq!("Cool".parse::<AccessTier>().unwrap(), AccessTier::Cool);
        assert_eq!(
            "P30".parse::<AccessTier>().unwrap(),
            AccessTier::Premium("P30".to_string())
        );
        assert_eq!(AccessTier::Premium("P30".to_string()).to_string(), "P30");
    }

    #[test]
    fn test_properties_from_headers() {
        let mut h = HeaderMap::new();
        h.insert(X_MS_BLOB_TYPE, "AppendBlob".parse().unwrap());
        h.insert("content-length", "42".parse().unwrap());
        h.insert("content-type", "text/plain".parse().unwrap());
        h.insert(X_MS_BLOB_COMMITTED_BLOCK_COUNT, "3".parse().unwrap());
        h.insert("x-ms-copy-status", "pending".parse().unwrap());
        h.insert("x-ms-copy-id", "copy-1".parse().unwrap());

        let props = BlobProperties::from_headers(&h).unwrap();
        assert_eq!(props.blob_type, BlobType::AppendBlob);
        assert_eq!(props.content_length, 42);
        assert_eq!(props.content.content_type.as_deref(), Some("text/plain"));
        assert_eq!(props.committed_block_count, Some(3));
        assert_eq!(props.copy.unwrap().status, CopyStatus::Pending);
        assert_eq!(props.access_tier, None);
    }

    #[test]
    fn test_properties_need_blob_type() {
        assert!(BlobProperties::from_headers(&HeaderMap::new()).is_err());
    }
}
