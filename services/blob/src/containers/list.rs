use std::collections::HashMap;

use azstorage_core::time::{self, DateTime};
use azstorage_core::{Result, StorageRequest};
use serde::Deserialize;

use crate::blobs::{AccessTier, BlobType};
use crate::lease::{LeaseState, LeaseStatus};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListBlobsInput {
    pub prefix: Option<String>,
    /// Group blobs sharing a prefix up to the delimiter into `BlobPrefix`es.
    pub delimiter: Option<String>,
    pub marker: Option<String>,
    /// `1..=5000`, the service default is 5000.
    pub max_results: Option<u32>,
    pub include_copy: bool,
    pub include_deleted: bool,
    pub include_metadata: bool,
    pub include_snapshots: bool,
    pub include_uncommitted_blobs: bool,
}

impl ListBlobsInput {
    fn include(&self) -> Option<String> {
        let include: Vec<&str> = [
            (self.include_copy, "copy"),
            (self.include_deleted, "deleted"),
            (self.include_metadata, "metadata"),
            (self.include_snapshots, "snapshots"),
            (self.include_uncommitted_blobs, "uncommittedblobs"),
        ]
        .into_iter()
        .filter_map(|(on, name)| on.then_some(name))
        .collect();

        (!include.is_empty()).then(|| include.join(","))
    }

    pub(crate) fn apply(&self, req: StorageRequest) -> StorageRequest {
        req.query_opt("prefix", self.prefix.as_deref())
            .query_opt("delimiter", self.delimiter.as_deref())
            .query_opt("marker", self.marker.as_deref())
            .query_opt("maxresults", self.max_results)
            .query_opt("include", self.include())
    }
}

/// One page of a blob listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListBlobsResult {
    pub blobs: Vec<BlobItem>,
    pub blob_prefixes: Vec<BlobPrefix>,
    /// Set when more results are available.
    pub next_marker: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BlobItem {
    pub name: String,
    #[serde(default)]
    pub snapshot: Option<String>,
    #[serde(default)]
    pub deleted: bool,
    pub properties: BlobItemProperties,
    #[serde(default)]
    pub metadata: Option<HashMap<String, String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BlobPrefix {
    pub name: String,
}

/// Properties as reported in listings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BlobItemProperties {
    #[serde(rename = "Content-Length")]
    pub content_length: u64,
    #[serde(rename = "Content-Type", default)]
    pub content_type: Option<String>,
    #[serde(rename = "Content-MD5", default)]
    pub content_md5: Option<String>,
    #[serde(rename = "Last-Modified")]
    pub last_modified: String,
    #[serde(rename = "Etag")]
    pub etag: String,
    #[serde(rename = "BlobType")]
    pub blob_type: BlobType,
    #[serde(rename = "AccessTier", default)]
    pub access_tier: Option<AccessTier>,
    #[serde(rename = "LeaseStatus", default)]
    pub lease_status: Option<LeaseStatus>,
    #[serde(rename = "LeaseState", default)]
    pub lease_state: Option<LeaseState>,
    #[serde(rename = "ServerEncrypted", default)]
    pub server_encrypted: bool,
}

impl BlobItemProperties {
    pub fn last_modified(&self) -> Result<DateTime> {
        time::parse_http_date(&self.last_modified)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct EnumerationResults {
    #[serde(default)]
    blobs: Blobs,
    #[serde(default)]
    next_marker: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct Blobs {
    #[serde(rename = "Blob", default)]
    blob: Vec<BlobItem>,
    #[serde(rename = "BlobPrefix", default)]
    blob_prefix: Vec<BlobPrefix>,
}

impl From<EnumerationResults> for ListBlobsResult {
    fn from(v: EnumerationResults) -> Self {
        Self {
            blobs: v.blobs.blob,
            blob_prefixes: v.blobs.blob_prefix,
            next_marker: v.next_marker.filter(|m| !m.is_empty()),
        }
    }
}
