use std::collections::HashMap;

use azstorage_core::{headers, metadata, validate};
use azstorage_core::{ByteRange, Capability, Client, Result, StorageRequest};
use bytes::Bytes;
use http::{Method, StatusCode};

use crate::lease::X_MS_LEASE_ID;

mod append;
pub use append::{AppendBlockInput, AppendBlockResult, PutAppendBlobInput};
mod block;
pub use block::{
    Block, BlockList, BlockListItem, BlockListType, GetBlockListResult, PutBlockBlobFromFileInput,
    PutBlockBlobInput, PutBlockListInput,
};
mod copy;
pub use copy::{CopyInput, CopyResult};
mod id;
pub use id::BlobId;
mod immutability;
pub use immutability::ImmutabilityPolicyMode;
mod lease;
mod page;
pub use page::{PageRanges, PutPageBlobInput, PAGE_SIZE};
mod properties;
pub use properties::{AccessTier, BlobProperties, BlobType, ContentSettings};

const X_MS_RANGE: &str = "x-ms-range";
const X_MS_DELETE_SNAPSHOTS: &str = "x-ms-delete-snapshots";
const X_MS_SNAPSHOT: &str = "x-ms-snapshot";

/// Which snapshots to remove together with a blob.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeleteSnapshots {
    /// Delete the blob and all of its snapshots.
    Include,
    /// Delete the snapshots only.
    Only,
}

impl DeleteSnapshots {
    fn as_str(&self) -> &'static str {
        match self {
            DeleteSnapshots::Include => "include",
            DeleteSnapshots::Only => "only",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GetBlobInput {
    pub range: Option<ByteRange>,
    pub snapshot: Option<String>,
    pub lease_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetBlobResult {
    pub content: Bytes,
    pub properties: BlobProperties,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeleteBlobInput {
    /// Delete this snapshot instead of the base blob.
    pub snapshot: Option<String>,
    pub delete_snapshots: Option<DeleteSnapshots>,
    pub lease_id: Option<String>,
}

/// Operations on blobs of every type.
#[derive(Debug, Clone)]
pub struct BlobsClient {
    client: Client,
}

impl BlobsClient {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub(crate) fn check_names(container_name: &str, blob_name: &str) -> Result<()> {
        validate::lower_case_name("container_name", container_name)?;
        validate::non_empty("blob_name", blob_name)
    }

    pub(crate) fn request(
        method: Method,
        container_name: &str,
        blob_name: &str,
    ) -> Result<StorageRequest> {
        Self::check_names(container_name, blob_name)?;
        Ok(StorageRequest::new(
            method,
            format!("{container_name}/{blob_name}"),
        ))
    }

    /// Download the blob, or the given range of it.
    pub async fn get(
        &self,
        container_name: &str,
        blob_name: &str,
        input: &GetBlobInput,
    ) -> Result<GetBlobResult> {
        let req = Self::request(Method::GET, container_name, blob_name)?
            .query_opt("snapshot", input.snapshot.as_deref())
            .header_opt(X_MS_RANGE, input.range.map(|r| r.to_header()))
            .header_opt(X_MS_LEASE_ID, input.lease_id.as_deref())
            .expect(&[StatusCode::OK, StatusCode::PARTIAL_CONTENT]);

        let resp = self.client.send(req).await?;
        let properties = BlobProperties::from_headers(resp.headers())?;
        Ok(GetBlobResult {
            content: resp.into_body(),
            properties,
        })
    }

    /// Pass `snapshot` to read the properties of a snapshot.
    pub async fn get_properties(
        &self,
        container_name: &str,
        blob_name: &str,
        snapshot: Option<&str>,
        lease_id: Option<&str>,
    ) -> Result<BlobProperties> {
        let req = Self::request(Method::HEAD, container_name, blob_name)?
            .query_opt("snapshot", snapshot)
            .header_opt(X_MS_LEASE_ID, lease_id);

        let resp = self.client.send(req).await?;
        BlobProperties::from_headers(resp.headers())
    }

    /// Replace the http properties. Unset fields are cleared on the blob.
    pub async fn set_properties(
        &self,
        container_name: &str,
        blob_name: &str,
        settings: &ContentSettings,
        lease_id: Option<&str>,
    ) -> Result<()> {
        let req = Self::request(Method::PUT, container_name, blob_name)?
            .query("comp", "properties")
            .header_opt(X_MS_LEASE_ID, lease_id);
        self.client.send(settings.apply(req)).await?;
        Ok(())
    }

    /// Replace all metadata of the blob.
    pub async fn set_metadata(
        &self,
        container_name: &str,
        blob_name: &str,
        metadata: &HashMap<String, String>,
        lease_id: Option<&str>,
    ) -> Result<()> {
        metadata::validate(metadata)?;

        let req = Self::request(Method::PUT, container_name, blob_name)?
            .query("comp", "metadata")
            .metadata(metadata)
            .header_opt(X_MS_LEASE_ID, lease_id);
        self.client.send(req).await?;
        Ok(())
    }

    pub async fn delete(
        &self,
        container_name: &str,
        blob_name: &str,
        input: &DeleteBlobInput,
    ) -> Result<()> {
        let req = Self::request(Method::DELETE, container_name, blob_name)?
            .query_opt("snapshot", input.snapshot.as_deref())
            .header_opt(X_MS_DELETE_SNAPSHOTS, input.delete_snapshots.map(|d| d.as_str()))
            .header_opt(X_MS_LEASE_ID, input.lease_id.as_deref())
            .expect(&[StatusCode::ACCEPTED]);
        self.client.send(req).await?;
        Ok(())
    }

    /// Take a read-only snapshot and return its timestamp.
    pub async fn snapshot(
        &self,
        container_name: &str,
        blob_name: &str,
        metadata: &HashMap<String, String>,
        lease_id: Option<&str>,
    ) -> Result<String> {
        metadata::validate(metadata)?;

        let req = Self::request(Method::PUT, container_name, blob_name)?
            .query("comp", "snapshot")
            .metadata(metadata)
            .header_opt(X_MS_LEASE_ID, lease_id)
            .expect(&[StatusCode::CREATED]);

        let resp = self.client.send(req).await?;
        Ok(headers::require_str(resp.headers(), X_MS_SNAPSHOT)?.to_string())
    }

    /// Restore a soft-deleted blob and its snapshots.
    pub async fn undelete(&self, container_name: &str, blob_name: &str) -> Result<()> {
        self.client.require(Capability::BlobUndelete)?;

        let req = Self::request(Method::PUT, container_name, blob_name)?.query("comp", "undelete");
        self.client.send(req).await?;
        Ok(())
    }

    /// Move the blob to another access tier.
    ///
    /// Rehydrating from `Archive` is accepted with `202` and completes
    /// asynchronously.
    pub async fn set_tier(
        &self,
        container_name: &str,
        blob_name: &str,
        tier: &AccessTier,
        lease_id: Option<&str>,
    ) -> Result<()> {
        self.client.require(Capability::BlobAccessTier)?;

        let req = Self::request(Method::PUT, container_name, blob_name)?
            .query("comp", "tier")
            .header(properties::X_MS_ACCESS_TIER, tier)
            .header_opt(X_MS_LEASE_ID, lease_id)
            .expect(&[StatusCode::OK, StatusCode::ACCEPTED]);
        self.client.send(req).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use azstorage_core::{ApiVersion, Config, Context, ErrorKind};
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    fn blobs(version: ApiVersion) -> BlobsClient {
        BlobsClient::new(Client::new(
            Context::new(),
            Config::new("https://account1.blob.core.windows.net").with_api_version(version),
        ))
    }

    #[test_case("", "blob1", "`container_name` cannot be an empty string")]
    #[test_case("Container1", "blob1", "`container_name` must be a lower-cased string")]
    #[test_case("container1", "", "`blob_name` cannot be an empty string")]
    fn test_request_validation(container: &str, blob: &str, expected: &str) {
        let err = BlobsClient::request(Method::GET, container, blob).unwrap_err();
        assert_eq!(err.to_string(), expected);
    }

    #[tokio::test]
    async fn test_version_gated_operations() {
        let client = blobs(ApiVersion::V2018_03_28);

        let err = client.undelete("c1", "b1").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unsupported);

        let err = client
            .set_tier("c1", "b1", &AccessTier::Cool, None)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unsupported);
    }
}
