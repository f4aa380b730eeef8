use std::collections::HashMap;
use std::time::Duration;

use azstorage_core::copy::{self, CopyProgress, CopyStatus};
use azstorage_core::utils::RedactedUrl;
use azstorage_core::{headers, metadata, validate};
use azstorage_core::{Error, Result};
use http::{Method, StatusCode};
use log::debug;

use super::properties::X_MS_ACCESS_TIER;
use super::{AccessTier, BlobsClient};
use crate::lease::X_MS_LEASE_ID;

const X_MS_COPY_SOURCE: &str = "x-ms-copy-source";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CopyInput {
    /// Metadata of the target. The source metadata is copied when empty.
    pub metadata: HashMap<String, String>,
    pub access_tier: Option<AccessTier>,
    /// Lease held on the target blob.
    pub lease_id: Option<String>,
    /// Lease held on the source blob.
    pub source_lease_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyResult {
    pub copy_id: String,
    pub copy_status: CopyStatus,
}

impl BlobsClient {
    /// Start a server-side copy of `source_url` into this blob.
    pub async fn copy(
        &self,
        container_name: &str,
        blob_name: &str,
        source_url: &str,
        input: &CopyInput,
    ) -> Result<CopyResult> {
        validate::non_empty("source_url", source_url)?;
        metadata::validate(&input.metadata)?;

        let req = Self::request(Method::PUT, container_name, blob_name)?
            .header(X_MS_COPY_SOURCE, source_url)
            .header_opt(X_MS_ACCESS_TIER, input.access_tier.as_ref())
            .header_opt(X_MS_LEASE_ID, input.lease_id.as_deref())
            .header_opt("x-ms-source-lease-id", input.source_lease_id.as_deref())
            .metadata(&input.metadata)
            .expect(&[StatusCode::ACCEPTED]);

        let resp = self.client.send(req).await?;
        let h = resp.headers();
        Ok(CopyResult {
            copy_id: headers::require_str(h, copy::X_MS_COPY_ID)?.to_string(),
            copy_status: headers::require_str(h, copy::X_MS_COPY_STATUS)?.parse()?,
        })
    }

    /// Start an incremental copy from a snapshot of a page blob.
    ///
    /// `source_url` must carry the `snapshot` query parameter.
    pub async fn incremental_copy(
        &self,
        container_name: &str,
        blob_name: &str,
        source_url: &str,
    ) -> Result<CopyResult> {
        validate::non_empty("source_url", source_url)?;

        let req = Self::request(Method::PUT, container_name, blob_name)?
            .query("comp", "incrementalcopy")
            .header(X_MS_COPY_SOURCE, source_url)
            .expect(&[StatusCode::ACCEPTED]);

        let resp = self.client.send(req).await?;
        let h = resp.headers();
        Ok(CopyResult {
            copy_id: headers::require_str(h, copy::X_MS_COPY_ID)?.to_string(),
            copy_status: headers::require_str(h, copy::X_MS_COPY_STATUS)?.parse()?,
        })
    }

    /// Abort a pending copy, leaving an empty target blob behind.
    pub async fn abort_copy(
        &self,
        container_name: &str,
        blob_name: &str,
        copy_id: &str,
        lease_id: Option<&str>,
    ) -> Result<()> {
        validate::non_empty("copy_id", copy_id)?;

        let req = Self::request(Method::PUT, container_name, blob_name)?
            .query("comp", "copy")
            .query("copyid", copy_id)
            .header("x-ms-copy-action", "abort")
            .header_opt(X_MS_LEASE_ID, lease_id)
            .expect(&[StatusCode::NO_CONTENT]);
        self.client.send(req).await?;
        Ok(())
    }

    /// Copy `source_url` into this blob and wait until the copy finishes.
    ///
    /// Pending copies are polled through `get_properties` every
    /// `poll_interval`, using the target lease if one is given. A failed or
    /// aborted copy is returned as an error.
    pub async fn copy_and_wait(
        &self,
        container_name: &str,
        blob_name: &str,
        source_url: &str,
        input: &CopyInput,
        poll_interval: Duration,
    ) -> Result<CopyProgress> {
        let started = self.copy(container_name, blob_name, source_url, input).await?;
        debug!(
            "copy {} from {} into {container_name}/{blob_name} started: {}",
            started.copy_id,
            RedactedUrl::from(source_url),
            started.copy_status
        );

        let copy_id = &started.copy_id;
        let lease_id = input.lease_id.as_deref();
        copy::wait_for_copy(poll_interval, move || async move {
            let props = self
                .get_properties(container_name, blob_name, None, lease_id)
                .await?;
            props.copy.ok_or_else(|| {
                Error::unexpected(format!(
                    "{container_name}/{blob_name} reports no copy status after starting copy {copy_id}"
                ))
            })
        })
        .await
    }
}
