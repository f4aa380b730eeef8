use std::collections::HashMap;

use azstorage_core::{headers, metadata};
use azstorage_core::{Error, Result};
use bytes::Bytes;
use http::{Method, StatusCode};

use super::properties::X_MS_BLOB_TYPE;
use super::{BlobType, BlobsClient, ContentSettings};
use crate::lease::X_MS_LEASE_ID;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PutAppendBlobInput {
    pub content: ContentSettings,
    pub metadata: HashMap<String, String>,
    pub lease_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppendBlockInput {
    /// MD5 of this block, checked by the service.
    pub content_md5: Option<String>,
    /// Fail if the blob would grow beyond this many bytes.
    pub max_size: Option<u64>,
    /// Fail unless the blob is exactly this long before appending.
    pub append_position: Option<u64>,
    pub lease_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppendBlockResult {
    /// Offset at which the block was appended.
    pub append_offset: u64,
    pub committed_block_count: u64,
    pub etag: Option<String>,
}

impl BlobsClient {
    /// Create an empty append blob, replacing any existing blob.
    pub async fn put_append_blob(
        &self,
        container_name: &str,
        blob_name: &str,
        input: &PutAppendBlobInput,
    ) -> Result<()> {
        metadata::validate(&input.metadata)?;

        let req = Self::request(Method::PUT, container_name, blob_name)?
            .header(X_MS_BLOB_TYPE, BlobType::AppendBlob)
            .header_opt(X_MS_LEASE_ID, input.lease_id.as_deref())
            .metadata(&input.metadata)
            .expect(&[StatusCode::CREATED]);
        self.client.send(input.content.apply(req)).await?;
        Ok(())
    }

    /// Append a block to the end of an append blob.
    pub async fn append_block(
        &self,
        container_name: &str,
        blob_name: &str,
        content: Bytes,
        input: &AppendBlockInput,
    ) -> Result<AppendBlockResult> {
        if content.is_empty() {
            return Err(Error::invalid_input("`content` cannot be empty"));
        }

        let req = Self::request(Method::PUT, container_name, blob_name)?
            .query("comp", "appendblock")
            .header_opt("content-md5", input.content_md5.as_deref())
            .header_opt("x-ms-blob-condition-maxsize", input.max_size)
            .header_opt("x-ms-blob-condition-appendpos", input.append_position)
            .header_opt(X_MS_LEASE_ID, input.lease_id.as_deref())
            .body(content, "application/octet-stream")
            .expect(&[StatusCode::CREATED]);

        let resp = self.client.send(req).await?;
        let h = resp.headers();
        Ok(AppendBlockResult {
            append_offset: headers::parse(h, "x-ms-blob-append-offset")?.unwrap_or_default(),
            committed_block_count: headers::parse(h, "x-ms-blob-committed-block-count")?
                .unwrap_or_default(),
            etag: headers::parse_etag(h),
        })
    }
}
