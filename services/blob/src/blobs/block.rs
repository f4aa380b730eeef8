use std::collections::HashMap;

use azstorage_core::chunked::{self, TransferOptions};
use azstorage_core::utils::RedactedUrl;
use azstorage_core::{encoding, headers, metadata, validate, xml};
use azstorage_core::{ByteRange, Error, Result};
use bytes::Bytes;
use http::{Method, StatusCode};
use log::debug;
use serde::{Deserialize, Serialize};

use super::properties::{X_MS_ACCESS_TIER, X_MS_BLOB_TYPE};
use super::{AccessTier, BlobType, BlobsClient, ContentSettings};
use crate::lease::X_MS_LEASE_ID;

/// A block blob holds at most this many committed blocks.
const MAX_BLOCKS: usize = 50_000;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PutBlockBlobInput {
    pub content: ContentSettings,
    pub metadata: HashMap<String, String>,
    pub access_tier: Option<AccessTier>,
    pub lease_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PutBlockListInput {
    pub content: ContentSettings,
    pub metadata: HashMap<String, String>,
    pub access_tier: Option<AccessTier>,
    pub lease_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PutBlockBlobFromFileInput {
    pub transfer: TransferOptions,
    pub blob: PutBlockListInput,
}

/// Entry of a `Put Block List` body. The variant decides where the service
/// looks the block id up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum BlockListItem {
    Committed(String),
    Uncommitted(String),
    Latest(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename = "BlockList")]
pub struct BlockList {
    #[serde(rename = "$value")]
    pub blocks: Vec<BlockListItem>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockListType {
    All,
    Committed,
    Uncommitted,
}

impl BlockListType {
    fn as_str(&self) -> &'static str {
        match self {
            BlockListType::All => "all",
            BlockListType::Committed => "committed",
            BlockListType::Uncommitted => "uncommitted",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Block {
    /// Base64 block id.
    pub name: String,
    pub size: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GetBlockListResult {
    pub committed_blocks: Vec<Block>,
    pub uncommitted_blocks: Vec<Block>,
    pub etag: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct BlockListResponse {
    #[serde(default)]
    committed_blocks: Blocks,
    #[serde(default)]
    uncommitted_blocks: Blocks,
}

#[derive(Debug, Default, Deserialize)]
struct Blocks {
    #[serde(rename = "Block", default)]
    block: Vec<Block>,
}

impl BlobsClient {
    /// Upload the whole blob in a single request.
    pub async fn put_block_blob(
        &self,
        container_name: &str,
        blob_name: &str,
        content: Bytes,
        input: &PutBlockBlobInput,
    ) -> Result<()> {
        metadata::validate(&input.metadata)?;

        let req = Self::request(Method::PUT, container_name, blob_name)?
            .header(X_MS_BLOB_TYPE, BlobType::BlockBlob)
            .header_opt(X_MS_ACCESS_TIER, input.access_tier.as_ref())
            .header_opt(X_MS_LEASE_ID, input.lease_id.as_deref())
            .metadata(&input.metadata)
            .body(content, "application/octet-stream")
            .expect(&[StatusCode::CREATED]);
        self.client.send(input.content.apply(req)).await?;
        Ok(())
    }

    /// Stage one block to be committed by `put_block_list`.
    pub async fn put_block(
        &self,
        container_name: &str,
        blob_name: &str,
        block_id: &str,
        content: Bytes,
        lease_id: Option<&str>,
    ) -> Result<()> {
        validate::non_empty("block_id", block_id)?;
        if content.is_empty() {
            return Err(Error::invalid_input("`content` cannot be empty"));
        }

        let req = Self::request(Method::PUT, container_name, blob_name)?
            .query("comp", "block")
            .query("blockid", block_id)
            .header_opt(X_MS_LEASE_ID, lease_id)
            .body(content, "application/octet-stream")
            .expect(&[StatusCode::CREATED]);
        self.client.send(req).await?;
        Ok(())
    }

    /// Stage one block with content read by the service from `source_url`.
    pub async fn put_block_from_url(
        &self,
        container_name: &str,
        blob_name: &str,
        block_id: &str,
        source_url: &str,
        source_range: Option<ByteRange>,
        lease_id: Option<&str>,
    ) -> Result<()> {
        validate::non_empty("block_id", block_id)?;
        validate::non_empty("source_url", source_url)?;

        let req = Self::request(Method::PUT, container_name, blob_name)?
            .query("comp", "block")
            .query("blockid", block_id)
            .header("x-ms-copy-source", source_url)
            .header_opt("x-ms-source-range", source_range.map(|r| r.to_header()))
            .header_opt(X_MS_LEASE_ID, lease_id)
            .expect(&[StatusCode::CREATED]);

        debug!(
            "staging block {block_id} of {container_name}/{blob_name} from {}",
            RedactedUrl::from(source_url)
        );
        self.client.send(req).await?;
        Ok(())
    }

    /// Commit the given blocks, in order, as the blob content.
    pub async fn put_block_list(
        &self,
        container_name: &str,
        blob_name: &str,
        blocks: &BlockList,
        input: &PutBlockListInput,
    ) -> Result<()> {
        metadata::validate(&input.metadata)?;
        if blocks.blocks.len() > MAX_BLOCKS {
            return Err(Error::invalid_input(format!(
                "a block blob can hold at most {MAX_BLOCKS} blocks, got {}",
                blocks.blocks.len()
            )));
        }

        let req = Self::request(Method::PUT, container_name, blob_name)?
            .query("comp", "blocklist")
            .header_opt(X_MS_ACCESS_TIER, input.access_tier.as_ref())
            .header_opt(X_MS_LEASE_ID, input.lease_id.as_deref())
            .metadata(&input.metadata)
            .xml_body(blocks)?
            .expect(&[StatusCode::CREATED]);
        self.client.send(input.content.apply(req)).await?;
        Ok(())
    }

    pub async fn get_block_list(
        &self,
        container_name: &str,
        blob_name: &str,
        list_type: BlockListType,
        snapshot: Option<&str>,
        lease_id: Option<&str>,
    ) -> Result<GetBlockListResult> {
        let req = Self::request(Method::GET, container_name, blob_name)?
            .query("comp", "blocklist")
            .query("blocklisttype", list_type.as_str())
            .query_opt("snapshot", snapshot)
            .header_opt(X_MS_LEASE_ID, lease_id);

        let resp = self.client.send(req).await?;
        let list: BlockListResponse = xml::from_xml(resp.body())?;
        Ok(GetBlockListResult {
            committed_blocks: list.committed_blocks.block,
            uncommitted_blocks: list.uncommitted_blocks.block,
            etag: headers::parse_etag(resp.headers()),
        })
    }

    /// Upload a local file as a block blob.
    ///
    /// The file is split into `transfer.chunk_size` blocks which are staged
    /// with at most `transfer.parallelism` requests in flight, then
    /// committed in file order. An empty file becomes an empty blob. If any
    /// block fails nothing is committed and the blob is left unchanged.
    pub async fn put_block_blob_from_file(
        &self,
        container_name: &str,
        blob_name: &str,
        path: &str,
        input: &PutBlockBlobFromFileInput,
    ) -> Result<()> {
        // Validate names up front so an invalid request never reads the file.
        Self::check_names(container_name, blob_name)?;
        metadata::validate(&input.blob.metadata)?;

        let ctx = self.client.context();
        let total = ctx.file_len(path).await?;

        if total == 0 {
            let put = PutBlockBlobInput {
                content: input.blob.content.clone(),
                metadata: input.blob.metadata.clone(),
                access_tier: input.blob.access_tier.clone(),
                lease_id: input.blob.lease_id.clone(),
            };
            return self
                .put_block_blob(container_name, blob_name, Bytes::new(), &put)
                .await;
        }

        let chunk_size = input.transfer.chunk_size();
        let ranges = input.transfer.plan(total)?;
        if ranges.len() > MAX_BLOCKS {
            return Err(Error::invalid_input(format!(
                "{path} needs {} blocks of {chunk_size} bytes, at most {MAX_BLOCKS} are allowed",
                ranges.len()
            )));
        }

        debug!(
            "uploading {path} ({total} bytes) to {container_name}/{blob_name} in {} blocks",
            ranges.len()
        );
        let block_ids: Vec<String> = (0..ranges.len()).map(encoding::block_id).collect();

        chunked::upload_ranges(ranges, input.transfer.parallelism(), |range| {
            let block_id = block_ids[(range.start() / chunk_size) as usize].clone();
            async move {
                let content = ctx.file_read_range(path, range).await?;
                self.put_block(
                    container_name,
                    blob_name,
                    &block_id,
                    content,
                    input.blob.lease_id.as_deref(),
                )
                .await
            }
        })
        .await?;

        let blocks = BlockList {
            blocks: block_ids.into_iter().map(BlockListItem::Latest).collect(),
        };
        self.put_block_list(container_name, blob_name, &blocks, &input.blob)
            .await
    }
}
