use std::collections::HashMap;

use azstorage_core::{headers, metadata, xml};
use azstorage_core::{ByteRange, Error, Result};
use bytes::Bytes;
use http::{Method, StatusCode};
use serde::Deserialize;

use super::properties::{X_MS_ACCESS_TIER, X_MS_BLOB_TYPE};
use super::{AccessTier, BlobType, BlobsClient, ContentSettings, X_MS_RANGE};
use crate::lease::X_MS_LEASE_ID;

/// Page blobs are written in 512 byte pages.
pub const PAGE_SIZE: u64 = 512;

const MAX_PAGE_WRITE: u64 = 4 * 1024 * 1024;
const X_MS_PAGE_WRITE: &str = "x-ms-page-write";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PutPageBlobInput {
    /// Maximum size of the blob, a multiple of 512.
    pub size: u64,
    pub sequence_number: Option<u64>,
    /// Premium tier such as `P10`.
    pub access_tier: Option<AccessTier>,
    pub content: ContentSettings,
    pub metadata: HashMap<String, String>,
    pub lease_id: Option<String>,
}

/// Valid and cleared ranges of a page blob.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageRanges {
    pub page_ranges: Vec<ByteRange>,
    pub clear_ranges: Vec<ByteRange>,
    pub blob_content_length: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct PageList {
    #[serde(rename = "PageRange", default)]
    page_range: Vec<RangeXml>,
    #[serde(rename = "ClearRange", default)]
    clear_range: Vec<RangeXml>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RangeXml {
    start: u64,
    end: u64,
}

fn check_aligned(range: ByteRange) -> Result<()> {
    if range.start() % PAGE_SIZE != 0 || range.len() % PAGE_SIZE != 0 {
        return Err(Error::invalid_input(format!(
            "page range {range} must start and end on a {PAGE_SIZE} byte boundary"
        )));
    }
    Ok(())
}

impl BlobsClient {
    /// Create an empty page blob of `input.size` bytes.
    pub async fn put_page_blob(
        &self,
        container_name: &str,
        blob_name: &str,
        input: &PutPageBlobInput,
    ) -> Result<()> {
        if input.size % PAGE_SIZE != 0 {
            return Err(Error::invalid_input(format!(
                "page blob size must be a multiple of {PAGE_SIZE}, got {}",
                input.size
            )));
        }
        metadata::validate(&input.metadata)?;

        let req = Self::request(Method::PUT, container_name, blob_name)?
            .header(X_MS_BLOB_TYPE, BlobType::PageBlob)
            .header("x-ms-blob-content-length", input.size)
            .header_opt("x-ms-blob-sequence-number", input.sequence_number)
            .header_opt(X_MS_ACCESS_TIER, input.access_tier.as_ref())
            .header_opt(X_MS_LEASE_ID, input.lease_id.as_deref())
            .metadata(&input.metadata)
            .expect(&[StatusCode::CREATED]);
        self.client.send(input.content.apply(req)).await?;
        Ok(())
    }

    /// Write `content` at `offset`. Both must be page aligned and at most
    /// 4 MiB can be written at once.
    pub async fn put_page_update(
        &self,
        container_name: &str,
        blob_name: &str,
        offset: u64,
        content: Bytes,
        lease_id: Option<&str>,
    ) -> Result<()> {
        let range = ByteRange::from_offset(offset, content.len() as u64)?;
        check_aligned(range)?;
        if range.len() > MAX_PAGE_WRITE {
            return Err(Error::invalid_input(format!(
                "at most {MAX_PAGE_WRITE} bytes can be written at once, got {}",
                range.len()
            )));
        }

        let req = Self::request(Method::PUT, container_name, blob_name)?
            .query("comp", "page")
            .header(X_MS_PAGE_WRITE, "update")
            .header(X_MS_RANGE, range.to_header())
            .header_opt(X_MS_LEASE_ID, lease_id)
            .body(content, "application/octet-stream")
            .expect(&[StatusCode::CREATED]);
        self.client.send(req).await?;
        Ok(())
    }

    /// Release the pages in `range`.
    pub async fn put_page_clear(
        &self,
        container_name: &str,
        blob_name: &str,
        range: ByteRange,
        lease_id: Option<&str>,
    ) -> Result<()> {
        check_aligned(range)?;

        let req = Self::request(Method::PUT, container_name, blob_name)?
            .query("comp", "page")
            .header(X_MS_PAGE_WRITE, "clear")
            .header(X_MS_RANGE, range.to_header())
            .header_opt(X_MS_LEASE_ID, lease_id)
            .expect(&[StatusCode::CREATED]);
        self.client.send(req).await?;
        Ok(())
    }

    pub async fn get_page_ranges(
        &self,
        container_name: &str,
        blob_name: &str,
        range: Option<ByteRange>,
        snapshot: Option<&str>,
        lease_id: Option<&str>,
    ) -> Result<PageRanges> {
        let req = Self::request(Method::GET, container_name, blob_name)?
            .query("comp", "pagelist")
            .query_opt("snapshot", snapshot)
            .header_opt(X_MS_RANGE, range.map(|r| r.to_header()))
            .header_opt(X_MS_LEASE_ID, lease_id);

        let resp = self.client.send(req).await?;
        let list: PageList = xml::from_xml(resp.body())?;
        let convert = |ranges: Vec<RangeXml>| -> Result<Vec<ByteRange>> {
            ranges
                .into_iter()
                .map(|r| ByteRange::new(r.start, r.end))
                .collect()
        };

        Ok(PageRanges {
            page_ranges: convert(list.page_range)?,
            clear_ranges: convert(list.clear_range)?,
            blob_content_length: headers::parse(resp.headers(), "x-ms-blob-content-length")?,
        })
    }
}
