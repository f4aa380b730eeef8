use azstorage_core::{xml, ByteRange, Error, Result};
use bytes::Bytes;
use http::{Method, StatusCode};
use serde::Deserialize;

use super::FilesClient;

/// A single range write or read moves at most 4 MiB.
pub const MAX_RANGE_SIZE: u64 = 4 * 1024 * 1024;

const X_MS_RANGE: &str = "x-ms-range";
const X_MS_WRITE: &str = "x-ms-write";

#[derive(Debug, Default, Deserialize)]
struct Ranges {
    #[serde(rename = "Range", default)]
    range: Vec<RangeXml>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RangeXml {
    start: u64,
    end: u64,
}

fn check_size(range: ByteRange) -> Result<()> {
    if range.len() > MAX_RANGE_SIZE {
        return Err(Error::invalid_input(format!(
            "range {range} is {} bytes, at most {MAX_RANGE_SIZE} are allowed",
            range.len()
        )));
    }
    Ok(())
}

impl FilesClient {
    /// Write `content` at `range`. The range must match the content length.
    pub async fn put_byte_range(
        &self,
        share_name: &str,
        path: &str,
        file_name: &str,
        range: ByteRange,
        content: Bytes,
    ) -> Result<()> {
        check_size(range)?;
        if content.len() as u64 != range.len() {
            return Err(Error::invalid_input(format!(
                "range {range} covers {} bytes but {} were given",
                range.len(),
                content.len()
            )));
        }

        let req = Self::request(Method::PUT, share_name, path, file_name)?
            .query("comp", "range")
            .header(X_MS_WRITE, "update")
            .header(X_MS_RANGE, range.to_header())
            .body(content, "application/octet-stream")
            .expect(&[StatusCode::CREATED]);
        self.client.send(req).await?;
        Ok(())
    }

    pub async fn get_byte_range(
        &self,
        share_name: &str,
        path: &str,
        file_name: &str,
        range: ByteRange,
    ) -> Result<Bytes> {
        check_size(range)?;

        let req = Self::request(Method::GET, share_name, path, file_name)?
            .header(X_MS_RANGE, range.to_header())
            .expect(&[StatusCode::OK, StatusCode::PARTIAL_CONTENT]);
        let resp = self.client.send(req).await?;
        Ok(resp.into_body())
    }

    /// Release the storage behind `range`. Cleared bytes read as zero.
    pub async fn clear_byte_range(
        &self,
        share_name: &str,
        path: &str,
        file_name: &str,
        range: ByteRange,
    ) -> Result<()> {
        let req = Self::request(Method::PUT, share_name, path, file_name)?
            .query("comp", "range")
            .header(X_MS_WRITE, "clear")
            .header(X_MS_RANGE, range.to_header())
            .expect(&[StatusCode::CREATED]);
        self.client.send(req).await?;
        Ok(())
    }

    /// List the ranges holding data, optionally within `range`.
    pub async fn list_ranges(
        &self,
        share_name: &str,
        path: &str,
        file_name: &str,
        range: Option<ByteRange>,
    ) -> Result<Vec<ByteRange>> {
        let req = Self::request(Method::GET, share_name, path, file_name)?
            .query("comp", "rangelist")
            .header_opt(X_MS_RANGE, range.map(|r| r.to_header()));
        let resp = self.client.send(req).await?;

        let ranges: Ranges = xml::from_xml(resp.body())?;
        ranges
            .range
            .into_iter()
            .map(|r| ByteRange::new(r.start, r.end))
            .collect()
    }
}
