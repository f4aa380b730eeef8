use std::collections::HashMap;
use std::time::Duration;

use azstorage_core::copy::{self, CopyProgress, CopyStatus};
use azstorage_core::utils::RedactedUrl;
use azstorage_core::{headers, metadata, validate};
use azstorage_core::{Error, Result};
use http::{Method, StatusCode};
use log::debug;

use super::FilesClient;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CopyFileInput {
    /// Metadata of the target. The source metadata is copied when empty.
    pub metadata: HashMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyFileResult {
    pub copy_id: String,
    pub copy_status: CopyStatus,
}

impl FilesClient {
    /// Start a server-side copy of `source_url` into this file.
    ///
    /// The source may be a file or a blob in any account the service can
    /// reach with the credentials embedded in the url.
    pub async fn copy(
        &self,
        share_name: &str,
        path: &str,
        file_name: &str,
        source_url: &str,
        input: &CopyFileInput,
    ) -> Result<CopyFileResult> {
        validate::non_empty("source_url", source_url)?;
        metadata::validate(&input.metadata)?;

        let req = Self::request(Method::PUT, share_name, path, file_name)?
            .header("x-ms-copy-source", source_url)
            .metadata(&input.metadata)
            .expect(&[StatusCode::ACCEPTED]);

        let resp = self.client.send(req).await?;
        let h = resp.headers();
        Ok(CopyFileResult {
            copy_id: headers::require_str(h, copy::X_MS_COPY_ID)?.to_string(),
            copy_status: headers::require_str(h, copy::X_MS_COPY_STATUS)?.parse()?,
        })
    }

    /// Abort a pending copy, leaving a zero-filled target behind.
    pub async fn abort_copy(
        &self,
        share_name: &str,
        path: &str,
        file_name: &str,
        copy_id: &str,
    ) -> Result<()> {
        validate::non_empty("copy_id", copy_id)?;

        let req = Self::request(Method::PUT, share_name, path, file_name)?
            .query("comp", "copy")
            .query("copyid", copy_id)
            .header("x-ms-copy-action", "abort")
            .expect(&[StatusCode::NO_CONTENT]);
        self.client.send(req).await?;
        Ok(())
    }

    /// Copy `source_url` into this file and poll its properties every
    /// `poll_interval` until the copy finishes.
    pub async fn copy_and_wait(
        &self,
        share_name: &str,
        path: &str,
        file_name: &str,
        source_url: &str,
        input: &CopyFileInput,
        poll_interval: Duration,
    ) -> Result<CopyProgress> {
        let started = self
            .copy(share_name, path, file_name, source_url, input)
            .await?;
        debug!(
            "copy {} from {} into {share_name}/{file_name} started: {}",
            started.copy_id,
            RedactedUrl::from(source_url),
            started.copy_status
        );

        let copy_id = &started.copy_id;
        copy::wait_for_copy(poll_interval, move || async move {
            let props = self.get_properties(share_name, path, file_name).await?;
            props.copy.ok_or_else(|| {
                Error::unexpected(format!(
                    "{share_name}/{file_name} reports no copy status after starting copy {copy_id}"
                ))
            })
        })
        .await
    }
}
