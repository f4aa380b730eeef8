use azstorage_core::chunked::{self, TransferOptions};
use azstorage_core::{Error, Result};
use bytes::Bytes;
use log::debug;

use super::{FileProperties, FilesClient, MAX_RANGE_SIZE};

fn check_options(options: &TransferOptions) -> Result<()> {
    if options.chunk_size() > MAX_RANGE_SIZE {
        return Err(Error::invalid_input(format!(
            "chunk size {} exceeds the {MAX_RANGE_SIZE} byte range limit of the file service",
            options.chunk_size()
        )));
    }
    Ok(())
}

impl FilesClient {
    /// Write `content` into an existing file in ranges of
    /// `options.chunk_size()` bytes.
    ///
    /// The file must already exist with room for the content; see
    /// [`FilesClient::create`].
    pub async fn put_file(
        &self,
        share_name: &str,
        path: &str,
        file_name: &str,
        content: Bytes,
        options: &TransferOptions,
    ) -> Result<()> {
        check_options(options)?;
        Self::check_names(share_name, file_name)?;

        let ranges = options.plan(content.len() as u64)?;
        debug!(
            "uploading {} bytes to {share_name}/{file_name} in {} ranges",
            content.len(),
            ranges.len()
        );

        let content = &content;
        chunked::upload_ranges(ranges, options.parallelism(), move |range| async move {
            let chunk = content.slice(range.start() as usize..=range.end() as usize);
            self.put_byte_range(share_name, path, file_name, range, chunk)
                .await
        })
        .await
    }

    /// Like [`FilesClient::put_file`], reading each range from the local
    /// file at `local_path` as it is sent.
    pub async fn put_file_from_path(
        &self,
        share_name: &str,
        path: &str,
        file_name: &str,
        local_path: &str,
        options: &TransferOptions,
    ) -> Result<()> {
        check_options(options)?;
        Self::check_names(share_name, file_name)?;

        let ctx = self.client.context();
        let total = ctx.file_len(local_path).await?;
        let ranges = options.plan(total)?;
        debug!(
            "uploading {local_path} ({total} bytes) to {share_name}/{file_name} in {} ranges",
            ranges.len()
        );

        chunked::upload_ranges(ranges, options.parallelism(), move |range| async move {
            let chunk = ctx.file_read_range(local_path, range).await?;
            self.put_byte_range(share_name, path, file_name, range, chunk)
                .await
        })
        .await
    }

    /// Download the whole file in ranges and return it with its properties.
    pub async fn get_file(
        &self,
        share_name: &str,
        path: &str,
        file_name: &str,
        options: &TransferOptions,
    ) -> Result<(FileProperties, Bytes)> {
        check_options(options)?;

        let props = self.get_properties(share_name, path, file_name).await?;
        let total = props.content_length;
        let ranges = options.plan(total)?;
        debug!(
            "downloading {share_name}/{file_name} ({total} bytes) in {} ranges",
            ranges.len()
        );

        let content = chunked::download_ranges(
            total,
            ranges,
            options.parallelism(),
            move |range| async move {
                self.get_byte_range(share_name, path, file_name, range)
                    .await
            },
        )
        .await?;
        Ok((props, content))
    }
}
