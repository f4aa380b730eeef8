// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

//! [`FileRead`] on `tokio::fs`.
//!
//! Chunked uploads from a local path read one range at a time through
//! [`TokioFileRead::file_read_range`], so large files are never held in
//! memory whole.
//!
//! ```no_run
//! use azstorage_core::Context;
//! use azstorage_file_read_tokio::TokioFileRead;
//!
//! # async fn example() -> azstorage_core::Result<()> {
//! let ctx = Context::new().with_file_read(TokioFileRead);
//! let len = ctx.file_len("/data/disk.vhd").await?;
//! # Ok(())
//! # }
//! ```

use std::io::SeekFrom;

use async_trait::async_trait;
use azstorage_core::{ByteRange, Error, FileRead, Result};
use bytes::Bytes;
use tokio::io::{AsyncReadExt, AsyncSeekExt};

#[derive(Debug, Clone, Copy, Default)]
pub struct TokioFileRead;

#[async_trait]
impl FileRead for TokioFileRead {
    async fn file_read(&self, path: &str) -> Result<Vec<u8>> {
        tokio::fs::read(path)
            .await
            .map_err(|e| Error::unexpected(format!("failed to read file {path}")).with_source(e))
    }

    async fn file_len(&self, path: &str) -> Result<u64> {
        let meta = tokio::fs::metadata(path)
            .await
            .map_err(|e| Error::unexpected(format!("failed to stat file {path}")).with_source(e))?;
        Ok(meta.len())
    }

    async fn file_read_range(&self, path: &str, range: ByteRange) -> Result<Bytes> {
        let mut f = tokio::fs::File::open(path)
            .await
            .map_err(|e| Error::unexpected(format!("failed to open file {path}")).with_source(e))?;
        f.seek(SeekFrom::Start(range.start())).await?;

        let mut buf = vec![0; range.len() as usize];
        f.read_exact(&mut buf).await.map_err(|e| {
            Error::unexpected(format!("failed to read {range} of file {path}")).with_source(e)
        })?;
        Ok(Bytes::from(buf))
    }
}
