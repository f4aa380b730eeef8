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

use std::collections::HashMap;
use std::fmt::{self, Debug};
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;

use crate::{ByteRange, Error, Result};

/// Runtime components shared by every client: the HTTP transport, local file
/// access for chunked uploads and environment lookups.
///
/// Nothing is wired in by default. A fresh context fails every HTTP send and
/// file read and sees an empty environment, so plug in the pieces a client
/// needs:
///
/// ```
/// use azstorage_core::{Context, OsEnv};
///
/// let ctx = Context::new().with_env(OsEnv);
/// let endpoint = ctx.env_var("AZURE_STORAGE_ENDPOINT");
/// ```
#[derive(Clone)]
pub struct Context {
    file_read: Arc<dyn FileRead>,
    http_send: Arc<dyn HttpSend>,
    env: Arc<dyn Env>,
}

impl Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("file_read", &self.file_read)
            .field("http_send", &self.http_send)
            .field("env", &self.env)
            .finish()
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

impl Context {
    pub fn new() -> Self {
        Self {
            file_read: Arc::new(NoopFileRead),
            http_send: Arc::new(NoopHttpSend),
            env: Arc::new(NoopEnv),
        }
    }

    pub fn with_file_read(mut self, file_read: impl FileRead) -> Self {
        self.file_read = Arc::new(file_read);
        self
    }

    pub fn with_http_send(mut self, http_send: impl HttpSend) -> Self {
        self.http_send = Arc::new(http_send);
        self
    }

    pub fn with_env(mut self, env: impl Env) -> Self {
        self.env = Arc::new(env);
        self
    }

    #[inline]
    pub async fn file_read(&self, path: &str) -> Result<Vec<u8>> {
        self.file_read.file_read(path).await
    }

    #[inline]
    pub async fn file_len(&self, path: &str) -> Result<u64> {
        self.file_read.file_len(path).await
    }

    #[inline]
    pub async fn file_read_range(&self, path: &str, range: ByteRange) -> Result<Bytes> {
        self.file_read.file_read_range(path, range).await
    }

    #[inline]
    pub async fn http_send(&self, req: http::Request<Bytes>) -> Result<http::Response<Bytes>> {
        self.http_send.http_send(req).await
    }

    /// Value of `key`, `None` when unset or not valid unicode.
    #[inline]
    pub fn env_var(&self, key: &str) -> Option<String> {
        self.env.var(key)
    }

    #[inline]
    pub fn env_vars(&self) -> HashMap<String, String> {
        self.env.vars()
    }
}

/// Local file access, used as the source of chunked uploads.
#[async_trait]
pub trait FileRead: Debug + Send + Sync + 'static {
    async fn file_read(&self, path: &str) -> Result<Vec<u8>>;

    /// Length of the file in bytes. Falls back to reading the whole file.
    async fn file_len(&self, path: &str) -> Result<u64> {
        Ok(self.file_read(path).await?.len() as u64)
    }

    /// Bytes of `range`, which must lie inside the file. Falls back to
    /// reading the whole file and slicing it.
    async fn file_read_range(&self, path: &str, range: ByteRange) -> Result<Bytes> {
        let content = Bytes::from(self.file_read(path).await?);
        let (start, end) = (range.start() as usize, range.end() as usize + 1);
        if end > content.len() {
            return Err(Error::invalid_input(format!(
                "range {range} is out of bounds for file {path} of {} bytes",
                content.len()
            )));
        }
        Ok(content.slice(start..end))
    }
}

/// Transport for the requests built by [`crate::Client`].
///
/// Implementations must not retry. Every error reaches the caller as-is.
#[async_trait]
pub trait HttpSend: Debug + Send + Sync + 'static {
    async fn http_send(&self, req: http::Request<Bytes>) -> Result<http::Response<Bytes>>;
}

/// Source of environment variables, see [`crate::Config::from_env`].
pub trait Env: Debug + Send + Sync + 'static {
    fn var(&self, key: &str) -> Option<String>;

    fn vars(&self) -> HashMap<String, String>;
}

/// Environment of the current process.
#[derive(Debug, Copy, Clone)]
pub struct OsEnv;

impl Env for OsEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var_os(key)?.into_string().ok()
    }

    fn vars(&self) -> HashMap<String, String> {
        std::env::vars().collect()
    }
}

/// Fixed set of variables, handy in tests.
#[derive(Debug, Clone, Default)]
pub struct StaticEnv {
    pub envs: HashMap<String, String>,
}

impl Env for StaticEnv {
    fn var(&self, key: &str) -> Option<String> {
        self.envs.get(key).cloned()
    }

    fn vars(&self) -> HashMap<String, String> {
        self.envs.clone()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoopFileRead;

#[async_trait]
impl FileRead for NoopFileRead {
    async fn file_read(&self, path: &str) -> Result<Vec<u8>> {
        Err(Error::unexpected(format!(
            "cannot read {path}: the context has no file reader"
        )))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoopHttpSend;

#[async_trait]
impl HttpSend for NoopHttpSend {
    async fn http_send(&self, req: http::Request<Bytes>) -> Result<http::Response<Bytes>> {
        Err(Error::transport(format!(
            "cannot send {} {}: the context has no http client",
            req.method(),
            req.uri()
        )))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoopEnv;

impl Env for NoopEnv {
    fn var(&self, _: &str) -> Option<String> {
        None
    }

    fn vars(&self) -> HashMap<String, String> {
        HashMap::new()
    }
}
