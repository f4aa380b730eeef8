use std::collections::HashMap;

use azstorage_core::copy::{self, CopyProgress};
use azstorage_core::time::DateTime;
use azstorage_core::{headers, metadata, validate};
use azstorage_core::{Client, Result, StorageRequest};
use http::header::CONTENT_TYPE;
use http::{HeaderMap, Method, StatusCode};

use crate::smb;

mod copy_ops;
pub use copy_ops::{CopyFileInput, CopyFileResult};
mod id;
pub use id::FileId;
mod ranges;
pub use ranges::MAX_RANGE_SIZE;
mod transfer;

const X_MS_CONTENT_LENGTH: &str = "x-ms-content-length";

/// Standard http properties stored with a file, sent as `x-ms-content-*`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileContentSettings {
    pub content_type: Option<String>,
    pub content_encoding: Option<String>,
    pub content_language: Option<String>,
    pub content_disposition: Option<String>,
    pub cache_control: Option<String>,
    /// Base64 encoded MD5 of the whole file.
    pub content_md5: Option<String>,
}

impl FileContentSettings {
    fn apply(&self, req: StorageRequest) -> StorageRequest {
        req.header_opt("x-ms-content-type", self.content_type.as_deref())
            .header_opt("x-ms-content-encoding", self.content_encoding.as_deref())
            .header_opt("x-ms-content-language", self.content_language.as_deref())
            .header_opt("x-ms-content-disposition", self.content_disposition.as_deref())
            .header_opt("x-ms-cache-control", self.cache_control.as_deref())
            .header_opt("x-ms-content-md5", self.content_md5.as_deref())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateFileInput {
    /// Size of the new file. The content is zero-filled until written.
    pub content_length: u64,
    pub content: FileContentSettings,
    pub metadata: HashMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SetFilePropertiesInput {
    /// Resize the file, truncating or zero-filling it.
    pub content_length: Option<u64>,
    pub content: FileContentSettings,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileProperties {
    pub content_length: u64,
    pub content_type: Option<String>,
    pub etag: Option<String>,
    pub last_modified: Option<DateTime>,
    pub server_encrypted: bool,
    /// Set once a copy has targeted this file.
    pub copy: Option<CopyProgress>,
    pub copy_source: Option<String>,
    pub metadata: HashMap<String, String>,
}

impl FileProperties {
    fn from_headers(h: &HeaderMap) -> Result<Self> {
        let copy = match headers::get_str(h, copy::X_MS_COPY_STATUS) {
            Some(_) => Some(CopyProgress::from_headers(h)?),
            None => None,
        };

        Ok(Self {
            content_length: headers::parse_content_length(h)?.unwrap_or_default(),
            content_type: headers::get_string(h, CONTENT_TYPE.as_str()),
            etag: headers::parse_etag(h),
            last_modified: headers::parse_last_modified(h)?,
            server_encrypted: headers::parse_bool(h, "x-ms-server-encrypted")?.unwrap_or_default(),
            copy,
            copy_source: headers::get_string(h, "x-ms-copy-source"),
            metadata: metadata::from_headers(h),
        })
    }
}

/// Operations on files within a share.
///
/// Every operation takes the share name, the directory path (empty for the
/// share root) and the file name.
#[derive(Debug, Clone)]
pub struct FilesClient {
    client: Client,
}

impl FilesClient {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub(crate) fn check_names(share_name: &str, file_name: &str) -> Result<()> {
        validate::lower_case_name("share_name", share_name)?;
        validate::non_empty("file_name", file_name)
    }

    pub(crate) fn request(
        method: Method,
        share_name: &str,
        path: &str,
        file_name: &str,
    ) -> Result<StorageRequest> {
        Self::check_names(share_name, file_name)?;

        let path = path.trim_matches('/');
        let full = if path.is_empty() {
            format!("{share_name}/{file_name}")
        } else {
            format!("{share_name}/{path}/{file_name}")
        };
        Ok(StorageRequest::new(method, full))
    }

    /// Create a new file, or replace an existing one, of
    /// `input.content_length` bytes.
    pub async fn create(
        &self,
        share_name: &str,
        path: &str,
        file_name: &str,
        input: &CreateFileInput,
    ) -> Result<()> {
        metadata::validate(&input.metadata)?;

        let req = Self::request(Method::PUT, share_name, path, file_name)?
            .header("x-ms-type", "file")
            .header(X_MS_CONTENT_LENGTH, input.content_length)
            .metadata(&input.metadata)
            .expect(&[StatusCode::CREATED]);
        let req = smb::defaults(&self.client, input.content.apply(req), "None");
        self.client.send(req).await?;
        Ok(())
    }

    pub async fn delete(&self, share_name: &str, path: &str, file_name: &str) -> Result<()> {
        let req = Self::request(Method::DELETE, share_name, path, file_name)?
            .expect(&[StatusCode::ACCEPTED]);
        self.client.send(req).await?;
        Ok(())
    }

    pub async fn get_properties(
        &self,
        share_name: &str,
        path: &str,
        file_name: &str,
    ) -> Result<FileProperties> {
        let req = Self::request(Method::HEAD, share_name, path, file_name)?;
        let resp = self.client.send(req).await?;
        FileProperties::from_headers(resp.headers())
    }

    /// Replace the http properties. Unset fields are cleared on the file.
    pub async fn set_properties(
        &self,
        share_name: &str,
        path: &str,
        file_name: &str,
        input: &SetFilePropertiesInput,
    ) -> Result<()> {
        let req = Self::request(Method::PUT, share_name, path, file_name)?
            .query("comp", "properties")
            .header_opt(X_MS_CONTENT_LENGTH, input.content_length);
        let req = smb::preserve(&self.client, input.content.apply(req));
        self.client.send(req).await?;
        Ok(())
    }

    /// Replace all metadata of the file.
    pub async fn set_metadata(
        &self,
        share_name: &str,
        path: &str,
        file_name: &str,
        metadata: &HashMap<String, String>,
    ) -> Result<()> {
        metadata::validate(metadata)?;

        let req = Self::request(Method::PUT, share_name, path, file_name)?
            .query("comp", "metadata")
            .metadata(metadata);
        self.client.send(req).await?;
        Ok(())
    }
}
