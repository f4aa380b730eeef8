use std::collections::HashMap;

use azstorage_core::time::DateTime;
use azstorage_core::{headers, metadata, validate};
use azstorage_core::{Client, Result, StorageRequest};
use http::{Method, StatusCode};

use crate::smb;

mod id;
pub use id::DirectoryId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryProperties {
    pub etag: Option<String>,
    pub last_modified: Option<DateTime>,
    pub server_encrypted: bool,
    pub metadata: HashMap<String, String>,
}

/// Operations on directories within a share.
///
/// `path` is slash separated and relative to the share root. Parent
/// directories must exist.
#[derive(Debug, Clone)]
pub struct DirectoriesClient {
    client: Client,
}

impl DirectoriesClient {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn request(method: Method, share_name: &str, path: &str) -> Result<StorageRequest> {
        validate::lower_case_name("share_name", share_name)?;
        validate::non_empty("path", path)?;
        Ok(StorageRequest::new(method, format!("{share_name}/{path}")).query("restype", "directory"))
    }

    pub async fn create(
        &self,
        share_name: &str,
        path: &str,
        metadata: &HashMap<String, String>,
    ) -> Result<()> {
        metadata::validate(metadata)?;

        let req = Self::request(Method::PUT, share_name, path)?
            .metadata(metadata)
            .expect(&[StatusCode::CREATED]);
        self.client
            .send(smb::defaults(&self.client, req, "Directory"))
            .await?;
        Ok(())
    }

    /// Delete an empty directory.
    pub async fn delete(&self, share_name: &str, path: &str) -> Result<()> {
        let req = Self::request(Method::DELETE, share_name, path)?.expect(&[StatusCode::ACCEPTED]);
        self.client.send(req).await?;
        Ok(())
    }

    pub async fn get(&self, share_name: &str, path: &str) -> Result<DirectoryProperties> {
        let req = Self::request(Method::GET, share_name, path)?;
        let resp = self.client.send(req).await?;

        let h = resp.headers();
        Ok(DirectoryProperties {
            etag: headers::parse_etag(h),
            last_modified: headers::parse_last_modified(h)?,
            server_encrypted: headers::parse_bool(h, "x-ms-server-encrypted")?.unwrap_or_default(),
            metadata: metadata::from_headers(h),
        })
    }

    /// Replace all metadata of the directory.
    pub async fn set_metadata(
        &self,
        share_name: &str,
        path: &str,
        metadata: &HashMap<String, String>,
    ) -> Result<()> {
        metadata::validate(metadata)?;

        let req = Self::request(Method::PUT, share_name, path)?
            .query("comp", "metadata")
            .metadata(metadata);
        self.client.send(req).await?;
        Ok(())
    }
}
