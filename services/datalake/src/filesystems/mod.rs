use std::collections::HashMap;

use azstorage_core::time::DateTime;
use azstorage_core::{encoding, headers, validate};
use azstorage_core::{Capability, Client, Result, StorageRequest};
use http::{Method, StatusCode};
use log::debug;

mod id;
pub use id::FileSystemId;
mod list;
pub use list::{FileSystemItem, ListFileSystemsInput, ListFileSystemsResult};

const X_MS_PROPERTIES: &str = "x-ms-properties";
const X_MS_NAMESPACE_ENABLED: &str = "x-ms-namespace-enabled";
const X_MS_CONTINUATION: &str = "x-ms-continuation";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileSystemProperties {
    pub properties: HashMap<String, String>,
    /// Whether the account has a hierarchical namespace.
    pub namespace_enabled: bool,
    pub etag: Option<String>,
    pub last_modified: Option<DateTime>,
}

/// Operations on Data Lake file systems.
#[derive(Debug, Clone)]
pub struct FileSystemsClient {
    client: Client,
}

impl FileSystemsClient {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn request(&self, method: Method, file_system_name: &str) -> Result<StorageRequest> {
        self.client.require(Capability::DataLakeFileSystems)?;
        validate::non_empty("file_system_name", file_system_name)?;

        Ok(StorageRequest::new(method, file_system_name).query("resource", "filesystem"))
    }

    pub async fn create(
        &self,
        file_system_name: &str,
        properties: &HashMap<String, String>,
    ) -> Result<()> {
        validate::length_between("file_system_name", file_system_name, 3, 63)?;

        let req = self
            .request(Method::PUT, file_system_name)?
            .header(X_MS_PROPERTIES, encoding::encode_properties(properties))
            .expect(&[StatusCode::CREATED]);

        debug!("creating file system {file_system_name}");
        self.client.send(req).await?;
        Ok(())
    }

    /// Mark the file system for deletion. The service removes it, and every
    /// path inside, asynchronously.
    pub async fn delete(&self, file_system_name: &str) -> Result<()> {
        let req = self
            .request(Method::DELETE, file_system_name)?
            .expect(&[StatusCode::ACCEPTED]);
        self.client.send(req).await?;
        Ok(())
    }

    pub async fn get_properties(&self, file_system_name: &str) -> Result<FileSystemProperties> {
        let req = self.request(Method::HEAD, file_system_name)?;
        let resp = self.client.send(req).await?;

        let h = resp.headers();
        let properties = match headers::get_str(h, X_MS_PROPERTIES) {
            Some(v) => encoding::decode_properties(v)?,
            None => HashMap::new(),
        };
        Ok(FileSystemProperties {
            properties,
            namespace_enabled: headers::parse_bool(h, X_MS_NAMESPACE_ENABLED)?.unwrap_or_default(),
            etag: headers::parse_etag(h),
            last_modified: headers::parse_last_modified(h)?,
        })
    }

    /// List one page of file systems. Pass `continuation` back in the input
    /// to fetch the next page.
    pub async fn list(&self, input: &ListFileSystemsInput) -> Result<ListFileSystemsResult> {
        self.client.require(Capability::DataLakeFileSystems)?;
        if let Some(max) = input.max_results {
            validate::in_range("max_results", max, 1, u32::MAX)?;
        }

        let req = input.apply(StorageRequest::get("").query("resource", "account"));
        let resp = self.client.send(req).await?;

        let list: list::FileSystemList = serde_json::from_slice(resp.body())?;
        Ok(ListFileSystemsResult {
            file_systems: list.filesystems,
            continuation: headers::get_string(resp.headers(), X_MS_CONTINUATION)
                .filter(|c| !c.is_empty()),
        })
    }

    /// Replace all properties of the file system.
    pub async fn set_properties(
        &self,
        file_system_name: &str,
        properties: &HashMap<String, String>,
    ) -> Result<()> {
        let req = self
            .request(Method::PATCH, file_system_name)?
            .header(X_MS_PROPERTIES, encoding::encode_properties(properties));
        self.client.send(req).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use azstorage_core::{ApiVersion, Config, Context, ErrorKind};
    use pretty_assertions::assert_eq;

    fn client(version: ApiVersion) -> FileSystemsClient {
        FileSystemsClient::new(Client::new(
            Context::new(),
            Config::new("https://account1.dfs.core.windows.net").with_api_version(version),
        ))
    }

    #[test]
    fn test_request() {
        let req = client(ApiVersion::V2020_08_04)
            .request(Method::HEAD, "FileSystem1")
            .unwrap();
        assert_eq!(
            req.url("https://account1.dfs.core.windows.net"),
            "https://account1.dfs.core.windows.net/FileSystem1?resource=filesystem"
        );
    }

    #[test]
    fn test_request_requires_capability() {
        let err = client(ApiVersion::V2017_07_29)
            .request(Method::PUT, "fs1")
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unsupported);
    }

    #[tokio::test]
    async fn test_list_rejects_zero_max_results() {
        let input = ListFileSystemsInput {
            max_results: Some(0),
            ..Default::default()
        };
        let err = client(ApiVersion::V2020_08_04).list(&input).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[tokio::test]
    async fn test_list_requires_capability() {
        let err = client(ApiVersion::V2017_07_29)
            .list(&ListFileSystemsInput::default())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unsupported);
    }

    #[tokio::test]
    async fn test_create_rejects_short_name() {
        let err = client(ApiVersion::V2020_08_04)
            .create("fs", &HashMap::new())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }
}
