use azstorage_core::time::{self, DateTime};
use azstorage_core::{Result, StorageRequest};
use serde::Deserialize;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListFileSystemsInput {
    pub prefix: Option<String>,
    /// Token from the previous page's `continuation`.
    pub continuation: Option<String>,
    /// At least 1. The service caps a page at 5000 items.
    pub max_results: Option<u32>,
}

impl ListFileSystemsInput {
    pub(crate) fn apply(&self, req: StorageRequest) -> StorageRequest {
        req.query_opt("prefix", self.prefix.as_deref())
            .query_opt("continuation", self.continuation.as_deref())
            .query_opt("maxResults", self.max_results)
    }
}

/// One page of a file system listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListFileSystemsResult {
    pub file_systems: Vec<FileSystemItem>,
    /// Set when more file systems are available.
    pub continuation: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileSystemItem {
    pub name: String,
    #[serde(default)]
    pub last_modified: Option<String>,
    #[serde(rename = "eTag", alias = "etag", default)]
    pub etag: Option<String>,
}

impl FileSystemItem {
    pub fn last_modified(&self) -> Result<Option<DateTime>> {
        self.last_modified
            .as_deref()
            .map(time::parse_http_date)
            .transpose()
    }
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct FileSystemList {
    #[serde(default)]
    pub(crate) filesystems: Vec<FileSystemItem>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_apply() {
        let input = ListFileSystemsInput {
            prefix: Some("logs".to_string()),
            continuation: Some("token/1".to_string()),
            max_results: Some(2),
        };
        let req = input.apply(StorageRequest::get("").query("resource", "account"));
        assert_eq!(
            req.url("https://account1.dfs.core.windows.net"),
            "https://account1.dfs.core.windows.net/?resource=account&prefix=logs&continuation=token/1&maxResults=2"
        );
    }

    #[test]
    fn test_decode() {
        let list: FileSystemList = serde_json::from_str(
            r#"{"filesystems":[{"name":"fs1","lastModified":"Wed, 21 Oct 2015 07:28:00 GMT","eTag":"0x8D4BCC2E4835CD0"},{"name":"fs2"}]}"#,
        )
        .unwrap();
        assert_eq!(list.filesystems.len(), 2);
        assert_eq!(list.filesystems[0].name, "fs1");
        assert_eq!(list.filesystems[0].etag.as_deref(), Some("0x8D4BCC2E4835CD0"));
        assert_eq!(
            list.filesystems[0].last_modified().unwrap(),
            Some(time::parse_http_date("Wed, 21 Oct 2015 07:28:00 GMT").unwrap())
        );
        assert_eq!(list.filesystems[1].last_modified().unwrap(), None);
    }

    #[test]
    fn test_decode_empty_body() {
        let list: FileSystemList = serde_json::from_str("{}").unwrap();
        assert!(list.filesystems.is_empty());
    }
}
