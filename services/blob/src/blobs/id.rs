use std::fmt;

use azstorage_core::{AccountId, Error, Result, SubDomainType};

/// Identifies a blob: `https://{account}.blob.{suffix}/{container}/{blob}`.
///
/// Blob names may contain `/`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BlobId {
    pub account_id: AccountId,
    pub container_name: String,
    pub blob_name: String,
}

impl BlobId {
    pub fn new(
        account_id: AccountId,
        container_name: impl Into<String>,
        blob_name: impl Into<String>,
    ) -> Self {
        Self {
            account_id,
            container_name: container_name.into(),
            blob_name: blob_name.into(),
        }
    }

    /// Parse a blob url.
    pub fn parse(input: &str, domain_suffix: &str) -> Result<Self> {
        let (account_id, path) = AccountId::parse_with_path(input, domain_suffix)?;
        let account_id = account_id.expect_sub_domain(SubDomainType::Blob)?;

        match path.split_once('/') {
            Some((container, blob)) if !container.is_empty() && !blob.is_empty() => {
                Ok(Self::new(account_id, container, blob))
            }
            _ => Err(Error::invalid_id(format!(
                "expected the path of {input:?} to be `{{container}}/{{blob}}`"
            ))),
        }
    }
}

impl fmt::Display for BlobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path = format!("{}/{}", self.container_name, self.blob_name);
        f.write_str(&self.account_id.resource_url(&path))
    }
}
