use std::fmt;

use azstorage_core::{AccountId, Error, Result, SubDomainType};

/// Identifies a file system: `https://{account}.dfs.{suffix}/{filesystem}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FileSystemId {
    pub account_id: AccountId,
    pub file_system_name: String,
}

impl FileSystemId {
    pub fn new(account_id: AccountId, file_system_name: impl Into<String>) -> Self {
        Self {
            account_id,
            file_system_name: file_system_name.into(),
        }
    }

    pub fn parse(input: &str, domain_suffix: &str) -> Result<Self> {
        let (account_id, path) = AccountId::parse_with_path(input, domain_suffix)?;
        let account_id = account_id.expect_sub_domain(SubDomainType::DataLake)?;

        match path.split('/').collect::<Vec<_>>().as_slice() {
            [name] if !name.is_empty() => Ok(Self::new(account_id, *name)),
            _ => Err(Error::invalid_id(format!(
                "expected the path of {input:?} to contain exactly one segment, the file system name"
            ))),
        }
    }

    /// File systems are blob containers to Resource Manager.
    pub fn resource_manager_id(&self, subscription_id: &str, resource_group: &str) -> String {
        format!(
            "{}/blobServices/default/containers/{}",
            self.account_id
                .resource_manager_id(subscription_id, resource_group),
            self.file_system_name
        )
    }
}

impl fmt::Display for FileSystemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.account_id.resource_url(&self.file_system_name))
    }
}
