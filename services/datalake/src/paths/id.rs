use std::fmt;

use azstorage_core::{AccountId, Error, Result, SubDomainType};

/// Identifies a path in a file system:
/// `https://{account}.dfs.{suffix}/{filesystem}/{path}`.
///
/// An empty path is the root of the file system, `{filesystem}/`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PathId {
    pub account_id: AccountId,
    pub file_system_name: String,
    pub path: String,
}

impl PathId {
    pub fn new(
        account_id: AccountId,
        file_system_name: impl Into<String>,
        path: impl Into<String>,
    ) -> Self {
        Self {
            account_id,
            file_system_name: file_system_name.into(),
            path: path.into(),
        }
    }

    pub fn parse(input: &str, domain_suffix: &str) -> Result<Self> {
        let (account_id, path) = AccountId::parse_with_path(input, domain_suffix)?;
        let account_id = account_id.expect_sub_domain(SubDomainType::DataLake)?;

        match path.split_once('/') {
            Some((fs, rest)) if !fs.is_empty() => Ok(Self::new(account_id, fs, rest)),
            _ => Err(Error::invalid_id(format!(
                "expected the path of {input:?} to be {{filesystem}}/{{path}}"
            ))),
        }
    }
}

impl fmt::Display for PathId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path = format!("{}/{}", self.file_system_name, self.path);
        f.write_str(&self.account_id.resource_url(&path))
    }
}
