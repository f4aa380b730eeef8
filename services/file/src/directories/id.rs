use std::fmt;

use azstorage_core::{AccountId, Error, Result, SubDomainType};

/// Identifies a directory: `https://{account}.file.{suffix}/{share}/{path}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DirectoryId {
    pub account_id: AccountId,
    pub share_name: String,
    /// Slash separated, never empty.
    pub directory_path: String,
}

impl DirectoryId {
    pub fn new(
        account_id: AccountId,
        share_name: impl Into<String>,
        directory_path: impl Into<String>,
    ) -> Self {
        Self {
            account_id,
            share_name: share_name.into(),
            directory_path: directory_path.into(),
        }
    }

    pub fn parse(input: &str, domain_suffix: &str) -> Result<Self> {
        let (account_id, path) = AccountId::parse_with_path(input, domain_suffix)?;
        let account_id = account_id.expect_sub_domain(SubDomainType::File)?;

        match path.split_once('/') {
            Some((share, dir)) if !share.is_empty() && !dir.is_empty() => {
                Ok(Self::new(account_id, share, dir.trim_end_matches('/')))
            }
            _ => Err(Error::invalid_id(format!(
                "expected the path of {input:?} to be `{{share}}/{{directory}}`"
            ))),
        }
    }
}

impl fmt::Display for DirectoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path = format!("{}/{}", self.share_name, self.directory_path);
        f.write_str(&self.account_id.resource_url(&path))
    }
}
