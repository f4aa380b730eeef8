use std::fmt;

use azstorage_core::{AccountId, Error, Result, SubDomainType};

/// Identifies a file:
/// `https://{account}.file.{suffix}/{share}[/{directory}]/{file}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FileId {
    pub account_id: AccountId,
    pub share_name: String,
    /// Empty for files at the root of the share.
    pub directory_path: String,
    pub file_name: String,
}

impl FileId {
    pub fn new(
        account_id: AccountId,
        share_name: impl Into<String>,
        directory_path: impl Into<String>,
        file_name: impl Into<String>,
    ) -> Self {
        Self {
            account_id,
            share_name: share_name.into(),
            directory_path: directory_path.into(),
            file_name: file_name.into(),
        }
    }

    pub fn parse(input: &str, domain_suffix: &str) -> Result<Self> {
        let (account_id, path) = AccountId::parse_with_path(input, domain_suffix)?;
        let account_id = account_id.expect_sub_domain(SubDomainType::File)?;

        let invalid = || {
            Error::invalid_id(format!(
                "expected the path of {input:?} to be `{{share}}/[{{directory}}/]{{file}}`"
            ))
        };
        let (share, rest) = path.split_once('/').ok_or_else(invalid)?;
        let (directory, file) = rest.rsplit_once('/').unwrap_or(("", rest));
        if share.is_empty() || file.is_empty() {
            return Err(invalid());
        }
        Ok(Self::new(account_id, share, directory, file))
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path = if self.directory_path.is_empty() {
            format!("{}/{}", self.share_name, self.file_name)
        } else {
            format!("{}/{}/{}", self.share_name, self.directory_path, self.file_name)
        };
        f.write_str(&self.account_id.resource_url(&path))
    }
}
