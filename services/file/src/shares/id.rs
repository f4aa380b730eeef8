use std::fmt;

use azstorage_core::{AccountId, Error, Result, SubDomainType};

/// Identifies a share: `https://{account}.file.{suffix}/{share}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ShareId {
    pub account_id: AccountId,
    pub share_name: String,
}

impl ShareId {
    pub fn new(account_id: AccountId, share_name: impl Into<String>) -> Self {
        Self {
            account_id,
            share_name: share_name.into(),
        }
    }

    pub fn parse(input: &str, domain_suffix: &str) -> Result<Self> {
        let (account_id, path) = AccountId::parse_with_path(input, domain_suffix)?;
        let account_id = account_id.expect_sub_domain(SubDomainType::File)?;

        if path.is_empty() || path.contains('/') {
            return Err(Error::invalid_id(format!(
                "expected the path of {input:?} to contain exactly one segment, the share name"
            )));
        }
        Ok(Self::new(account_id, path))
    }

    /// Resource Manager id of the share.
    pub fn resource_manager_id(&self, subscription_id: &str, resource_group: &str) -> String {
        format!(
            "{}/fileServices/default/shares/{}",
            self.account_id
                .resource_manager_id(subscription_id, resource_group),
            self.share_name
        )
    }
}

impl fmt::Display for ShareId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.account_id.resource_url(&self.share_name))
    }
}
