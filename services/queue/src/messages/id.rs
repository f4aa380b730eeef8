use std::fmt;

use azstorage_core::{AccountId, Error, Result, SubDomainType};

/// Identifies a message: `https://{account}.queue.{suffix}/{queue}/messages/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MessageId {
    pub account_id: AccountId,
    pub queue_name: String,
    pub message_id: String,
}

impl MessageId {
    pub fn new(
        account_id: AccountId,
        queue_name: impl Into<String>,
        message_id: impl Into<String>,
    ) -> Self {
        Self {
            account_id,
            queue_name: queue_name.into(),
            message_id: message_id.into(),
        }
    }

    pub fn parse(input: &str, domain_suffix: &str) -> Result<Self> {
        let (account_id, path) = AccountId::parse_with_path(input, domain_suffix)?;
        let account_id = account_id.expect_sub_domain(SubDomainType::Queue)?;

        let segments: Vec<&str> = path.split('/').collect();
        match segments.as_slice() {
            [queue, "messages", id] if !queue.is_empty() && !id.is_empty() => {
                Ok(Self::new(account_id, *queue, *id))
            }
            _ => Err(Error::invalid_id(format!(
                "expected the path of {input:?} to be {{queue}}/messages/{{id}}"
            ))),
        }
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path = format!("{}/messages/{}", self.queue_name, self.message_id);
        f.write_str(&self.account_id.resource_url(&path))
    }
}
