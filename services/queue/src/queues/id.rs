use std::fmt;

use azstorage_core::{AccountId, Error, Result, SubDomainType};

/// Identifies a queue: `https://{account}.queue.{suffix}/{queue}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueueId {
    pub account_id: AccountId,
    pub queue_name: String,
}

impl QueueId {
    pub fn new(account_id: AccountId, queue_name: impl Into<String>) -> Self {
        Self {
            account_id,
            queue_name: queue_name.into(),
        }
    }

    pub fn parse(input: &str, domain_suffix: &str) -> Result<Self> {
        let (account_id, path) = AccountId::parse_with_path(input, domain_suffix)?;
        let account_id = account_id.expect_sub_domain(SubDomainType::Queue)?;

        let segments: Vec<&str> = path.split('/').collect();
        match segments.as_slice() {
            [name] if !name.is_empty() => Ok(Self::new(account_id, *name)),
            _ => Err(Error::invalid_id(format!(
                "expected the path of {input:?} to contain exactly one segment, the queue name"
            ))),
        }
    }

    pub fn resource_manager_id(&self, subscription_id: &str, resource_group: &str) -> String {
        format!(
            "{}/queueServices/default/queues/{}",
            self.account_id
                .resource_manager_id(subscription_id, resource_group),
            self.queue_name
        )
    }
}

impl fmt::Display for QueueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.account_id.resource_url(&self.queue_name))
    }
}
