use std::fmt;

use azstorage_core::{AccountId, Error, Result, SubDomainType};

use crate::odata::{quote_key, read_quoted_key};

/// Identifies an entity:
/// `https://{account}.table.{suffix}/{table}(PartitionKey='{pk}',RowKey='{rk}')`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EntityId {
    pub account_id: AccountId,
    pub table_name: String,
    pub partition_key: String,
    pub row_key: String,
}

impl EntityId {
    pub fn new(
        account_id: AccountId,
        table_name: impl Into<String>,
        partition_key: impl Into<String>,
        row_key: impl Into<String>,
    ) -> Self {
        Self {
            account_id,
            table_name: table_name.into(),
            partition_key: partition_key.into(),
            row_key: row_key.into(),
        }
    }

    pub fn parse(input: &str, domain_suffix: &str) -> Result<Self> {
        let (account_id, path) = AccountId::parse_with_path(input, domain_suffix)?;
        let account_id = account_id.expect_sub_domain(SubDomainType::Table)?;

        let invalid = || {
            Error::invalid_id(format!(
                "expected the path of {input:?} to be {{table}}(PartitionKey='{{pk}}',RowKey='{{rk}}')"
            ))
        };

        let (table, keys) = path.split_once("(PartitionKey='").ok_or_else(invalid)?;
        let (partition_key, rest) = read_quoted_key(keys).ok_or_else(invalid)?;
        let rest = rest.strip_prefix(",RowKey='").ok_or_else(invalid)?;
        let (row_key, rest) = read_quoted_key(rest).ok_or_else(invalid)?;
        if rest != ")" || table.is_empty() || table.contains('/') {
            return Err(invalid());
        }

        Ok(Self::new(account_id, table, partition_key, row_key))
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path = format!(
            "{}(PartitionKey='{}',RowKey='{}')",
            self.table_name,
            quote_key(&self.partition_key),
            quote_key(&self.row_key)
        );
        f.write_str(&self.account_id.resource_url(&path))
    }
}
