use std::fmt;

use azstorage_core::{AccountId, Error, Result, SubDomainType};

/// Identifies a table: `https://{account}.table.{suffix}/Tables('{table}')`.
///
/// The older `https://{account}.table.{suffix}/{table}` form is accepted
/// when parsing.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TableId {
    pub account_id: AccountId,
    pub table_name: String,
}

impl TableId {
    pub fn new(account_id: AccountId, table_name: impl Into<String>) -> Self {
        Self {
            account_id,
            table_name: table_name.into(),
        }
    }

    pub fn parse(input: &str, domain_suffix: &str) -> Result<Self> {
        let (account_id, path) = AccountId::parse_with_path(input, domain_suffix)?;
        let account_id = account_id.expect_sub_domain(SubDomainType::Table)?;

        let name = match path
            .strip_prefix("Tables('")
            .and_then(|s| s.strip_suffix("')"))
        {
            Some(name) => name,
            None => path.as_str(),
        };
        if name.is_empty() || name.contains(['/', '(', ')', '\'']) {
            return Err(Error::invalid_id(format!(
                "expected the path of {input:?} to be Tables('{{table}}') or {{table}}"
            )));
        }
        Ok(Self::new(account_id, name))
    }

    pub fn resource_manager_id(&self, subscription_id: &str, resource_group: &str) -> String {
        format!(
            "{}/tableServices/default/tables/{}",
            self.account_id
                .resource_manager_id(subscription_id, resource_group),
            self.table_name
        )
    }
}

impl fmt::Display for TableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.account_id.resource_url(&format!("Tables('{}')", self.table_name)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use azstorage_core::Environment;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    #[test_case(Environment::Public, "https://account1.table.core.windows.net/Tables('table1')")]
    #[test_case(Environment::China, "https://account1.table.core.chinacloudapi.cn/Tables('table1')")]
    #[test_case(Environment::Germany, "https://account1.table.core.cloudapi.de/Tables('table1')")]
    #[test_case(Environment::UsGovernment, "https://account1.table.core.usgovcloudapi.net/Tables('table1')")]
    fn test_format_and_parse(env: Environment, expected: &str) {
        let id = TableId::new(
            AccountId::in_environment("account1", SubDomainType::Table, env),
            "table1",
        );
        assert_eq!(id.to_string(), expected);
        assert_eq!(TableId::parse(expected, env.storage_domain_suffix()).unwrap(), id);
    }

    #[test]
    fn test_parse_legacy_form() {
        let id = TableId::parse("https://account1.table.core.windows.net/table1", "core.windows.net")
            .unwrap();
        assert_eq!(id.table_name, "table1");
        assert_eq!(
            id.to_string(),
            "https://account1.table.core.windows.net/Tables('table1')"
        );
    }

    #[test]
    fn test_zones() {
        for (account, suffix) in [
            (
                AccountId::new("example1", SubDomainType::Table, "storage.azure.net").with_zone("zone1"),
                "storage.azure.net",
            ),
            (
                AccountId::new("example1", SubDomainType::Table, "edgestorage.azure.net")
                    .with_edge_zone("zone1"),
                "edgestorage.azure.net",
            ),
        ] {
            let id = TableId::new(account, "table1");
            assert_eq!(TableId::parse(&id.to_string(), suffix).unwrap(), id);
        }
    }

    #[test_case("https://account1.table.core.windows.net/"; "no table")]
    #[test_case("https://account1.table.core.windows.net/Tables('')"; "empty name")]
    #[test_case("https://account1.table.core.windows.net/table1(PartitionKey='a',RowKey='b')"; "entity")]
    #[test_case("https://account1.blob.core.windows.net/Tables('table1')"; "wrong service")]
    fn test_parse_errors(input: &str) {
        assert!(TableId::parse(input, "core.windows.net").is_err());
    }

    #[test]
    fn test_resource_manager_id() {
        let id = TableId::new(
            AccountId::new("account1", SubDomainType::Table, "core.windows.net"),
            "table1",
        );
        assert_eq!(
            id.resource_manager_id("11112222-3333-4444-5555-666677778888", "group1"),
            "/subscriptions/11112222-3333-4444-5555-666677778888/resourceGroups/group1/providers/Microsoft.Storage/storageAccounts/account1/tableServices/default/tables/table1"
        );
    }

    #[test_case(|a: AccountId| a; "standard")]
    #[test_case(|a: AccountId| a.with_zone("zone1"); "dns zone")]
    #[test_case(|a: AccountId| a.with_edge_zone("zone1"); "edge zone")]
    fn test_round_trip_every_environment(place: fn(AccountId) -> AccountId) {
        for env in Environment::ALL {
            let account = place(AccountId::in_environment("account1", SubDomainType::Table, env));
            let id = TableId::new(account, "table1");
            let url = id.to_string();
            assert_eq!(TableId::parse(&url, env.storage_domain_suffix()).unwrap(), id, "{url}");
        }
    }
}
