use std::fmt;

use azstorage_core::{AccountId, Error, Result, SubDomainType};

/// Identifies a container: `https://{account}.blob.{suffix}/{container}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContainerId {
    pub account_id: AccountId,
    pub container_name: String,
}

impl ContainerId {
    pub fn new(account_id: AccountId, container_name: impl Into<String>) -> Self {
        Self {
            account_id,
            container_name: container_name.into(),
        }
    }

    /// Parse a container url.
    pub fn parse(input: &str, domain_suffix: &str) -> Result<Self> {
        let (account_id, path) = AccountId::parse_with_path(input, domain_suffix)?;
        let account_id = account_id.expect_sub_domain(SubDomainType::Blob)?;

        let segments: Vec<&str> = path.split('/').collect();
        match segments.as_slice() {
            [name] if !name.is_empty() => Ok(Self::new(account_id, *name)),
            _ => Err(Error::invalid_id(format!(
                "expected the path of {input:?} to contain exactly one segment, the container name"
            ))),
        }
    }

    /// Resource Manager id of the container.
    pub fn resource_manager_id(&self, subscription_id: &str, resource_group: &str) -> String {
        format!(
            "{}/blobServices/default/containers/{}",
            self.account_id
                .resource_manager_id(subscription_id, resource_group),
            self.container_name
        )
    }
}

impl fmt::Display for ContainerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.account_id.resource_url(&self.container_name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use azstorage_core::Environment;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    #[test_case(Environment::Public, "https://account1.blob.core.windows.net/container1")]
    #[test_case(Environment::China, "https://account1.blob.core.chinacloudapi.cn/container1")]
    #[test_case(Environment::Germany, "https://account1.blob.core.cloudapi.de/container1")]
    #[test_case(Environment::UsGovernment, "https://account1.blob.core.usgovcloudapi.net/container1")]
    fn test_format_and_parse(env: Environment, expected: &str) {
        let id = ContainerId::new(
            AccountId::in_environment("account1", SubDomainType::Blob, env),
            "container1",
        );
        assert_eq!(id.to_string(), expected);
        assert_eq!(
            ContainerId::parse(expected, env.storage_domain_suffix()).unwrap(),
            id
        );
    }

    #[test]
    fn test_zones() {
        let dns = ContainerId::parse(
            "https://example1.zone1.blob.storage.azure.net/container1",
            "storage.azure.net",
        )
        .unwrap();
        assert_eq!(dns.account_id.zone_name.as_deref(), Some("zone1"));
        assert!(!dns.account_id.is_edge_zone);

        let edge = ContainerId::parse(
            "https://example1.blob.zone1.edgestorage.azure.net/container1",
            "edgestorage.azure.net",
        )
        .unwrap();
        assert!(edge.account_id.is_edge_zone);
        assert_eq!(
            edge.to_string(),
            "https://example1.blob.zone1.edgestorage.azure.net/container1"
        );
    }

    #[test_case("https://account1.blob.core.windows.net/"; "no container")]
    #[test_case("https://account1.blob.core.windows.net/container1/blob1"; "blob path")]
    #[test_case("https://account1.queue.core.windows.net/container1"; "wrong service")]
    fn test_parse_errors(input: &str) {
        assert!(ContainerId::parse(input, "core.windows.net").is_err());
    }

    #[test]
    fn test_resource_manager_id() {
        let id = ContainerId::new(
            AccountId::new("account1", SubDomainType::Blob, "core.windows.net"),
            "container1",
        );
        assert_eq!(
            id.resource_manager_id("11112222-3333-4444-5555-666677778888", "group1"),
            "/subscriptions/11112222-3333-4444-5555-666677778888/resourceGroups/group1/providers/Microsoft.Storage/storageAccounts/account1/blobServices/default/containers/container1"
        );
    }

    #[test_case(|a: AccountId| a; "standard")]
    #[test_case(|a: AccountId| a.with_zone("zone1"); "dns zone")]
    #[test_case(|a: AccountId| a.with_edge_zone("zone1"); "edge zone")]
    fn test_round_trip_every_environment(place: fn(AccountId) -> AccountId) {
        for env in Environment::ALL {
            let account = place(AccountId::in_environment("account1", SubDomainType::Blob, env));
            let id = ContainerId::new(account, "container1");
            let url = id.to_string();
            assert_eq!(ContainerId::parse(&url, env.storage_domain_suffix()).unwrap(), id, "{url}");
        }
    }
}
