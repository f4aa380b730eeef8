//! Storage account identifiers.
//!
//! An account endpoint is one of:
//!
//! - `https://{account}.{subdomain}.{suffix}` for standard accounts
//! - `https://{account}.{zone}.{subdomain}.{suffix}` for accounts in a DNS zone
//! - `https://{account}.{subdomain}.{zone}.{suffix}` for accounts in an edge zone

use std::fmt;
use std::str::FromStr;

use percent_encoding::{percent_decode_str, utf8_percent_encode};

use crate::request::PATH_ENCODE_SET;
use crate::{Error, Result};

/// Percent-encode a resource path.
///
/// The inverse of the decoding done by [`AccountId::parse_with_path`]; `/`
/// separators are kept.
pub fn encode_path(path: &str) -> String {
    utf8_percent_encode(path, &PATH_ENCODE_SET).to_string()
}

/// The storage service a host name points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubDomainType {
    Blob,
    DataLake,
    File,
    Queue,
    Table,
}

impl SubDomainType {
    pub const ALL: [SubDomainType; 5] = [
        SubDomainType::Blob,
        SubDomainType::DataLake,
        SubDomainType::File,
        SubDomainType::Queue,
        SubDomainType::Table,
    ];

    /// The host label used for this service.
    pub fn as_str(&self) -> &'static str {
        match self {
            SubDomainType::Blob => "blob",
            SubDomainType::DataLake => "dfs",
            SubDomainType::File => "file",
            SubDomainType::Queue => "queue",
            SubDomainType::Table => "table",
        }
    }
}

impl fmt::Display for SubDomainType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SubDomainType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        SubDomainType::ALL
            .into_iter()
            .find(|v| v.as_str() == s)
            .ok_or_else(|| Error::invalid_id(format!("unknown storage subdomain: {s}")))
    }
}

/// Azure clouds with their own storage domain suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Environment {
    #[default]
    Public,
    China,
    Germany,
    UsGovernment,
}

impl Environment {
    pub const ALL: [Environment; 4] = [
        Environment::Public,
        Environment::China,
        Environment::Germany,
        Environment::UsGovernment,
    ];

    /// The storage domain suffix of this cloud.
    pub fn storage_domain_suffix(&self) -> &'static str {
        match self {
            Environment::Public => "core.windows.net",
            Environment::China => "core.chinacloudapi.cn",
            Environment::Germany => "core.cloudapi.de",
            Environment::UsGovernment => "core.usgovcloudapi.net",
        }
    }
}

/// Identifies a storage account endpoint for one service.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AccountId {
    pub account_name: String,
    pub zone_name: Option<String>,
    pub sub_domain_type: SubDomainType,
    pub domain_suffix: String,
    pub is_edge_zone: bool,
}

impl AccountId {
    /// Create a standard account id.
    pub fn new(
        account_name: impl Into<String>,
        sub_domain_type: SubDomainType,
        domain_suffix: impl Into<String>,
    ) -> Self {
        Self {
            account_name: account_name.into(),
            zone_name: None,
            sub_domain_type,
            domain_suffix: domain_suffix.into(),
            is_edge_zone: false,
        }
    }

    /// Create a standard account id in the given cloud.
    pub fn in_environment(
        account_name: impl Into<String>,
        sub_domain_type: SubDomainType,
        environment: Environment,
    ) -> Self {
        Self::new(
            account_name,
            sub_domain_type,
            environment.storage_domain_suffix(),
        )
    }

    /// Place the account in a DNS zone.
    pub fn with_zone(mut self, zone_name: impl Into<String>) -> Self {
        self.zone_name = Some(zone_name.into());
        self.is_edge_zone = false;
        self
    }

    /// Place the account in an edge zone.
    pub fn with_edge_zone(mut self, zone_name: impl Into<String>) -> Self {
        self.zone_name = Some(zone_name.into());
        self.is_edge_zone = true;
        self
    }

    /// The same account, addressed through another service.
    pub fn for_sub_domain(&self, sub_domain_type: SubDomainType) -> Self {
        Self {
            sub_domain_type,
            ..self.clone()
        }
    }

    /// Host name of the account endpoint.
    pub fn host(&self) -> String {
        let sub = self.sub_domain_type.as_str();
        match (&self.zone_name, self.is_edge_zone) {
            (Some(zone), true) => format!(
                "{}.{sub}.{zone}.{}",
                self.account_name, self.domain_suffix
            ),
            (Some(zone), false) => format!(
                "{}.{zone}.{sub}.{}",
                self.account_name, self.domain_suffix
            ),
            (None, _) => format!("{}.{sub}.{}", self.account_name, self.domain_suffix),
        }
    }

    /// Endpoint url of the account, without a trailing slash.
    pub fn endpoint(&self) -> String {
        format!("https://{}", self.host())
    }

    /// Url of a resource inside the account, with `path` percent-encoded.
    pub fn resource_url(&self, path: &str) -> String {
        format!("{}/{}", self.endpoint(), encode_path(path.trim_start_matches('/')))
    }

    /// Parse an account endpoint url.
    ///
    /// Any path in the url is ignored.
    pub fn parse(input: &str, domain_suffix: &str) -> Result<Self> {
        Self::parse_with_path(input, domain_suffix).map(|(id, _)| id)
    }

    /// Parse a url into the account id and the percent-decoded resource path.
    ///
    /// The returned path has no leading `/`.
    pub fn parse_with_path(input: &str, domain_suffix: &str) -> Result<(Self, String)> {
        let uri: http::Uri = input.parse().map_err(|e| {
            Error::invalid_id(format!("parsing {input:?} as a url")).with_source(e)
        })?;
        let host = uri
            .host()
            .ok_or_else(|| Error::invalid_id(format!("{input:?} has no host")))?;

        let suffix = domain_suffix.trim_matches('.');
        let prefix = host
            .strip_suffix(suffix)
            .and_then(|h| h.strip_suffix('.'))
            .ok_or_else(|| {
                Error::invalid_id(format!(
                    "host {host:?} does not end with the domain suffix {suffix:?}"
                ))
            })?;

        let labels: Vec<&str> = prefix.split('.').collect();
        if labels.iter().any(|l| l.is_empty()) {
            return Err(Error::invalid_id(format!("host {host:?} has an empty label")));
        }

        let id = match labels.as_slice() {
            [account, sub] => Self::new(*account, sub.parse()?, suffix),
            [account, zone, sub] if sub.parse::<SubDomainType>().is_ok() => {
                Self::new(*account, sub.parse()?, suffix).with_zone(*zone)
            }
            [account, sub, zone] if sub.parse::<SubDomainType>().is_ok() => {
                Self::new(*account, sub.parse()?, suffix).with_edge_zone(*zone)
            }
            _ => {
                return Err(Error::invalid_id(format!(
                    "host {host:?} is not a storage account endpoint"
                )))
            }
        };

        let path = percent_decode_str(uri.path().trim_start_matches('/'))
            .decode_utf8()
            .map_err(|e| {
                Error::invalid_id(format!("path of {input:?} is not valid utf-8")).with_source(e)
            })?
            .into_owned();

        Ok((id, path))
    }

    /// Fail unless this id addresses the expected service.
    pub fn expect_sub_domain(self, expected: SubDomainType) -> Result<Self> {
        if self.sub_domain_type != expected {
            return Err(Error::invalid_id(format!(
                "expected a {expected} endpoint but got {}",
                self.host()
            )));
        }
        Ok(self)
    }

    /// Resource Manager id of the storage account.
    pub fn resource_manager_id(&self, subscription_id: &str, resource_group: &str) -> String {
        format!(
            "/subscriptions/{subscription_id}/resourceGroups/{resource_group}/providers/Microsoft.Storage/storageAccounts/{}",
            self.account_name
        )
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.endpoint())
    }
}
