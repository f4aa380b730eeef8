use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use azstorage_core::acl::{SignedIdentifier, SignedIdentifiers};
use azstorage_core::time::DateTime;
use azstorage_core::{headers, metadata, validate, xml};
use azstorage_core::{Capability, Client, Error, Result, StorageRequest};
use http::{HeaderMap, Method, StatusCode};
use log::debug;
use serde::Deserialize;

mod id;
pub use id::ShareId;

/// Share quotas are between 1 GiB and 100 TiB.
const MAX_QUOTA_IN_GB: u32 = 102_400;

const X_MS_SHARE_QUOTA: &str = "x-ms-share-quota";
const X_MS_ENABLED_PROTOCOLS: &str = "x-ms-enabled-protocols";
const X_MS_ACCESS_TIER: &str = "x-ms-access-tier";
const X_MS_SNAPSHOT: &str = "x-ms-snapshot";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ShareProtocol {
    #[default]
    Smb,
    Nfs,
}

impl fmt::Display for ShareProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShareProtocol::Smb => f.write_str("SMB"),
            ShareProtocol::Nfs => f.write_str("NFS"),
        }
    }
}

impl FromStr for ShareProtocol {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "SMB" => Ok(ShareProtocol::Smb),
            "NFS" => Ok(ShareProtocol::Nfs),
            _ => Err(Error::unexpected(format!("unknown share protocol {s:?}"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShareAccessTier {
    TransactionOptimized,
    Hot,
    Cool,
    Premium,
}

impl fmt::Display for ShareAccessTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ShareAccessTier::TransactionOptimized => "TransactionOptimized",
            ShareAccessTier::Hot => "Hot",
            ShareAccessTier::Cool => "Cool",
            ShareAccessTier::Premium => "Premium",
        };
        f.write_str(s)
    }
}

impl FromStr for ShareAccessTier {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "TransactionOptimized" => Ok(ShareAccessTier::TransactionOptimized),
            "Hot" => Ok(ShareAccessTier::Hot),
            "Cool" => Ok(ShareAccessTier::Cool),
            "Premium" => Ok(ShareAccessTier::Premium),
            _ => Err(Error::unexpected(format!("unknown share access tier {s:?}"))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateShareInput {
    /// `1..=102400`.
    pub quota_in_gb: u32,
    pub enabled_protocol: ShareProtocol,
    pub access_tier: Option<ShareAccessTier>,
    pub metadata: HashMap<String, String>,
}

impl Default for CreateShareInput {
    fn default() -> Self {
        Self {
            quota_in_gb: 1,
            enabled_protocol: ShareProtocol::default(),
            access_tier: None,
            metadata: HashMap::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SetSharePropertiesInput {
    pub quota_in_gb: Option<u32>,
    pub access_tier: Option<ShareAccessTier>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareProperties {
    pub quota_in_gb: u32,
    pub enabled_protocol: Option<ShareProtocol>,
    pub access_tier: Option<ShareAccessTier>,
    pub etag: Option<String>,
    pub last_modified: Option<DateTime>,
    pub metadata: HashMap<String, String>,
}

impl ShareProperties {
    fn from_headers(h: &HeaderMap) -> Result<Self> {
        Ok(Self {
            quota_in_gb: headers::parse(h, X_MS_SHARE_QUOTA)?.unwrap_or_default(),
            enabled_protocol: headers::parse(h, X_MS_ENABLED_PROTOCOLS)?,
            access_tier: headers::parse(h, X_MS_ACCESS_TIER)?,
            etag: headers::parse_etag(h),
            last_modified: headers::parse_last_modified(h)?,
            metadata: metadata::from_headers(h),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ShareStats {
    /// Approximate usage in bytes.
    #[serde(default)]
    pub share_usage_bytes: u64,
}

fn validate_quota(quota_in_gb: u32) -> Result<()> {
    validate::in_range("quota_in_gb", quota_in_gb, 1, MAX_QUOTA_IN_GB)
}

/// Operations on file shares.
#[derive(Debug, Clone)]
pub struct SharesClient {
    client: Client,
}

impl SharesClient {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn request(method: Method, share_name: &str) -> Result<StorageRequest> {
        validate::lower_case_name("share_name", share_name)?;
        Ok(StorageRequest::new(method, share_name).query("restype", "share"))
    }

    fn tier_header(&self, tier: Option<ShareAccessTier>) -> Result<Option<ShareAccessTier>> {
        if tier.is_some() {
            self.client.require(Capability::ShareAccessTier)?;
        }
        Ok(tier)
    }

    pub async fn create(&self, share_name: &str, input: &CreateShareInput) -> Result<()> {
        validate_quota(input.quota_in_gb)?;
        metadata::validate(&input.metadata)?;

        let protocol = if self.client.api_version().supports(Capability::ShareEnabledProtocols) {
            Some(input.enabled_protocol)
        } else if input.enabled_protocol == ShareProtocol::Nfs {
            self.client.require(Capability::ShareEnabledProtocols)?;
            None
        } else {
            None
        };

        let req = Self::request(Method::PUT, share_name)?
            .header(X_MS_SHARE_QUOTA, input.quota_in_gb)
            .header_opt(X_MS_ENABLED_PROTOCOLS, protocol)
            .header_opt(X_MS_ACCESS_TIER, self.tier_header(input.access_tier)?)
            .metadata(&input.metadata)
            .expect(&[StatusCode::CREATED]);

        debug!("creating share {share_name} with quota {}GiB", input.quota_in_gb);
        self.client.send(req).await?;
        Ok(())
    }

    /// Delete the share, failing if it has snapshots unless
    /// `delete_snapshots` is set.
    pub async fn delete(&self, share_name: &str, delete_snapshots: bool) -> Result<()> {
        let req = Self::request(Method::DELETE, share_name)?
            .header_opt("x-ms-delete-snapshots", delete_snapshots.then_some("include"))
            .expect(&[StatusCode::ACCEPTED]);
        self.client.send(req).await?;
        Ok(())
    }

    /// Pass `snapshot` to read the properties of a share snapshot.
    pub async fn get_properties(
        &self,
        share_name: &str,
        snapshot: Option<&str>,
    ) -> Result<ShareProperties> {
        let req = Self::request(Method::GET, share_name)?.query_opt("sharesnapshot", snapshot);
        let resp = self.client.send(req).await?;
        ShareProperties::from_headers(resp.headers())
    }

    pub async fn set_properties(
        &self,
        share_name: &str,
        input: &SetSharePropertiesInput,
    ) -> Result<()> {
        if let Some(quota) = input.quota_in_gb {
            validate_quota(quota)?;
        }

        let req = Self::request(Method::PUT, share_name)?
            .query("comp", "properties")
            .header_opt(X_MS_SHARE_QUOTA, input.quota_in_gb)
            .header_opt(X_MS_ACCESS_TIER, self.tier_header(input.access_tier)?);
        self.client.send(req).await?;
        Ok(())
    }

    /// Replace all metadata of the share.
    pub async fn set_metadata(
        &self,
        share_name: &str,
        metadata: &HashMap<String, String>,
    ) -> Result<()> {
        metadata::validate(metadata)?;

        let req = Self::request(Method::PUT, share_name)?
            .query("comp", "metadata")
            .metadata(metadata);
        self.client.send(req).await?;
        Ok(())
    }

    /// Snapshot the share and return the snapshot timestamp.
    pub async fn create_snapshot(
        &self,
        share_name: &str,
        metadata: &HashMap<String, String>,
    ) -> Result<String> {
        metadata::validate(metadata)?;

        let req = Self::request(Method::PUT, share_name)?
            .query("comp", "snapshot")
            .metadata(metadata)
            .expect(&[StatusCode::CREATED]);

        let resp = self.client.send(req).await?;
        Ok(headers::require_str(resp.headers(), X_MS_SNAPSHOT)?.to_string())
    }

    pub async fn delete_snapshot(&self, share_name: &str, snapshot: &str) -> Result<()> {
        validate::non_empty("snapshot", snapshot)?;

        let req = Self::request(Method::DELETE, share_name)?
            .query("sharesnapshot", snapshot)
            .expect(&[StatusCode::ACCEPTED]);
        self.client.send(req).await?;
        Ok(())
    }

    pub async fn get_stats(&self, share_name: &str) -> Result<ShareStats> {
        let req = Self::request(Method::GET, share_name)?.query("comp", "stats");
        let resp = self.client.send(req).await?;
        xml::from_xml(resp.body())
    }

    pub async fn get_acl(&self, share_name: &str) -> Result<Vec<SignedIdentifier>> {
        let req = Self::request(Method::GET, share_name)?.query("comp", "acl");
        let resp = self.client.send(req).await?;
        Ok(xml::from_xml::<SignedIdentifiers>(resp.body())?.items)
    }

    /// Replace the stored access policies of the share.
    pub async fn set_acl(&self, share_name: &str, acl: Vec<SignedIdentifier>) -> Result<()> {
        let acl = SignedIdentifiers::new(acl)?;

        let req = Self::request(Method::PUT, share_name)?
            .query("comp", "acl")
            .xml_body(&acl)?;
        self.client.send(req).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use azstorage_core::{ApiVersion, Config, Context, ErrorKind};
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    fn shares(version: ApiVersion) -> SharesClient {
        SharesClient::new(Client::new(
            Context::new(),
            Config::new("https://account1.file.core.windows.net").with_api_version(version),
        ))
    }

    #[test_case(0; "zero")]
    #[test_case(102_401; "above 100 TiB")]
    #[tokio::test]
    async fn test_create_rejects_quota(quota_in_gb: u32) {
        let input = CreateShareInput {
            quota_in_gb,
            ..Default::default()
        };
        let err = shares(ApiVersion::default())
            .create("share1", &input)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[tokio::test]
    async fn test_capabilities_are_checked() {
        let input = CreateShareInput {
            enabled_protocol: ShareProtocol::Nfs,
            ..Default::default()
        };
        let err = shares(ApiVersion::V2019_12_12)
            .create("share1", &input)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unsupported);

        let input = SetSharePropertiesInput {
            access_tier: Some(ShareAccessTier::Cool),
            ..Default::default()
        };
        let err = shares(ApiVersion::V2018_11_09)
            .set_properties("share1", &input)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unsupported);
    }

    #[test]
    fn test_properties_from_headers() {
        let mut h = HeaderMap::new();
        h.insert(X_MS_SHARE_QUOTA, "10".parse().unwrap());
        h.insert(X_MS_ENABLED_PROTOCOLS, "SMB".parse().unwrap());
        h.insert(X_MS_ACCESS_TIER, "TransactionOptimized".parse().unwrap());

        let props = ShareProperties::from_headers(&h).unwrap();
        assert_eq!(props.quota_in_gb, 10);
        assert_eq!(props.enabled_protocol, Some(ShareProtocol::Smb));
        assert_eq!(props.access_tier, Some(ShareAccessTier::TransactionOptimized));
    }

    #[test]
    fn test_decode_stats() {
        let stats: ShareStats = xml::from_xml(
            br#"<?xml version="1.0" encoding="utf-8"?><ShareStats><ShareUsageBytes>2048</ShareUsageBytes></ShareStats>"#,
        )
        .unwrap();
        assert_eq!(stats.share_usage_bytes, 2048);
    }
}
