//! Storage REST api versions and the features each of them supports.

use std::fmt;
use std::str::FromStr;

use crate::{Error, Result};

/// A storage data-plane api version, sent as `x-ms-version`.
///
/// Versions are ordered, so a feature introduced in one version is
/// available in every later one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum ApiVersion {
    V2017_07_29,
    V2018_03_28,
    V2018_11_09,
    V2019_12_12,
    V2020_08_04,
    #[default]
    V2023_11_03,
}

impl ApiVersion {
    /// All known versions, oldest first.
    pub const ALL: [ApiVersion; 6] = [
        ApiVersion::V2017_07_29,
        ApiVersion::V2018_03_28,
        ApiVersion::V2018_11_09,
        ApiVersion::V2019_12_12,
        ApiVersion::V2020_08_04,
        ApiVersion::V2023_11_03,
    ];

    /// The value of the `x-ms-version` header.
    pub fn as_str(&self) -> &'static str {
        match self {
            ApiVersion::V2017_07_29 => "2017-07-29",
            ApiVersion::V2018_03_28 => "2018-03-28",
            ApiVersion::V2018_11_09 => "2018-11-09",
            ApiVersion::V2019_12_12 => "2019-12-12",
            ApiVersion::V2020_08_04 => "2020-08-04",
            ApiVersion::V2023_11_03 => "2023-11-03",
        }
    }

    /// Check whether this version supports the given capability.
    pub fn supports(&self, capability: Capability) -> bool {
        *self >= capability.introduced_in()
    }

    /// Return an `Unsupported` error if this version lacks the capability.
    pub fn require(&self, capability: Capability) -> Result<()> {
        if self.supports(capability) {
            return Ok(());
        }
        Err(Error::unsupported(format!(
            "{} requires api version {} or later, but {} is configured",
            capability.name(),
            capability.introduced_in(),
            self
        )))
    }
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApiVersion {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        ApiVersion::ALL
            .into_iter()
            .find(|v| v.as_str() == s.trim())
            .ok_or_else(|| Error::config_invalid(format!("unknown api version: {s}")))
    }
}

/// Features whose availability depends on the api version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// `x-ms-messagettl: -1` for messages that never expire.
    QueueMessageTtlInfinite,
    /// Data Lake Gen2 filesystem operations.
    DataLakeFileSystems,
    /// Data Lake Gen2 path operations.
    DataLakePaths,
    /// `comp=undelete` on soft-deleted blobs.
    BlobUndelete,
    /// `comp=tier` on blobs.
    BlobAccessTier,
    /// SMB properties (`x-ms-file-attributes`, ...) required when creating
    /// files and directories.
    FileSmbProperties,
    /// `x-ms-access-tier` on file shares.
    ShareAccessTier,
    /// `x-ms-enabled-protocols` on file shares.
    ShareEnabledProtocols,
    /// Default encryption scopes on containers.
    ContainerEncryptionScope,
    /// `comp=immutabilityPolicies` on blobs.
    BlobImmutabilityPolicy,
    /// `comp=legalhold` on blobs.
    BlobLegalHold,
}

impl Capability {
    /// The first api version that supports this capability.
    pub fn introduced_in(&self) -> ApiVersion {
        match self {
            Capability::QueueMessageTtlInfinite => ApiVersion::V2017_07_29,
            Capability::DataLakeFileSystems => ApiVersion::V2018_03_28,
            Capability::DataLakePaths
            | Capability::BlobUndelete
            | Capability::BlobAccessTier => ApiVersion::V2018_11_09,
            Capability::FileSmbProperties | Capability::ShareAccessTier => {
                ApiVersion::V2019_12_12
            }
            Capability::ShareEnabledProtocols
            | Capability::ContainerEncryptionScope
            | Capability::BlobImmutabilityPolicy
            | Capability::BlobLegalHold => ApiVersion::V2020_08_04,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Capability::QueueMessageTtlInfinite => "infinite message ttl",
            Capability::DataLakeFileSystems => "data lake filesystems",
            Capability::DataLakePaths => "data lake paths",
            Capability::BlobUndelete => "blob undelete",
            Capability::BlobAccessTier => "blob access tier",
            Capability::FileSmbProperties => "file smb properties",
            Capability::ShareAccessTier => "share access tier",
            Capability::ShareEnabledProtocols => "share enabled protocols",
            Capability::ContainerEncryptionScope => "container encryption scope",
            Capability::BlobImmutabilityPolicy => "blob immutability policy",
            Capability::BlobLegalHold => "blob legal hold",
        }
    }
}
