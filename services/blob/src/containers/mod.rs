use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use azstorage_core::time::DateTime;
use azstorage_core::{headers, metadata, validate, xml};
use azstorage_core::{Capability, Client, Error, Result, StorageRequest};
use http::{HeaderMap, StatusCode};
use log::debug;

use crate::lease::{self, LeaseState, LeaseStatus, X_MS_LEASE_ID, X_MS_LEASE_STATE, X_MS_LEASE_STATUS};
use crate::lease::{
    AcquireLeaseInput, AcquireLeaseResult, BreakLeaseInput, BreakLeaseResult, ChangeLeaseInput,
    ChangeLeaseResult,
};

mod id;
pub use id::ContainerId;
mod list;
pub use list::{BlobItem, BlobItemProperties, BlobPrefix, ListBlobsInput, ListBlobsResult};

const X_MS_BLOB_PUBLIC_ACCESS: &str = "x-ms-blob-public-access";
const X_MS_DEFAULT_ENCRYPTION_SCOPE: &str = "x-ms-default-encryption-scope";
const X_MS_DENY_ENCRYPTION_SCOPE_OVERRIDE: &str = "x-ms-deny-encryption-scope-override";
const X_MS_HAS_IMMUTABILITY_POLICY: &str = "x-ms-has-immutability-policy";
const X_MS_HAS_LEGAL_HOLD: &str = "x-ms-has-legal-hold";

/// Public access level of a container.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum AccessLevel {
    /// No anonymous access.
    #[default]
    Private,
    /// Anonymous read access to blobs.
    Blob,
    /// Anonymous read and list access.
    Container,
}

impl AccessLevel {
    /// Header value, `None` for private containers.
    fn header_value(&self) -> Option<&'static str> {
        match self {
            AccessLevel::Private => None,
            AccessLevel::Blob => Some("blob"),
            AccessLevel::Container => Some("container"),
        }
    }
}

impl FromStr for AccessLevel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "" => Ok(AccessLevel::Private),
            "blob" => Ok(AccessLevel::Blob),
            "container" => Ok(AccessLevel::Container),
            _ => Err(Error::unexpected(format!("unknown public access level {s:?}"))),
        }
    }
}

impl fmt::Display for AccessLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.header_value().unwrap_or("private"))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateContainerInput {
    pub access_level: AccessLevel,
    /// Requires api version 2020-08-04.
    pub default_encryption_scope: Option<String>,
    /// Only sent together with `default_encryption_scope`.
    pub encryption_scope_override_disabled: bool,
    pub metadata: HashMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerProperties {
    pub access_level: AccessLevel,
    pub default_encryption_scope: Option<String>,
    pub encryption_scope_override_disabled: bool,
    pub has_immutability_policy: bool,
    pub has_legal_hold: bool,
    pub etag: Option<String>,
    pub last_modified: Option<DateTime>,
    pub lease_status: Option<LeaseStatus>,
    pub lease_state: Option<LeaseState>,
    pub metadata: HashMap<String, String>,
}

impl ContainerProperties {
    fn from_headers(h: &HeaderMap) -> Result<Self> {
        let access_level = headers::get_str(h, X_MS_BLOB_PUBLIC_ACCESS)
            .unwrap_or_default()
            .parse()?;

        Ok(Self {
            access_level,
            default_encryption_scope: headers::get_string(h, X_MS_DEFAULT_ENCRYPTION_SCOPE),
            encryption_scope_override_disabled: headers::parse_bool(
                h,
                X_MS_DENY_ENCRYPTION_SCOPE_OVERRIDE,
            )?
            .unwrap_or_default(),
            has_immutability_policy: headers::parse_bool(h, X_MS_HAS_IMMUTABILITY_POLICY)?
                .unwrap_or_default(),
            has_legal_hold: headers::parse_bool(h, X_MS_HAS_LEGAL_HOLD)?.unwrap_or_default(),
            etag: headers::parse_etag(h),
            last_modified: headers::parse_last_modified(h)?,
            lease_status: headers::parse(h, X_MS_LEASE_STATUS)?,
            lease_state: headers::parse(h, X_MS_LEASE_STATE)?,
            metadata: metadata::from_headers(h),
        })
    }
}

/// Operations on blob containers.
#[derive(Debug, Clone)]
pub struct ContainersClient {
    client: Client,
}

impl ContainersClient {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn request(method: http::Method, container_name: &str) -> Result<StorageRequest> {
        validate::lower_case_name("container_name", container_name)?;
        Ok(StorageRequest::new(method, container_name).query("restype", "container"))
    }

    /// Create a container, failing if it already exists.
    pub async fn create(&self, container_name: &str, input: &CreateContainerInput) -> Result<()> {
        metadata::validate(&input.metadata)?;

        let mut req = Self::request(http::Method::PUT, container_name)?
            .header_opt(X_MS_BLOB_PUBLIC_ACCESS, input.access_level.header_value())
            .metadata(&input.metadata)
            .expect(&[StatusCode::CREATED]);

        if let Some(scope) = &input.default_encryption_scope {
            self.client.require(Capability::ContainerEncryptionScope)?;
            req = req
                .header(X_MS_DEFAULT_ENCRYPTION_SCOPE, scope)
                .header(
                    X_MS_DENY_ENCRYPTION_SCOPE_OVERRIDE,
                    input.encryption_scope_override_disabled,
                );
        }

        debug!("creating container {container_name}");
        self.client.send(req).await?;
        Ok(())
    }

    /// Mark the container for deletion.
    pub async fn delete(&self, container_name: &str) -> Result<()> {
        let req = Self::request(http::Method::DELETE, container_name)?
            .expect(&[StatusCode::ACCEPTED]);
        self.client.send(req).await?;
        Ok(())
    }

    pub async fn get_properties(
        &self,
        container_name: &str,
        lease_id: Option<&str>,
    ) -> Result<ContainerProperties> {
        let req = Self::request(http::Method::GET, container_name)?.header_opt(X_MS_LEASE_ID, lease_id);
        let resp = self.client.send(req).await?;
        ContainerProperties::from_headers(resp.headers())
    }

    /// Replace all metadata of the container.
    pub async fn set_metadata(
        &self,
        container_name: &str,
        metadata: &HashMap<String, String>,
        lease_id: Option<&str>,
    ) -> Result<()> {
        metadata::validate(metadata)?;

        let req = Self::request(http::Method::PUT, container_name)?
            .query("comp", "metadata")
            .metadata(metadata)
            .header_opt(X_MS_LEASE_ID, lease_id);
        self.client.send(req).await?;
        Ok(())
    }

    /// Set the public access level. Stored access policies are cleared.
    pub async fn set_access_control(
        &self,
        container_name: &str,
        level: AccessLevel,
        lease_id: Option<&str>,
    ) -> Result<()> {
        let req = Self::request(http::Method::PUT, container_name)?
            .query("comp", "acl")
            .header_opt(X_MS_BLOB_PUBLIC_ACCESS, level.header_value())
            .header_opt(X_MS_LEASE_ID, lease_id);
        self.client.send(req).await?;
        Ok(())
    }

    fn lease_request(container_name: &str) -> Result<StorageRequest> {
        Ok(Self::request(http::Method::PUT, container_name)?.query("comp", "lease"))
    }

    pub async fn acquire_lease(
        &self,
        container_name: &str,
        input: &AcquireLeaseInput,
    ) -> Result<AcquireLeaseResult> {
        lease::acquire(&self.client, Self::lease_request(container_name)?, input).await
    }

    pub async fn break_lease(
        &self,
        container_name: &str,
        input: &BreakLeaseInput,
    ) -> Result<BreakLeaseResult> {
        lease::break_lease(&self.client, Self::lease_request(container_name)?, input).await
    }

    pub async fn change_lease(
        &self,
        container_name: &str,
        input: &ChangeLeaseInput,
    ) -> Result<ChangeLeaseResult> {
        lease::change(&self.client, Self::lease_request(container_name)?, input).await
    }

    pub async fn release_lease(&self, container_name: &str, lease_id: &str) -> Result<()> {
        let req = Self::lease_request(container_name)?;
        lease::with_lease_id(&self.client, req, "release", lease_id).await
    }

    pub async fn renew_lease(&self, container_name: &str, lease_id: &str) -> Result<()> {
        let req = Self::lease_request(container_name)?;
        lease::with_lease_id(&self.client, req, "renew", lease_id).await
    }

    /// List one page of blobs. Pass `next_marker` back as `marker` to
    /// continue.
    pub async fn list_blobs(
        &self,
        container_name: &str,
        input: &ListBlobsInput,
    ) -> Result<ListBlobsResult> {
        if let Some(max) = input.max_results {
            validate::in_range("max_results", max, 1, 5000)?;
        }

        let req = Self::request(http::Method::GET, container_name)?.query("comp", "list");
        let req = input.apply(req);

        let resp = self.client.send(req).await?;
        xml::from_xml::<list::EnumerationResults>(resp.body()).map(ListBlobsResult::from)
    }
}
