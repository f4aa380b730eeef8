use azstorage_core::{Result, StorageRequest};
use http::Method;

use super::BlobsClient;
use crate::lease::{
    self, AcquireLeaseInput, AcquireLeaseResult, BreakLeaseInput, BreakLeaseResult,
    ChangeLeaseInput, ChangeLeaseResult,
};

impl BlobsClient {
    fn lease_request(container_name: &str, blob_name: &str) -> Result<StorageRequest> {
        Ok(Self::request(Method::PUT, container_name, blob_name)?.query("comp", "lease"))
    }

    pub async fn acquire_lease(
        &self,
        container_name: &str,
        blob_name: &str,
        input: &AcquireLeaseInput,
    ) -> Result<AcquireLeaseResult> {
        let req = Self::lease_request(container_name, blob_name)?;
        lease::acquire(&self.client, req, input).await
    }

    pub async fn break_lease(
        &self,
        container_name: &str,
        blob_name: &str,
        input: &BreakLeaseInput,
    ) -> Result<BreakLeaseResult> {
        let req = Self::lease_request(container_name, blob_name)?;
        lease::break_lease(&self.client, req, input).await
    }

    pub async fn change_lease(
        &self,
        container_name: &str,
        blob_name: &str,
        input: &ChangeLeaseInput,
    ) -> Result<ChangeLeaseResult> {
        let req = Self::lease_request(container_name, blob_name)?;
        lease::change(&self.client, req, input).await
    }

    pub async fn release_lease(
        &self,
        container_name: &str,
        blob_name: &str,
        lease_id: &str,
    ) -> Result<()> {
        let req = Self::lease_request(container_name, blob_name)?;
        lease::with_lease_id(&self.client, req, "release", lease_id).await
    }

    pub async fn renew_lease(
        &self,
        container_name: &str,
        blob_name: &str,
        lease_id: &str,
    ) -> Result<()> {
        let req = Self::lease_request(container_name, blob_name)?;
        lease::with_lease_id(&self.client, req, "renew", lease_id).await
    }
}
