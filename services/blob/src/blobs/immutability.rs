use std::fmt;

use azstorage_core::time::{self, DateTime};
use azstorage_core::{headers, Capability, Result};
use http::{Method, StatusCode};

use super::BlobsClient;

const X_MS_LEGAL_HOLD: &str = "x-ms-legal-hold";

/// Mode of a blob level immutability policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ImmutabilityPolicyMode {
    /// The policy can still be shortened or removed.
    #[default]
    Unlocked,
    Locked,
}

impl fmt::Display for ImmutabilityPolicyMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImmutabilityPolicyMode::Unlocked => f.write_str("Unlocked"),
            ImmutabilityPolicyMode::Locked => f.write_str("Locked"),
        }
    }
}

impl BlobsClient {
    /// Set or clear the legal hold, returning the resulting state.
    pub async fn set_legal_hold(
        &self,
        container_name: &str,
        blob_name: &str,
        legal_hold: bool,
    ) -> Result<bool> {
        self.client.require(Capability::BlobLegalHold)?;

        let req = Self::request(Method::PUT, container_name, blob_name)?
            .query("comp", "legalhold")
            .header(X_MS_LEGAL_HOLD, legal_hold)
            .expect(&[StatusCode::OK, StatusCode::ACCEPTED]);

        let resp = self.client.send(req).await?;
        Ok(headers::parse_bool(resp.headers(), X_MS_LEGAL_HOLD)?.unwrap_or(legal_hold))
    }

    /// Keep the blob immutable until `until`.
    pub async fn set_immutability_policy(
        &self,
        container_name: &str,
        blob_name: &str,
        until: DateTime,
        mode: ImmutabilityPolicyMode,
    ) -> Result<()> {
        self.client.require(Capability::BlobImmutabilityPolicy)?;

        let req = Self::request(Method::PUT, container_name, blob_name)?
            .query("comp", "immutabilityPolicies")
            .header("x-ms-immutability-policy-until-date", time::format_http_date(until))
            .header("x-ms-immutability-policy-mode", mode);
        self.client.send(req).await?;
        Ok(())
    }

    /// Remove an unlocked immutability policy.
    pub async fn delete_immutability_policy(
        &self,
        container_name: &str,
        blob_name: &str,
    ) -> Result<()> {
        self.client.require(Capability::BlobImmutabilityPolicy)?;

        let req = Self::request(Method::DELETE, container_name, blob_name)?
            .query("comp", "immutabilityPolicies");
        self.client.send(req).await?;
        Ok(())
    }
}
