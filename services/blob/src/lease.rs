//! Leases on containers and blobs.
//!
//! Both resources share the `comp=lease` operation, only the request path
//! and the `restype` differ.

use std::fmt;
use std::str::FromStr;

use azstorage_core::headers;
use azstorage_core::validate;
use azstorage_core::{Client, Error, Result, StorageRequest};
use http::StatusCode;
use serde::Deserialize;

pub(crate) const X_MS_LEASE_ID: &str = "x-ms-lease-id";
const X_MS_LEASE_ACTION: &str = "x-ms-lease-action";
const X_MS_LEASE_DURATION: &str = "x-ms-lease-duration";
const X_MS_LEASE_BREAK_PERIOD: &str = "x-ms-lease-break-period";
const X_MS_LEASE_TIME: &str = "x-ms-lease-time";
const X_MS_PROPOSED_LEASE_ID: &str = "x-ms-proposed-lease-id";
pub(crate) const X_MS_LEASE_STATUS: &str = "x-ms-lease-status";
pub(crate) const X_MS_LEASE_STATE: &str = "x-ms-lease-state";

/// `-1` acquires an infinite lease.
pub const INFINITE_LEASE_DURATION: i32 = -1;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcquireLeaseInput {
    /// Seconds, `-1` or `15..=60`.
    pub lease_duration: i32,
    pub proposed_lease_id: Option<String>,
}

impl Default for AcquireLeaseInput {
    fn default() -> Self {
        Self {
            lease_duration: INFINITE_LEASE_DURATION,
            proposed_lease_id: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcquireLeaseResult {
    pub lease_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BreakLeaseInput {
    /// Seconds, `0..=60`. The remaining lease period is used when unset.
    pub break_period: Option<u32>,
    pub lease_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BreakLeaseResult {
    /// Seconds until the lease is broken.
    pub lease_time: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeLeaseInput {
    pub existing_lease_id: String,
    pub proposed_lease_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeLeaseResult {
    pub lease_id: String,
}

pub(crate) async fn acquire(
    client: &Client,
    req: StorageRequest,
    input: &AcquireLeaseInput,
) -> Result<AcquireLeaseResult> {
    if input.lease_duration != INFINITE_LEASE_DURATION {
        validate::in_range("lease_duration", input.lease_duration, 15, 60)?;
    }

    let req = req
        .header(X_MS_LEASE_ACTION, "acquire")
        .header(X_MS_LEASE_DURATION, input.lease_duration)
        .header_opt(X_MS_PROPOSED_LEASE_ID, input.proposed_lease_id.as_deref())
        .expect(&[StatusCode::CREATED]);

    let resp = client.send(req).await?;
    Ok(AcquireLeaseResult {
        lease_id: headers::require_str(resp.headers(), X_MS_LEASE_ID)?.to_string(),
    })
}

pub(crate) async fn break_lease(
    client: &Client,
    req: StorageRequest,
    input: &BreakLeaseInput,
) -> Result<BreakLeaseResult> {
    if let Some(period) = input.break_period {
        validate::in_range("break_period", period, 0, 60)?;
    }

    let req = req
        .header(X_MS_LEASE_ACTION, "break")
        .header_opt(X_MS_LEASE_BREAK_PERIOD, input.break_period)
        .header_opt(X_MS_LEASE_ID, input.lease_id.as_deref())
        .expect(&[StatusCode::ACCEPTED]);

    let resp = client.send(req).await?;
    let lease_time = headers::parse(resp.headers(), X_MS_LEASE_TIME)?.unwrap_or_default();
    Ok(BreakLeaseResult { lease_time })
}

pub(crate) async fn change(
    client: &Client,
    req: StorageRequest,
    input: &ChangeLeaseInput,
) -> Result<ChangeLeaseResult> {
    validate::non_empty("existing_lease_id", &input.existing_lease_id)?;
    validate::non_empty("proposed_lease_id", &input.proposed_lease_id)?;

    let req = req
        .header(X_MS_LEASE_ACTION, "change")
        .header(X_MS_LEASE_ID, &input.existing_lease_id)
        .header(X_MS_PROPOSED_LEASE_ID, &input.proposed_lease_id);

    let resp = client.send(req).await?;
    Ok(ChangeLeaseResult {
        lease_id: headers::require_str(resp.headers(), X_MS_LEASE_ID)?.to_string(),
    })
}

/// `release` or `renew`, both only need the lease id.
pub(crate) async fn with_lease_id(
    client: &Client,
    req: StorageRequest,
    action: &str,
    lease_id: &str,
) -> Result<()> {
    validate::non_empty("lease_id", lease_id)?;

    let req = req
        .header(X_MS_LEASE_ACTION, action)
        .header(X_MS_LEASE_ID, lease_id);
    client.send(req).await?;
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LeaseStatus {
    Locked,
    Unlocked,
}

impl FromStr for LeaseStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "locked" => Ok(LeaseStatus::Locked),
            "unlocked" => Ok(LeaseStatus::Unlocked),
            _ => Err(Error::unexpected(format!("unknown lease status {s:?}"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LeaseState {
    Available,
    Leased,
    Expired,
    Breaking,
    Broken,
}

impl FromStr for LeaseState {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "available" => Ok(LeaseState::Available),
            "leased" => Ok(LeaseState::Leased),
            "expired" => Ok(LeaseState::Expired),
            "breaking" => Ok(LeaseState::Breaking),
            "broken" => Ok(LeaseState::Broken),
            _ => Err(Error::unexpected(format!("unknown lease state {s:?}"))),
        }
    }
}

impl fmt::Display for LeaseState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LeaseState::Available => "available",
            LeaseState::Leased => "leased",
            LeaseState::Expired => "expired",
            LeaseState::Breaking => "breaking",
            LeaseState::Broken => "broken",
        };
        f.write_str(s)
    }
}
