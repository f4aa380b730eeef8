//! Waiting for server-side copies to finish.

use std::fmt;
use std::future::Future;
use std::str::FromStr;
use std::time::Duration;

use http::HeaderMap;
use log::debug;

use crate::headers;
use crate::{Error, Result};

pub const X_MS_COPY_ID: &str = "x-ms-copy-id";
pub const X_MS_COPY_STATUS: &str = "x-ms-copy-status";
pub const X_MS_COPY_STATUS_DESCRIPTION: &str = "x-ms-copy-status-description";

/// Interval used by `copy_and_wait` helpers unless told otherwise.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(15);

/// State of a server-side copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CopyStatus {
    Pending,
    Success,
    Failed,
    Aborted,
}

impl CopyStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CopyStatus::Pending => "pending",
            CopyStatus::Success => "success",
            CopyStatus::Failed => "failed",
            CopyStatus::Aborted => "aborted",
        }
    }

    /// Everything but `Pending` is terminal.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, CopyStatus::Pending)
    }
}

impl fmt::Display for CopyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CopyStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(CopyStatus::Pending),
            "success" => Ok(CopyStatus::Success),
            "failed" => Ok(CopyStatus::Failed),
            "aborted" => Ok(CopyStatus::Aborted),
            _ => Err(Error::unexpected(format!("unknown copy status {s:?}"))),
        }
    }
}

/// Copy state as reported by the copy target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyProgress {
    pub copy_id: Option<String>,
    pub status: CopyStatus,
    pub description: Option<String>,
}

impl CopyProgress {
    /// Read the `x-ms-copy-*` headers of a copy or properties response.
    pub fn from_headers(headers: &HeaderMap) -> Result<Self> {
        let status = headers::get_str(headers, X_MS_COPY_STATUS).ok_or_else(|| {
            Error::unexpected("response carries no copy status, no copy has been started")
        })?;

        Ok(Self {
            copy_id: headers::get_string(headers, X_MS_COPY_ID),
            status: status.parse()?,
            description: headers::get_string(headers, X_MS_COPY_STATUS_DESCRIPTION),
        })
    }
}

/// Poll until the copy reaches a terminal state.
///
/// `poll` fetches the current state of the copy target. A pending copy is
/// polled again after `poll_interval`. `Failed` and `Aborted` are returned as
/// errors carrying the service's description. There is no timeout: drop the
/// future to stop waiting.
pub async fn wait_for_copy<F, Fut>(poll_interval: Duration, mut poll: F) -> Result<CopyProgress>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<CopyProgress>>,
{
    loop {
        let progress = poll().await?;
        let description = progress.description.as_deref().unwrap_or_default();

        match progress.status {
            CopyStatus::Success => return Ok(progress),
            CopyStatus::Failed => {
                return Err(Error::copy_failed(format!("Copy failed: {description}")))
            }
            CopyStatus::Aborted => {
                return Err(Error::copy_aborted(format!(
                    "Copy was aborted: {description}"
                )))
            }
            CopyStatus::Pending => {
                debug!(
                    "copy {} still pending, checking again in {poll_interval:?}",
                    progress.copy_id.as_deref().unwrap_or("<unknown>")
                );
                tokio::time::sleep(poll_interval).await;
            }
        }
    }
}
