use std::fmt::Debug;

use async_trait::async_trait;
use http::request::Parts;

use crate::{Context, Result};

/// Authorize mutates an outgoing request so the service accepts it.
///
/// Clients build complete, unauthenticated requests and hand their parts to
/// the configured implementation right before sending. Shared key, SAS and
/// bearer token schemes all live outside this workspace.
#[async_trait]
pub trait Authorize: Debug + Send + Sync + 'static {
    /// Add whatever the scheme needs (headers, query parameters) to `req`.
    async fn authorize(&self, ctx: &Context, req: &mut Parts) -> Result<()>;
}

/// Sends requests as they are, for public resources or pre-signed endpoints.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopAuthorize;

#[async_trait]
impl Authorize for NoopAuthorize {
    async fn authorize(&self, _: &Context, _: &mut Parts) -> Result<()> {
        Ok(())
    }
}
