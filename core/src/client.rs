use std::sync::Arc;

use bytes::Bytes;
use log::{debug, warn};

use crate::{
    service_error, ApiVersion, Authorize, Capability, Config, Context, Error, NoopAuthorize,
    Result, StorageRequest,
};

/// Client sends storage requests for one service endpoint.
///
/// Every service client wraps one of these. It is cheap to clone.
#[derive(Debug, Clone)]
pub struct Client {
    ctx: Context,
    config: Arc<Config>,
    authorizer: Arc<dyn Authorize>,
}

impl Client {
    /// Create a client sending unauthenticated requests.
    pub fn new(ctx: Context, config: Config) -> Self {
        Self {
            ctx,
            config: Arc::new(config),
            authorizer: Arc::new(NoopAuthorize),
        }
    }

    /// Replace the authorizer applied to every request.
    pub fn with_authorizer(mut self, authorizer: impl Authorize) -> Self {
        self.authorizer = Arc::new(authorizer);
        self
    }

    pub fn context(&self) -> &Context {
        &self.ctx
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn api_version(&self) -> ApiVersion {
        self.config.api_version()
    }

    /// Fail with `Unsupported` if the configured api version lacks `capability`.
    pub fn require(&self, capability: Capability) -> Result<()> {
        self.config.api_version().require(capability)
    }

    /// Build, authorize and send the request.
    ///
    /// Responses with an unexpected status are turned into service errors.
    pub async fn send(&self, req: StorageRequest) -> Result<http::Response<Bytes>> {
        let expected = req.clone();
        let (mut parts, body) = req.build(&self.config)?.into_parts();

        self.authorizer.authorize(&self.ctx, &mut parts).await?;
        let req = http::Request::from_parts(parts, body);

        debug!(
            "sending storage request: {} {} (x-ms-version {})",
            req.method(),
            req.uri().path(),
            self.config.api_version()
        );
        let resp = self.ctx.http_send(req).await?;
        debug!("got storage response: {}", resp.status());

        if expected.is_expected(resp.status()) {
            return Ok(resp);
        }

        let err = service_error::decode(&resp);
        warn!(
            "{} {} failed: {err}",
            expected.method(),
            expected.path()
        );
        Err(Error::service(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ErrorKind, HttpSend};
    use async_trait::async_trait;
    use http::request::Parts;
    use http::StatusCode;
    use std::sync::Mutex;

    #[derive(Debug, Default)]
    struct Recorder {
        status: u16,
        seen: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl HttpSend for Arc<Recorder> {
        async fn http_send(&self, req: http::Request<Bytes>) -> Result<http::Response<Bytes>> {
            self.seen.lock().unwrap().push(req.uri().to_string());
            Ok(http::Response::builder()
                .status(self.status)
                .body(Bytes::new())
                .unwrap())
        }
    }

    #[derive(Debug)]
    struct AppendSas;

    #[async_trait]
    impl Authorize for AppendSas {
        async fn authorize(&self, _: &Context, req: &mut Parts) -> Result<()> {
            let uri = format!("{}&sig=secret", req.uri);
            req.uri = uri.parse()?;
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_send_applies_authorizer() {
        let recorder = Arc::new(Recorder {
            status: 201,
            ..Default::default()
        });
        let client = Client::new(
            Context::new().with_http_send(recorder.clone()),
            Config::new("https://account1.queue.core.windows.net"),
        )
        .with_authorizer(AppendSas);

        client
            .send(StorageRequest::put("queue1").query("comp", "metadata").expect(&[StatusCode::CREATED]))
            .await
            .unwrap();

        assert_eq!(
            recorder.seen.lock().unwrap().as_slice(),
            ["https://account1.queue.core.windows.net/queue1?comp=metadata&sig=secret"]
        );
    }

    #[tokio::test]
    async fn test_send_unexpected_status() {
        let recorder = Arc::new(Recorder {
            status: 404,
            ..Default::default()
        });
        let client = Client::new(
            Context::new().with_http_send(recorder),
            Config::new("https://account1.queue.core.windows.net"),
        );

        let err = client.send(StorageRequest::get("queue1")).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Service);
        assert!(err.is_not_found());
        assert_eq!(err.service_error().unwrap().code, "Unknown");
    }

    #[test]
    fn test_require() {
        let client = Client::new(
            Context::new(),
            Config::new("https://a.dfs.core.windows.net").with_api_version(ApiVersion::V2017_07_29),
        );
        assert!(client.require(Capability::DataLakeFileSystems).is_err());
    }
}
