use crate::{connection_string, AccountId, ApiVersion, Context, Error, Result, SubDomainType};

/// Default value of the `User-Agent` header.
pub const DEFAULT_USER_AGENT: &str = concat!("azstorage-rs/", env!("CARGO_PKG_VERSION"));

/// Env var holding the full endpoint, such as `https://myaccount.blob.core.windows.net`.
pub const AZURE_STORAGE_ENDPOINT: &str = "AZURE_STORAGE_ENDPOINT";
/// Env var holding the account name, used when no endpoint is set.
pub const AZURE_STORAGE_ACCOUNT_NAME: &str = "AZURE_STORAGE_ACCOUNT_NAME";
/// Env var holding the domain suffix, defaults to the public cloud.
pub const AZURE_STORAGE_DOMAIN_SUFFIX: &str = "AZURE_STORAGE_DOMAIN_SUFFIX";
/// Env var holding the api version, such as `2020-08-04`.
pub const AZURE_STORAGE_API_VERSION: &str = "AZURE_STORAGE_API_VERSION";
/// Env var holding a connection string.
pub const AZURE_STORAGE_CONNECTION_STRING: &str = "AZURE_STORAGE_CONNECTION_STRING";

/// Config carries the settings shared by every request of a client.
///
/// Config is immutable once handed to a client; the `with_*` methods
/// consume and return a new value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    endpoint: String,
    api_version: ApiVersion,
    user_agent: String,
}

impl Config {
    /// Create a config for the given service endpoint.
    ///
    /// A trailing `/` is removed.
    pub fn new(endpoint: impl Into<String>) -> Self {
        let endpoint = endpoint.into().trim_end_matches('/').to_string();
        Self {
            endpoint,
            api_version: ApiVersion::default(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }

    /// Create a config pointing at the endpoint of `account`.
    pub fn for_account(account: &AccountId) -> Self {
        Self::new(account.endpoint())
    }

    /// Set the api version sent as `x-ms-version`.
    pub fn with_api_version(mut self, api_version: ApiVersion) -> Self {
        self.api_version = api_version;
        self
    }

    /// Set the `User-Agent` header.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Append a product token to the `User-Agent` header.
    pub fn append_user_agent(mut self, token: &str) -> Self {
        if !token.is_empty() {
            self.user_agent = format!("{} {token}", self.user_agent);
        }
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn api_version(&self) -> ApiVersion {
        self.api_version
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    /// Load config from env.
    ///
    /// The endpoint is resolved from, in order:
    ///
    /// - env value: [`AZURE_STORAGE_ENDPOINT`]
    /// - env value: [`AZURE_STORAGE_CONNECTION_STRING`]
    /// - env values: [`AZURE_STORAGE_ACCOUNT_NAME`] and [`AZURE_STORAGE_DOMAIN_SUFFIX`]
    ///
    /// The api version is read from [`AZURE_STORAGE_API_VERSION`] when set.
    pub fn from_env(ctx: &Context, service: SubDomainType) -> Result<Self> {
        let mut config = if let Some(endpoint) = ctx.env_var(AZURE_STORAGE_ENDPOINT) {
            Self::new(endpoint)
        } else if let Some(conn_str) = ctx.env_var(AZURE_STORAGE_CONNECTION_STRING) {
            Self::try_from_connection_string(&conn_str, service)?
        } else if let Some(account_name) = ctx.env_var(AZURE_STORAGE_ACCOUNT_NAME) {
            let suffix = ctx
                .env_var(AZURE_STORAGE_DOMAIN_SUFFIX)
                .unwrap_or_else(|| crate::Environment::Public.storage_domain_suffix().to_string());
            Self::for_account(&AccountId::new(account_name, service, suffix))
        } else {
            return Err(Error::config_invalid(format!(
                "neither {AZURE_STORAGE_ENDPOINT}, {AZURE_STORAGE_CONNECTION_STRING} nor {AZURE_STORAGE_ACCOUNT_NAME} is set"
            )));
        };

        if let Some(v) = ctx.env_var(AZURE_STORAGE_API_VERSION) {
            config = config.with_api_version(v.parse()?);
        }

        Ok(config)
    }

    /// Parses an [Azure connection string][1] into a configuration object.
    ///
    /// The service determines which endpoint field is used. Credentials in
    /// the connection string are ignored.
    ///
    /// An example of a connection string looks like:
    ///
    /// ```txt
    /// AccountName=mystorageaccount;
    /// EndpointSuffix=core.windows.net;
    /// DefaultEndpointsProtocol=https
    /// ```
    ///
    /// [1]: https://learn.microsoft.com/en-us/azure/storage/common/storage-configure-connection-string
    pub fn try_from_connection_string(conn_str: &str, service: SubDomainType) -> Result<Self> {
        let info = connection_string::parse(conn_str, service)?;
        let endpoint = info.endpoint.ok_or_else(|| {
            Error::config_invalid(format!(
                "connection string does not describe a {service} endpoint"
            ))
        })?;
        Ok(Self::new(endpoint))
    }
}
