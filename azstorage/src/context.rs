use azstorage_core::{AccountId, Client, Config, Context, OsEnv, Result, SubDomainType};
use azstorage_file_read_tokio::TokioFileRead;
use azstorage_http_send_reqwest::ReqwestHttpSend;

/// Context sending requests with reqwest, reading files with tokio and
/// reading the process environment.
pub fn default_context() -> Context {
    Context::new()
        .with_http_send(ReqwestHttpSend::default())
        .with_file_read(TokioFileRead)
        .with_env(OsEnv)
}

/// Unauthenticated client for `account` on the default context.
///
/// Use [`Client::with_authorizer`] to attach credentials.
pub fn client_for_account(account: &AccountId) -> Client {
    Client::new(default_context(), Config::for_account(account))
}

/// Client on the default context, configured from env.
///
/// See [`Config::from_env`] for the variables read.
pub fn client_from_env(service: SubDomainType) -> Result<Client> {
    let ctx = default_context();
    let config = Config::from_env(&ctx, service)?;
    Ok(Client::new(ctx, config))
}
