//! Data Lake Storage Gen2 client for hierarchical file systems on the
//! `dfs` endpoint.
//!
//! ```no_run
//! use std::collections::HashMap;
//!
//! use azstorage_core::{AccountId, Client, Config, Context, Environment, SubDomainType};
//! use azstorage_datalake::{CreatePathInput, FileSystemsClient, PathResource, PathsClient};
//!
//! # async fn example(ctx: Context) -> azstorage_core::Result<()> {
//! let account = AccountId::in_environment("account1", SubDomainType::DataLake, Environment::Public);
//! let client = Client::new(ctx, Config::for_account(&account));
//!
//! FileSystemsClient::new(client.clone())
//!     .create("raw", &HashMap::new())
//!     .await?;
//! PathsClient::new(client)
//!     .create("raw", "2024/01", &CreatePathInput::new(PathResource::Directory))
//!     .await?;
//! # Ok(())
//! # }
//! ```

mod filesystems;
pub use filesystems::*;

mod paths;
pub use paths::*;
