//! Core components for Azure Storage data-plane clients.
//!
//! This crate provides the foundational types shared by the service crates
//! (`azstorage-blob`, `azstorage-file`, `azstorage-queue`, `azstorage-table`
//! and `azstorage-datalake`).
//!
//! ## Overview
//!
//! - **Context**: holds implementations for HTTP sending, file reading and environment access
//! - **Config**: immutable endpoint, api version and user agent of a client
//! - **Client**: builds, authorizes and sends [`StorageRequest`]s, decoding service errors
//! - **AccountId**: parses and formats account endpoints, including DNS and edge zones
//! - **chunked** / **copy**: the chunked transfer and copy polling helpers
//!
//! ## Example
//!
//! ```no_run
//! use azstorage_core::{AccountId, Client, Config, Context, Environment, StorageRequest, SubDomainType};
//!
//! # async fn example() -> azstorage_core::Result<()> {
//! let account = AccountId::in_environment("account1", SubDomainType::Queue, Environment::Public);
//! let client = Client::new(Context::new(), Config::for_account(&account));
//!
//! let resp = client
//!     .send(StorageRequest::get("queue1").query("comp", "metadata"))
//!     .await?;
//! # Ok(())
//! # }
//! ```

mod account;
pub use account::{encode_path, AccountId, Environment, SubDomainType};
mod authorize;
pub use authorize::{Authorize, NoopAuthorize};
mod client;
pub use client::Client;
mod config;
pub use config::*;
mod connection_string;
mod context;
pub use context::{
    Context, Env, FileRead, HttpSend, NoopEnv, NoopFileRead, NoopHttpSend, OsEnv, StaticEnv,
};
mod error;
pub use error::{Error, ErrorKind, Result, ServiceError};
mod range;
pub use range::{plan_ranges, ByteRange};
mod request;
pub use request::StorageRequest;
mod service_error;
mod version;
pub use version::{ApiVersion, Capability};

pub mod acl;
pub mod chunked;
pub mod copy;
pub mod encoding;
pub mod headers;
pub mod metadata;
pub mod service_properties;
pub mod time;
pub mod utils;
pub mod validate;
pub mod xml;
