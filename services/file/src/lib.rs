//! File service client: shares, directories and files.
//!
//! ```no_run
//! use azstorage_core::chunked::TransferOptions;
//! use azstorage_core::{AccountId, Client, Config, Context, Environment, SubDomainType};
//! use azstorage_file::{CreateFileInput, FilesClient};
//!
//! # async fn example(ctx: Context, content: bytes::Bytes) -> azstorage_core::Result<()> {
//! let account = AccountId::in_environment("account1", SubDomainType::File, Environment::Public);
//! let files = FilesClient::new(Client::new(ctx, Config::for_account(&account)));
//!
//! let input = CreateFileInput {
//!     content_length: content.len() as u64,
//!     ..Default::default()
//! };
//! files.create("share1", "reports", "q1.csv", &input).await?;
//! files
//!     .put_file("share1", "reports", "q1.csv", content, &TransferOptions::default())
//!     .await?;
//! # Ok(())
//! # }
//! ```

mod directories;
pub use directories::*;

mod files;
pub use files::*;

mod shares;
pub use shares::*;

mod smb;
