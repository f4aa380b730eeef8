//! Blob service client.
//!
//! ```no_run
//! use azstorage_blob::{BlobsClient, PutBlockBlobFromFileInput};
//! use azstorage_core::{AccountId, Client, Config, Context, Environment, SubDomainType};
//!
//! # async fn example(ctx: Context) -> azstorage_core::Result<()> {
//! let account = AccountId::in_environment("account1", SubDomainType::Blob, Environment::Public);
//! let blobs = BlobsClient::new(Client::new(ctx, Config::for_account(&account)));
//!
//! blobs
//!     .put_block_blob_from_file("container1", "backups/db.bak", "/tmp/db.bak", &PutBlockBlobFromFileInput::default())
//!     .await?;
//! # Ok(())
//! # }
//! ```

mod accounts;
pub use accounts::AccountsClient;

mod blobs;
pub use blobs::*;

mod containers;
pub use containers::*;

mod lease;
pub use lease::{
    AcquireLeaseInput, AcquireLeaseResult, BreakLeaseInput, BreakLeaseResult, ChangeLeaseInput,
    ChangeLeaseResult, LeaseState, LeaseStatus, INFINITE_LEASE_DURATION,
};
