//! Azure Storage data-plane clients.
//!
//! Every service lives behind a feature of the same name, all enabled by
//! default:
//!
//! - `blob`: `AccountsClient`, `ContainersClient` and `BlobsClient`
//! - `file`: `SharesClient`, `DirectoriesClient` and `FilesClient`
//! - `queue`: `QueuesClient` and `MessagesClient`
//! - `table`: `TablesClient` and `EntitiesClient`
//! - `datalake`: `FileSystemsClient` and `PathsClient`
//!
//! ```no_run
//! # #[cfg(all(feature = "default-context", feature = "queue"))]
//! # async fn example() -> azstorage::Result<()> {
//! use azstorage::queue::{MessagesClient, PutMessageInput};
//! use azstorage::SubDomainType;
//!
//! // Endpoint from AZURE_STORAGE_ENDPOINT or friends.
//! let client = azstorage::client_from_env(SubDomainType::Queue)?;
//! MessagesClient::new(client)
//!     .put("jobs", "hello", &PutMessageInput::default())
//!     .await?;
//! # Ok(())
//! # }
//! ```
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

pub use azstorage_core::*;

#[cfg(feature = "default-context")]
mod context;
#[cfg(feature = "default-context")]
pub use context::{client_for_account, client_from_env, default_context};

#[cfg(feature = "blob")]
pub mod blob {
    pub use azstorage_blob::*;
}

#[cfg(feature = "datalake")]
pub mod datalake {
    pub use azstorage_datalake::*;
}

#[cfg(feature = "file")]
pub mod file {
    pub use azstorage_file::*;
}

#[cfg(feature = "queue")]
pub mod queue {
    pub use azstorage_queue::*;
}

#[cfg(feature = "table")]
pub mod table {
    pub use azstorage_table::*;
}
