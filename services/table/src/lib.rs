//! Table service client.
//!
//! Entities are plain JSON objects; `PartitionKey` and `RowKey` are passed
//! separately and merged into the body where the service expects them.
//!
//! ```no_run
//! use azstorage_core::{AccountId, Client, Config, Context, Environment, SubDomainType};
//! use azstorage_table::{EntitiesClient, Entity, MetadataLevel, TablesClient};
//! use serde_json::json;
//!
//! # async fn example(ctx: Context) -> azstorage_core::Result<()> {
//! let account = AccountId::in_environment("account1", SubDomainType::Table, Environment::Public);
//! let client = Client::new(ctx, Config::for_account(&account));
//!
//! TablesClient::new(client.clone()).create("orders").await?;
//!
//! let entities = EntitiesClient::new(client);
//! let mut entity = Entity::new();
//! entity.insert("Amount".to_string(), json!(42));
//! entities.insert_or_replace("orders", "2024", "order-1", &entity).await?;
//! let got = entities.get("orders", "2024", "order-1", MetadataLevel::None).await?;
//! # Ok(())
//! # }
//! ```

mod entities;
pub use entities::*;

mod odata;
pub use odata::MetadataLevel;

mod tables;
pub use tables::*;
