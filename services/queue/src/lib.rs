//! Queue service client.
//!
//! ```no_run
//! use azstorage_core::{AccountId, Client, Config, Context, Environment, SubDomainType};
//! use azstorage_queue::{GetMessagesInput, MessagesClient, PutMessageInput};
//!
//! # async fn example(ctx: Context) -> azstorage_core::Result<()> {
//! let account = AccountId::in_environment("account1", SubDomainType::Queue, Environment::Public);
//! let messages = MessagesClient::new(Client::new(ctx, Config::for_account(&account)));
//!
//! messages.put("jobs", "resize image 42", &PutMessageInput::default()).await?;
//! for msg in messages.get("jobs", 8, &GetMessagesInput::default()).await? {
//!     // ... handle msg.message_text ...
//!     messages.delete("jobs", &msg.message_id, &msg.pop_receipt).await?;
//! }
//! # Ok(())
//! # }
//! ```

mod messages;
pub use messages::*;

mod queues;
pub use queues::*;
