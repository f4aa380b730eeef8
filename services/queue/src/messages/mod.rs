use azstorage_core::time::{self, DateTime};
use azstorage_core::{headers, validate, xml};
use azstorage_core::{Capability, Client, Error, Result, StorageRequest};
use http::{Method, StatusCode};
use serde::{Deserialize, Serialize};

mod id;
pub use id::MessageId;

/// Longest visibility timeout the service accepts, seven days.
pub const MAX_VISIBILITY_TIMEOUT: u32 = 7 * 24 * 60 * 60;
/// At most this many messages are returned by one `get` or `peek`.
pub const MAX_MESSAGES_PER_CALL: u8 = 32;
/// Message ttl meaning the message never expires.
pub const INFINITE_TTL: i64 = -1;

const X_MS_POPRECEIPT: &str = "x-ms-popreceipt";
const X_MS_TIME_NEXT_VISIBLE: &str = "x-ms-time-next-visible";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PutMessageInput {
    /// Seconds until the message expires, or [`INFINITE_TTL`]. The service
    /// default is seven days.
    pub message_ttl: Option<i64>,
    /// Seconds the message stays invisible after being put.
    pub visibility_timeout: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GetMessagesInput {
    /// Seconds the returned messages stay invisible, 1 to 7 days.
    pub visibility_timeout: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateMessageInput {
    /// New text of the message, or `None` to only change its visibility.
    pub message_text: Option<String>,
    pub pop_receipt: String,
    pub visibility_timeout: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateMessageResult {
    /// Pop receipt to use for the next update or delete.
    pub pop_receipt: String,
    pub time_next_visible: Option<DateTime>,
}

/// A message as returned by `put`, `get` and `peek`.
///
/// `put` returns no text, `peek` returns no pop receipt; those fields are
/// left empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct QueueMessage {
    pub message_id: String,
    pub insertion_time: String,
    pub expiration_time: String,
    pub pop_receipt: String,
    pub time_next_visible: String,
    pub dequeue_count: Option<u32>,
    pub message_text: Option<String>,
}

impl QueueMessage {
    pub fn insertion_time(&self) -> Result<DateTime> {
        time::parse_http_date(&self.insertion_time)
    }

    pub fn expiration_time(&self) -> Result<DateTime> {
        time::parse_http_date(&self.expiration_time)
    }
}

#[derive(Debug, Default, Deserialize)]
struct QueueMessagesList {
    #[serde(rename = "QueueMessage", default)]
    messages: Vec<QueueMessage>,
}

#[derive(Debug, Serialize)]
#[serde(rename = "QueueMessage")]
struct MessageBody<'a> {
    #[serde(rename = "MessageText")]
    message_text: &'a str,
}

fn check_visibility(visibility_timeout: u32, min: u32) -> Result<()> {
    validate::in_range("visibility_timeout", visibility_timeout, min, MAX_VISIBILITY_TIMEOUT)
}

fn check_count(number_of_messages: u8) -> Result<()> {
    validate::in_range(
        "number_of_messages",
        number_of_messages,
        1,
        MAX_MESSAGES_PER_CALL,
    )
}

/// Operations on the messages of a queue.
#[derive(Debug, Clone)]
pub struct MessagesClient {
    client: Client,
}

impl MessagesClient {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn request(method: Method, queue_name: &str) -> Result<StorageRequest> {
        validate::lower_case_name("queue_name", queue_name)?;
        Ok(StorageRequest::new(method, format!("{queue_name}/messages")))
    }

    fn message_request(method: Method, queue_name: &str, message_id: &str) -> Result<StorageRequest> {
        validate::lower_case_name("queue_name", queue_name)?;
        validate::non_empty("message_id", message_id)?;
        Ok(StorageRequest::new(
            method,
            format!("{queue_name}/messages/{message_id}"),
        ))
    }

    /// Add a message to the back of the queue.
    pub async fn put(
        &self,
        queue_name: &str,
        message_text: &str,
        input: &PutMessageInput,
    ) -> Result<QueueMessage> {
        match input.message_ttl {
            Some(INFINITE_TTL) => self.client.require(Capability::QueueMessageTtlInfinite)?,
            Some(ttl) if ttl < 1 => {
                return Err(Error::invalid_input(format!(
                    "`message_ttl` must be at least 1 second or {INFINITE_TTL}, got {ttl}"
                )))
            }
            _ => {}
        }
        if let Some(timeout) = input.visibility_timeout {
            check_visibility(timeout, 0)?;
            if let Some(ttl) = input.message_ttl.filter(|ttl| *ttl != INFINITE_TTL) {
                if i64::from(timeout) >= ttl {
                    return Err(Error::invalid_input(format!(
                        "`visibility_timeout` ({timeout}s) must be shorter than `message_ttl` ({ttl}s)"
                    )));
                }
            }
        }

        let req = Self::request(Method::POST, queue_name)?
            .query_opt("messagettl", input.message_ttl)
            .query_opt("visibilitytimeout", input.visibility_timeout)
            .xml_body(&MessageBody { message_text })?
            .expect(&[StatusCode::CREATED]);

        let resp = self.client.send(req).await?;
        let list: QueueMessagesList = xml::from_xml(resp.body())?;
        list.messages
            .into_iter()
            .next()
            .ok_or_else(|| Error::unexpected(format!("put on queue {queue_name} returned no message")))
    }

    /// Dequeue up to `number_of_messages` messages, hiding them for the
    /// visibility timeout.
    pub async fn get(
        &self,
        queue_name: &str,
        number_of_messages: u8,
        input: &GetMessagesInput,
    ) -> Result<Vec<QueueMessage>> {
        check_count(number_of_messages)?;
        if let Some(timeout) = input.visibility_timeout {
            check_visibility(timeout, 1)?;
        }

        let req = Self::request(Method::GET, queue_name)?
            .query("numofmessages", number_of_messages)
            .query_opt("visibilitytimeout", input.visibility_timeout);

        let resp = self.client.send(req).await?;
        Ok(xml::from_xml::<QueueMessagesList>(resp.body())?.messages)
    }

    /// Read up to `number_of_messages` messages without changing their
    /// visibility.
    pub async fn peek(&self, queue_name: &str, number_of_messages: u8) -> Result<Vec<QueueMessage>> {
        check_count(number_of_messages)?;

        let req = Self::request(Method::GET, queue_name)?
            .query("peekonly", "true")
            .query("numofmessages", number_of_messages);

        let resp = self.client.send(req).await?;
        Ok(xml::from_xml::<QueueMessagesList>(resp.body())?.messages)
    }

    /// Change the text and visibility of a dequeued message.
    pub async fn update(
        &self,
        queue_name: &str,
        message_id: &str,
        input: &UpdateMessageInput,
    ) -> Result<UpdateMessageResult> {
        validate::non_empty("pop_receipt", &input.pop_receipt)?;
        check_visibility(input.visibility_timeout, 0)?;

        let mut req = Self::message_request(Method::PUT, queue_name, message_id)?
            .query("popreceipt", &input.pop_receipt)
            .query("visibilitytimeout", input.visibility_timeout)
            .expect(&[StatusCode::NO_CONTENT]);
        if let Some(text) = &input.message_text {
            req = req.xml_body(&MessageBody { message_text: text })?;
        }

        let resp = self.client.send(req).await?;
        let h = resp.headers();
        Ok(UpdateMessageResult {
            pop_receipt: headers::require_str(h, X_MS_POPRECEIPT)?.to_string(),
            time_next_visible: headers::parse_date(h, X_MS_TIME_NEXT_VISIBLE)?,
        })
    }

    pub async fn delete(&self, queue_name: &str, message_id: &str, pop_receipt: &str) -> Result<()> {
        validate::non_empty("pop_receipt", pop_receipt)?;

        let req = Self::message_request(Method::DELETE, queue_name, message_id)?
            .query("popreceipt", pop_receipt)
            .expect(&[StatusCode::NO_CONTENT]);
        self.client.send(req).await?;
        Ok(())
    }

    /// Remove every message from the queue.
    pub async fn clear(&self, queue_name: &str) -> Result<()> {
        let req = Self::request(Method::DELETE, queue_name)?.expect(&[StatusCode::NO_CONTENT]);
        self.client.send(req).await?;
        Ok(())
    }
}
