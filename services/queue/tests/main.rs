use std::collections::HashMap;
use std::env;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use azstorage_core::{
    ApiVersion, Authorize, Client, Config, Context, ErrorKind, HttpSend, Result,
};
use azstorage_http_send_reqwest::ReqwestHttpSend;
use azstorage_queue::{
    GetMessagesInput, MessagesClient, PutMessageInput, QueuesClient, UpdateMessageInput,
    INFINITE_TTL,
};
use bytes::Bytes;
use http::{Response, StatusCode};
use log::warn;
use pretty_assertions::assert_eq;

const ENDPOINT: &str = "https://account1.queue.core.windows.net";

#[derive(Debug, Clone)]
struct Message {
    id: String,
    text: String,
    pop_receipt: u32,
    dequeue_count: u32,
    visible: bool,
}

#[derive(Debug, Default)]
struct State {
    messages: Vec<Message>,
    next_id: u32,
    requests: usize,
}

/// In-memory queue. Dequeued messages stay hidden until deleted or made
/// visible again by an update with a zero timeout.
#[derive(Debug, Clone, Default)]
struct FakeQueueService(Arc<Mutex<State>>);

impl FakeQueueService {
    fn client(&self, version: ApiVersion) -> Client {
        Client::new(
            Context::new().with_http_send(self.clone()),
            Config::new(ENDPOINT).with_api_version(version),
        )
    }

    fn requests(&self) -> usize {
        self.0.lock().unwrap().requests
    }
}

fn respond(status: StatusCode, headers: &[(&str, String)], body: String) -> Result<Response<Bytes>> {
    let mut builder = Response::builder().status(status);
    for (k, v) in headers {
        builder = builder.header(*k, v.as_str());
    }
    Ok(builder.body(Bytes::from(body))?)
}

fn message_text(body: &[u8]) -> String {
    let body = String::from_utf8_lossy(body);
    body.split_once("<MessageText>")
        .and_then(|(_, rest)| rest.split_once("</MessageText>"))
        .map(|(text, _)| text.to_string())
        .unwrap_or_default()
}

fn list(messages: &[Message], with_receipt: bool) -> String {
    let items: String = messages
        .iter()
        .map(|m| {
            let receipt = if with_receipt {
                format!("<PopReceipt>receipt-{}</PopReceipt>", m.pop_receipt)
            } else {
                String::new()
            };
            format!(
                "<QueueMessage><MessageId>{}</MessageId><InsertionTime>Fri, 09 Oct 2009 21:04:30 GMT</InsertionTime><ExpirationTime>Fri, 16 Oct 2009 21:04:30 GMT</ExpirationTime>{receipt}<DequeueCount>{}</DequeueCount><MessageText>{}</MessageText></QueueMessage>",
                m.id, m.dequeue_count, m.text
            )
        })
        .collect();
    format!("<?xml version=\"1.0\" encoding=\"utf-8\"?><QueueMessagesList>{items}</QueueMessagesList>")
}

#[async_trait]
impl HttpSend for FakeQueueService {
    async fn http_send(&self, req: http::Request<Bytes>) -> Result<Response<Bytes>> {
        let path = req.uri().path().trim_start_matches('/').to_string();
        let query: HashMap<String, String> =
            form_urlencoded::parse(req.uri().query().unwrap_or_default().as_bytes())
                .into_owned()
                .collect();

        let mut guard = self.0.lock().unwrap();
        let state = &mut *guard;
        state.requests += 1;

        let segments: Vec<&str> = path.split('/').collect();
        match (req.method().as_str(), segments.as_slice()) {
            ("POST", [_, "messages"]) => {
                state.next_id += 1;
                let msg = Message {
                    id: format!("msg-{}", state.next_id),
                    text: message_text(req.body()),
                    pop_receipt: 0,
                    dequeue_count: 0,
                    visible: true,
                };
                let body = list(std::slice::from_ref(&msg), true);
                state.messages.push(msg);
                respond(StatusCode::CREATED, &[], body)
            }
            ("GET", [_, "messages"]) => {
                let n: usize = query["numofmessages"].parse().unwrap_or(1);
                let peek = query.contains_key("peekonly");
                let mut picked = Vec::new();
                for msg in state.messages.iter_mut().filter(|m| m.visible).take(n) {
                    if !peek {
                        msg.visible = false;
                        msg.dequeue_count += 1;
                        msg.pop_receipt += 1;
                    }
                    picked.push(msg.clone());
                }
                respond(StatusCode::OK, &[], list(&picked, !peek))
            }
            ("PUT", [_, "messages", id]) => {
                let Some(msg) = state.messages.iter_mut().find(|m| m.id == *id) else {
                    return respond(StatusCode::NOT_FOUND, &[], String::new());
                };
                if query["popreceipt"] != format!("receipt-{}", msg.pop_receipt) {
                    return respond(
                        StatusCode::BAD_REQUEST,
                        &[("x-ms-error-code", "PopReceiptMismatch".to_string())],
                        String::new(),
                    );
                }
                if !req.body().is_empty() {
                    msg.text = message_text(req.body());
                }
                msg.visible = query["visibilitytimeout"] == "0";
                msg.pop_receipt += 1;
                respond(
                    StatusCode::NO_CONTENT,
                    &[
                        ("x-ms-popreceipt", format!("receipt-{}", msg.pop_receipt)),
                        ("x-ms-time-next-visible", "Fri, 09 Oct 2009 23:29:20 GMT".to_string()),
                    ],
                    String::new(),
                )
            }
            ("DELETE", [_, "messages", id]) => {
                let Some(pos) = state.messages.iter().position(|m| m.id == *id) else {
                    return respond(StatusCode::NOT_FOUND, &[], String::new());
                };
                let receipt = format!("receipt-{}", state.messages[pos].pop_receipt);
                if query["popreceipt"] != receipt {
                    return respond(
                        StatusCode::BAD_REQUEST,
                        &[("x-ms-error-code", "PopReceiptMismatch".to_string())],
                        String::new(),
                    );
                }
                state.messages.remove(pos);
                respond(StatusCode::NO_CONTENT, &[], String::new())
            }
            ("GET", [_]) if query.get("comp").map(String::as_str) == Some("metadata") => respond(
                StatusCode::OK,
                &[
                    ("x-ms-approximate-messages-count", state.messages.len().to_string()),
                    ("x-ms-meta-owner", "tests".to_string()),
                ],
                String::new(),
            ),
            _ => respond(StatusCode::NOT_FOUND, &[], String::new()),
        }
    }
}

#[tokio::test]
async fn test_message_lifecycle() -> anyhow::Result<()> {
    let fake = FakeQueueService::default();
    let messages = MessagesClient::new(fake.client(ApiVersion::default()));

    let put = messages
        .put("queue1", "first", &PutMessageInput::default())
        .await?;
    messages
        .put("queue1", "second", &PutMessageInput::default())
        .await?;
    assert_eq!(put.message_id, "msg-1");

    let peeked = messages.peek("queue1", 32).await?;
    assert_eq!(peeked.len(), 2);
    assert!(peeked[0].pop_receipt.is_empty());

    let got = messages
        .get("queue1", 1, &GetMessagesInput { visibility_timeout: Some(30) })
        .await?;
    assert_eq!(got.len(), 1);
    assert_eq!(got[0].message_text.as_deref(), Some("first"));
    assert_eq!(got[0].dequeue_count, Some(1));

    let updated = messages
        .update(
            "queue1",
            &got[0].message_id,
            &UpdateMessageInput {
                message_text: Some("first, retried".to_string()),
                pop_receipt: got[0].pop_receipt.clone(),
                visibility_timeout: 0,
            },
        )
        .await?;
    assert!(updated.time_next_visible.is_some());

    let stale = messages
        .delete("queue1", &got[0].message_id, &got[0].pop_receipt)
        .await
        .unwrap_err();
    assert_eq!(stale.service_error().unwrap().code, "PopReceiptMismatch");

    let metadata = QueuesClient::new(fake.client(ApiVersion::default()))
        .get_metadata("queue1")
        .await?;
    assert_eq!(metadata.approximate_message_count, 2);
    assert_eq!(metadata.metadata["owner"], "tests");

    let peeked = messages.peek("queue1", 1).await?;
    assert_eq!(peeked[0].message_text.as_deref(), Some("first, retried"));
    Ok(())
}

#[tokio::test]
async fn test_validation_happens_before_sending() {
    let fake = FakeQueueService::default();
    let messages = MessagesClient::new(fake.client(ApiVersion::default()));

    let err = messages
        .get("queue1", 33, &GetMessagesInput::default())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidInput);

    let err = messages
        .get("queue1", 1, &GetMessagesInput { visibility_timeout: Some(0) })
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidInput);

    let err = messages
        .put("Queue1", "x", &PutMessageInput::default())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidInput);

    let err = messages
        .put(
            "queue1",
            "x",
            &PutMessageInput {
                message_ttl: Some(60),
                visibility_timeout: Some(60),
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidInput);

    assert_eq!(fake.requests(), 0);
}

#[tokio::test]
async fn test_put_with_infinite_ttl() -> anyhow::Result<()> {
    let fake = FakeQueueService::default();
    let input = PutMessageInput {
        message_ttl: Some(INFINITE_TTL),
        ..Default::default()
    };

    MessagesClient::new(fake.client(ApiVersion::V2017_07_29))
        .put("queue1", "forever", &input)
        .await?;
    assert_eq!(fake.requests(), 1);
    Ok(())
}

/// Appends a SAS token to every request.
#[derive(Debug)]
struct SasToken(String);

#[async_trait]
impl Authorize for SasToken {
    async fn authorize(&self, _: &Context, req: &mut http::request::Parts) -> Result<()> {
        let sep = if req.uri.query().is_some() { '&' } else { '?' };
        req.uri = format!("{}{sep}{}", req.uri, self.0.trim_start_matches('?')).parse()?;
        Ok(())
    }
}

fn init_live_client() -> Option<Client> {
    let _ = env_logger::builder().is_test(true).try_init();
    let _ = dotenv::dotenv();

    if env::var("AZSTORAGE_TEST").unwrap_or_default() != "on" {
        return None;
    }

    let endpoint =
        env::var("AZSTORAGE_QUEUE_ENDPOINT").expect("env AZSTORAGE_QUEUE_ENDPOINT must set");
    let sas = env::var("AZSTORAGE_SAS_TOKEN").expect("env AZSTORAGE_SAS_TOKEN must set");

    let ctx = Context::new().with_http_send(ReqwestHttpSend::default());
    Some(Client::new(ctx, Config::new(endpoint)).with_authorizer(SasToken(sas)))
}

#[tokio::test]
async fn test_live_queue_round_trip() -> anyhow::Result<()> {
    let Some(client) = init_live_client() else {
        warn!("AZSTORAGE_TEST is not set, skipped");
        return Ok(());
    };

    let queue = format!("azstorage-{}", std::process::id());
    let queues = QueuesClient::new(client.clone());
    let messages = MessagesClient::new(client);

    queues.create(&queue, &HashMap::new()).await?;
    messages
        .put(&queue, "hello", &PutMessageInput::default())
        .await?;

    let got = messages
        .get(&queue, 1, &GetMessagesInput::default())
        .await?;
    assert_eq!(got.len(), 1);
    assert_eq!(got[0].message_text.as_deref(), Some("hello"));
    messages
        .delete(&queue, &got[0].message_id, &got[0].pop_receipt)
        .await?;

    queues.delete(&queue).await?;
    Ok(())
}
