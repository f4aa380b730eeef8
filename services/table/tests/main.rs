use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::env;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use azstorage_core::{Authorize, Client, Config, Context, ErrorKind, HttpSend, Result};
use azstorage_http_send_reqwest::ReqwestHttpSend;
use azstorage_table::{
    EntitiesClient, Entity, MetadataLevel, QueryEntitiesInput, QueryTablesInput, TablesClient,
};
use bytes::Bytes;
use http::{Response, StatusCode};
use log::warn;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

const ENDPOINT: &str = "https://account1.table.core.windows.net";

type Key = (String, String);

#[derive(Debug, Default)]
struct State {
    tables: BTreeSet<String>,
    entities: BTreeMap<String, BTreeMap<Key, Entity>>,
}

/// In-memory table service. Entities are kept sorted by key so paging
/// behaves like the real service.
#[derive(Debug, Clone, Default)]
struct FakeTableService(Arc<Mutex<State>>);

impl FakeTableService {
    fn client(&self) -> Client {
        Client::new(
            Context::new().with_http_send(self.clone()),
            Config::new(ENDPOINT),
        )
    }
}

fn respond(status: StatusCode, headers: &[(&str, String)], body: Value) -> Result<Response<Bytes>> {
    let mut builder = Response::builder()
        .status(status)
        .header("content-type", "application/json;odata=nometadata");
    for (k, v) in headers {
        builder = builder.header(*k, v.as_str());
    }
    let body = if body.is_null() {
        Bytes::new()
    } else {
        Bytes::from(body.to_string())
    };
    Ok(builder.body(body)?)
}

fn error(status: StatusCode, code: &str) -> Result<Response<Bytes>> {
    respond(
        status,
        &[],
        json!({"odata.error": {"code": code, "message": {"lang": "en-US", "value": code}}}),
    )
}

/// Split `table(PartitionKey='pk',RowKey='rk')` into its parts.
fn entity_path(path: &str) -> Option<(String, Key)> {
    let (table, keys) = path.split_once("(PartitionKey='")?;
    let (pk, rest) = keys.split_once("',RowKey='")?;
    let rk = rest.strip_suffix("')")?;
    Some((table.to_string(), (pk.replace("''", "'"), rk.replace("''", "'"))))
}

fn body_entity(req: &http::Request<Bytes>) -> Result<Entity> {
    Ok(serde_json::from_slice(req.body())?)
}

#[async_trait]
impl HttpSend for FakeTableService {
    async fn http_send(&self, req: http::Request<Bytes>) -> Result<Response<Bytes>> {
        let path = req.uri().path().trim_start_matches('/').to_string();
        let query: HashMap<String, String> =
            form_urlencoded::parse(req.uri().query().unwrap_or_default().as_bytes())
                .into_owned()
                .collect();

        let mut guard = self.0.lock().unwrap();
        let state = &mut *guard;
        let method = req.method().as_str();

        if path == "Tables" {
            return match method {
                "POST" => {
                    let name = body_entity(&req)?["TableName"]
                        .as_str()
                        .unwrap_or_default()
                        .to_string();
                    if !state.tables.insert(name.clone()) {
                        return error(StatusCode::CONFLICT, "TableAlreadyExists");
                    }
                    state.entities.insert(name, BTreeMap::new());
                    respond(StatusCode::NO_CONTENT, &[], Value::Null)
                }
                _ => {
                    let value: Vec<Value> = state
                        .tables
                        .iter()
                        .map(|t| json!({"TableName": t}))
                        .collect();
                    respond(StatusCode::OK, &[], json!({ "value": value }))
                }
            };
        }

        if let Some(name) = path
            .strip_prefix("Tables('")
            .and_then(|p| p.strip_suffix("')"))
        {
            if !state.tables.contains(name) {
                return error(StatusCode::NOT_FOUND, "ResourceNotFound");
            }
            return match method {
                "DELETE" => {
                    state.tables.remove(name);
                    state.entities.remove(name);
                    respond(StatusCode::NO_CONTENT, &[], Value::Null)
                }
                _ => respond(StatusCode::OK, &[], json!({"TableName": name})),
            };
        }

        if let Some(table) = path.strip_suffix("()") {
            let Some(rows) = state.entities.get(table) else {
                return error(StatusCode::NOT_FOUND, "TableNotFound");
            };
            let start = match (query.get("NextPartitionKey"), query.get("NextRowKey")) {
                (Some(pk), Some(rk)) => (pk.clone(), rk.clone()),
                _ => (String::new(), String::new()),
            };
            let top = query
                .get("$top")
                .and_then(|t| t.parse().ok())
                .unwrap_or(1000);

            let mut page = rows.range(start..);
            let value: Vec<Value> = page
                .by_ref()
                .take(top)
                .map(|(_, e)| Value::Object(e.clone()))
                .collect();
            let headers = match page.next() {
                Some(((pk, rk), _)) => vec![
                    ("x-ms-continuation-NextPartitionKey", pk.clone()),
                    ("x-ms-continuation-NextRowKey", rk.clone()),
                ],
                None => vec![],
            };
            return respond(StatusCode::OK, &headers, json!({ "value": value }));
        }

        if let Some((table, key)) = entity_path(&path) {
            let Some(rows) = state.entities.get_mut(&table) else {
                return error(StatusCode::NOT_FOUND, "TableNotFound");
            };
            return match method {
                "GET" => match rows.get(&key) {
                    Some(e) => respond(StatusCode::OK, &[], Value::Object(e.clone())),
                    None => error(StatusCode::NOT_FOUND, "ResourceNotFound"),
                },
                "PUT" => {
                    rows.insert(key, body_entity(&req)?);
                    respond(StatusCode::NO_CONTENT, &[], Value::Null)
                }
                "MERGE" => {
                    let incoming = body_entity(&req)?;
                    rows.entry(key).or_default().extend(incoming);
                    respond(StatusCode::NO_CONTENT, &[], Value::Null)
                }
                "DELETE" => match rows.remove(&key) {
                    Some(_) => respond(StatusCode::NO_CONTENT, &[], Value::Null),
                    None => error(StatusCode::NOT_FOUND, "ResourceNotFound"),
                },
                _ => error(StatusCode::METHOD_NOT_ALLOWED, "UnsupportedHttpVerb"),
            };
        }

        // Insert into `{table}`.
        let Some(rows) = state.entities.get_mut(&path) else {
            return error(StatusCode::NOT_FOUND, "TableNotFound");
        };
        let entity = body_entity(&req)?;
        let key = (
            entity["PartitionKey"].as_str().unwrap_or_default().to_string(),
            entity["RowKey"].as_str().unwrap_or_default().to_string(),
        );
        if rows.contains_key(&key) {
            return error(StatusCode::CONFLICT, "EntityAlreadyExists");
        }
        rows.insert(key, entity);
        respond(StatusCode::NO_CONTENT, &[], Value::Null)
    }
}

fn entity(value: Value) -> Entity {
    match value {
        Value::Object(map) => map,
        _ => Entity::new(),
    }
}

#[tokio::test]
async fn test_table_lifecycle() -> anyhow::Result<()> {
    let fake = FakeTableService::default();
    let tables = TablesClient::new(fake.client());

    assert!(!tables.exists("orders").await?);
    tables.create("orders").await?;
    assert!(tables.exists("orders").await?);

    let err = tables.create("orders").await.unwrap_err();
    assert_eq!(err.service_error().unwrap().code, "TableAlreadyExists");

    let listed = tables.query(&QueryTablesInput::default()).await?;
    assert_eq!(listed.tables.len(), 1);
    assert_eq!(listed.tables[0].table_name, "orders");
    assert_eq!(listed.next_table_name, None);

    tables.delete("orders").await?;
    assert!(!tables.exists("orders").await?);
    Ok(())
}

#[tokio::test]
async fn test_entity_upserts() -> anyhow::Result<()> {
    let fake = FakeTableService::default();
    TablesClient::new(fake.client()).create("orders").await?;
    let entities = EntitiesClient::new(fake.client());

    entities
        .insert("orders", "2024", "order-1", &entity(json!({"hello": "world"})))
        .await?;
    let err = entities
        .insert("orders", "2024", "order-1", &entity(json!({"hello": "again"})))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Service);
    assert_eq!(err.service_error().unwrap().code, "EntityAlreadyExists");

    entities
        .insert_or_merge("orders", "2024", "order-1", &entity(json!({"extra": 1})))
        .await?;
    let got = entities
        .get("orders", "2024", "order-1", MetadataLevel::None)
        .await?;
    assert_eq!(got["hello"], json!("world"));
    assert_eq!(got["extra"], json!(1));

    entities
        .insert_or_replace("orders", "2024", "order-1", &entity(json!({"hello": "pandas"})))
        .await?;
    let got = entities
        .get("orders", "2024", "order-1", MetadataLevel::Minimal)
        .await?;
    assert_eq!(
        Value::Object(got),
        json!({"PartitionKey": "2024", "RowKey": "order-1", "hello": "pandas"})
    );

    entities.delete("orders", "2024", "order-1").await?;
    let err = entities
        .get("orders", "2024", "order-1", MetadataLevel::None)
        .await
        .unwrap_err();
    assert!(err.is_not_found());
    Ok(())
}

#[tokio::test]
async fn test_query_pages_with_continuation() -> anyhow::Result<()> {
    let fake = FakeTableService::default();
    TablesClient::new(fake.client()).create("orders").await?;
    let entities = EntitiesClient::new(fake.client());

    for i in 0..5 {
        entities
            .insert_or_replace("orders", "2024", &format!("order-{i}"), &Entity::new())
            .await?;
    }

    let mut input = QueryEntitiesInput {
        top: Some(2),
        ..Default::default()
    };
    let mut row_keys = Vec::new();
    let mut pages = 0;
    loop {
        let page = entities.query("orders", &input).await?;
        pages += 1;
        row_keys.extend(
            page.entities
                .iter()
                .map(|e| e["RowKey"].as_str().unwrap_or_default().to_string()),
        );
        if page.next_row_key.is_none() {
            break;
        }
        input.next_partition_key = page.next_partition_key;
        input.next_row_key = page.next_row_key;
    }

    assert_eq!(pages, 3);
    assert_eq!(
        row_keys,
        ["order-0", "order-1", "order-2", "order-3", "order-4"]
    );
    Ok(())
}

#[tokio::test]
async fn test_query_rejects_half_continuation() {
    let fake = FakeTableService::default();
    let err = EntitiesClient::new(fake.client())
        .query(
            "orders",
            &QueryEntitiesInput {
                next_partition_key: Some("2024".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidInput);
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
        env::var("AZSTORAGE_TABLE_ENDPOINT").expect("env AZSTORAGE_TABLE_ENDPOINT must set");
    let sas = env::var("AZSTORAGE_SAS_TOKEN").expect("env AZSTORAGE_SAS_TOKEN must set");

    let ctx = Context::new().with_http_send(ReqwestHttpSend::default());
    Some(Client::new(ctx, Config::new(endpoint)).with_authorizer(SasToken(sas)))
}

#[tokio::test]
async fn test_live_entity_round_trip() -> anyhow::Result<()> {
    let Some(client) = init_live_client() else {
        warn!("AZSTORAGE_TEST is not set, skipped");
        return Ok(());
    };

    let table = format!("azstorage{}", std::process::id());
    let tables = TablesClient::new(client.clone());
    let entities = EntitiesClient::new(client);

    tables.create(&table).await?;
    entities
        .insert(&table, "hello", "there", &entity(json!({"hello": "world"})))
        .await?;
    let got = entities
        .get(&table, "hello", "there", MetadataLevel::None)
        .await?;
    assert_eq!(got["hello"], json!("world"));

    entities.delete(&table, "hello", "there").await?;
    tables.delete(&table).await?;
    Ok(())
}
