use azstorage_core::{headers, validate};
use azstorage_core::{Client, Error, Result, StorageRequest};
use http::{Method, StatusCode};
use serde::Deserialize;
use serde_json::Value;

use crate::odata::{self, quote_key, MetadataLevel};

mod id;
pub use id::EntityId;

/// Property bag of an entity, as sent and returned by the service.
pub type Entity = serde_json::Map<String, Value>;

const PARTITION_KEY: &str = "PartitionKey";
const ROW_KEY: &str = "RowKey";
const X_MS_CONTINUATION_NEXT_PARTITION_KEY: &str = "x-ms-continuation-NextPartitionKey";
const X_MS_CONTINUATION_NEXT_ROW_KEY: &str = "x-ms-continuation-NextRowKey";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryEntitiesInput {
    /// OData filter expression, e.g. `PartitionKey eq '2024'`.
    pub filter: Option<String>,
    /// Properties to return. All properties when empty.
    pub select: Vec<String>,
    pub top: Option<u32>,
    pub metadata_level: MetadataLevel,
    /// Continuation from a previous page.
    pub next_partition_key: Option<String>,
    pub next_row_key: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryEntitiesResult {
    pub entities: Vec<Entity>,
    /// Both continuation keys are set when more entities are available.
    pub next_partition_key: Option<String>,
    pub next_row_key: Option<String>,
}

#[derive(Debug, Deserialize)]
struct EntityList {
    #[serde(default)]
    value: Vec<Entity>,
}

fn check_key(field: &str, key: &str) -> Result<()> {
    if key.contains(['/', '\\', '#', '?']) || key.chars().any(char::is_control) {
        return Err(Error::invalid_input(format!(
            "`{field}` must not contain '/', '\\', '#', '?' or control characters"
        )));
    }
    Ok(())
}

/// Operations on the entities of a table.
#[derive(Debug, Clone)]
pub struct EntitiesClient {
    client: Client,
}

impl EntitiesClient {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn entity_request(
        method: Method,
        table_name: &str,
        partition_key: &str,
        row_key: &str,
    ) -> Result<StorageRequest> {
        validate::lower_case_name("table_name", table_name)?;
        check_key("partition_key", partition_key)?;
        check_key("row_key", row_key)?;

        let path = format!(
            "{table_name}(PartitionKey='{}',RowKey='{}')",
            quote_key(partition_key),
            quote_key(row_key)
        );
        Ok(StorageRequest::new(method, path))
    }

    /// Copy of `entity` with the keys set, overriding any keys it carries.
    fn with_keys(entity: &Entity, partition_key: &str, row_key: &str) -> Entity {
        let mut body = entity.clone();
        body.insert(PARTITION_KEY.to_string(), Value::from(partition_key));
        body.insert(ROW_KEY.to_string(), Value::from(row_key));
        body
    }

    /// Insert a new entity. Fails with `EntityAlreadyExists` if the keys are
    /// taken.
    pub async fn insert(
        &self,
        table_name: &str,
        partition_key: &str,
        row_key: &str,
        entity: &Entity,
    ) -> Result<()> {
        validate::lower_case_name("table_name", table_name)?;
        check_key("partition_key", partition_key)?;
        check_key("row_key", row_key)?;

        let req = odata::json_request(StorageRequest::post(table_name), MetadataLevel::None);
        let req = odata::json_body(req, &Self::with_keys(entity, partition_key, row_key))?
            .expect(&[StatusCode::NO_CONTENT]);
        self.client.send(req).await?;
        Ok(())
    }

    /// Insert the entity, or replace every property of an existing one.
    pub async fn insert_or_replace(
        &self,
        table_name: &str,
        partition_key: &str,
        row_key: &str,
        entity: &Entity,
    ) -> Result<()> {
        let req = odata::json_request(
            Self::entity_request(Method::PUT, table_name, partition_key, row_key)?,
            MetadataLevel::None,
        );
        let req = odata::json_body(req, &Self::with_keys(entity, partition_key, row_key))?
            .expect(&[StatusCode::NO_CONTENT]);
        self.client.send(req).await?;
        Ok(())
    }

    /// Insert the entity, or merge its properties into an existing one.
    pub async fn insert_or_merge(
        &self,
        table_name: &str,
        partition_key: &str,
        row_key: &str,
        entity: &Entity,
    ) -> Result<()> {
        let merge = Method::from_bytes(b"MERGE")
            .map_err(|e| Error::unexpected("building MERGE method").with_source(e))?;

        let req = odata::json_request(
            Self::entity_request(merge, table_name, partition_key, row_key)?,
            MetadataLevel::None,
        );
        let req = odata::json_body(req, &Self::with_keys(entity, partition_key, row_key))?
            .expect(&[StatusCode::NO_CONTENT]);
        self.client.send(req).await?;
        Ok(())
    }

    pub async fn get(
        &self,
        table_name: &str,
        partition_key: &str,
        row_key: &str,
        metadata_level: MetadataLevel,
    ) -> Result<Entity> {
        let req = odata::json_request(
            Self::entity_request(Method::GET, table_name, partition_key, row_key)?,
            metadata_level,
        );
        let resp = self.client.send(req).await?;
        Ok(serde_json::from_slice(resp.body())?)
    }

    /// Query one page of entities.
    pub async fn query(
        &self,
        table_name: &str,
        input: &QueryEntitiesInput,
    ) -> Result<QueryEntitiesResult> {
        validate::lower_case_name("table_name", table_name)?;
        if input.next_partition_key.is_some() != input.next_row_key.is_some() {
            return Err(Error::invalid_input(
                "`next_partition_key` and `next_row_key` must be given together",
            ));
        }

        let select = (!input.select.is_empty()).then(|| input.select.join(","));
        let req = odata::json_request(
            StorageRequest::get(format!("{table_name}()")),
            input.metadata_level,
        )
        .query_opt("$filter", input.filter.as_deref())
        .query_opt("$select", select)
        .query_opt("$top", input.top)
        .query_opt("NextPartitionKey", input.next_partition_key.as_deref())
        .query_opt("NextRowKey", input.next_row_key.as_deref());

        let resp = self.client.send(req).await?;
        let list: EntityList = serde_json::from_slice(resp.body())?;
        let h = resp.headers();
        Ok(QueryEntitiesResult {
            entities: list.value,
            next_partition_key: headers::get_string(h, X_MS_CONTINUATION_NEXT_PARTITION_KEY),
            next_row_key: headers::get_string(h, X_MS_CONTINUATION_NEXT_ROW_KEY),
        })
    }

    /// Delete the entity regardless of its current etag.
    pub async fn delete(&self, table_name: &str, partition_key: &str, row_key: &str) -> Result<()> {
        let req = odata::json_request(
            Self::entity_request(Method::DELETE, table_name, partition_key, row_key)?,
            MetadataLevel::None,
        )
        .header("if-match", "*")
        .expect(&[StatusCode::NO_CONTENT]);
        self.client.send(req).await?;
        Ok(())
    }
}
