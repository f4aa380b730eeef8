use azstorage_core::acl::{SignedIdentifier, SignedIdentifiers};
use azstorage_core::{headers, validate, xml};
use azstorage_core::{Client, Error, Result, StorageRequest};
use http::{Method, StatusCode};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::odata::{self, MetadataLevel};

mod id;
pub use id::TableId;

const X_MS_CONTINUATION_NEXT_TABLE_NAME: &str = "x-ms-continuation-NextTableName";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TableItem {
    #[serde(rename = "TableName")]
    pub table_name: String,
    /// Only returned with [`MetadataLevel::Full`].
    #[serde(rename = "odata.id", default)]
    pub odata_id: Option<String>,
    #[serde(rename = "odata.editLink", default)]
    pub odata_edit_link: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryTablesInput {
    pub metadata_level: MetadataLevel,
    /// Continuation from a previous page.
    pub next_table_name: Option<String>,
    pub top: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryTablesResult {
    pub tables: Vec<TableItem>,
    /// Set when more tables are available.
    pub next_table_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TablesList {
    #[serde(default)]
    value: Vec<TableItem>,
}

#[derive(Serialize)]
struct CreateTableBody<'a> {
    #[serde(rename = "TableName")]
    table_name: &'a str,
}

/// Operations on tables.
#[derive(Debug, Clone)]
pub struct TablesClient {
    client: Client,
}

impl TablesClient {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn table_request(method: Method, table_name: &str) -> Result<StorageRequest> {
        validate::lower_case_name("table_name", table_name)?;
        Ok(StorageRequest::new(method, format!("Tables('{table_name}')")))
    }

    pub async fn create(&self, table_name: &str) -> Result<()> {
        validate::lower_case_name("table_name", table_name)?;
        validate::length_between("table_name", table_name, 3, 63)?;
        if !table_name.starts_with(|c: char| c.is_ascii_alphabetic())
            || !table_name.chars().all(|c| c.is_ascii_alphanumeric())
        {
            return Err(Error::invalid_input(format!(
                "`table_name` must be alphanumeric and start with a letter, got {table_name:?}"
            )));
        }

        let req = odata::json_request(StorageRequest::post("Tables"), MetadataLevel::None);
        let req = odata::json_body(req, &CreateTableBody { table_name })?
            .expect(&[StatusCode::NO_CONTENT]);

        debug!("creating table {table_name}");
        self.client.send(req).await?;
        Ok(())
    }

    pub async fn delete(&self, table_name: &str) -> Result<()> {
        let req = odata::json_request(
            Self::table_request(Method::DELETE, table_name)?,
            MetadataLevel::None,
        )
        .expect(&[StatusCode::NO_CONTENT]);
        self.client.send(req).await?;
        Ok(())
    }

    /// Check whether the table exists. Any error other than not found is
    /// returned as-is.
    pub async fn exists(&self, table_name: &str) -> Result<bool> {
        let req = odata::json_request(
            Self::table_request(Method::GET, table_name)?,
            MetadataLevel::None,
        );
        match self.client.send(req).await {
            Ok(_) => Ok(true),
            Err(err) if err.is_not_found() => Ok(false),
            Err(err) => Err(err),
        }
    }

    /// List the tables in the account, one page at a time.
    pub async fn query(&self, input: &QueryTablesInput) -> Result<QueryTablesResult> {
        let req = odata::json_request(StorageRequest::get("Tables"), input.metadata_level)
            .query_opt("$top", input.top)
            .query_opt("NextTableName", input.next_table_name.as_deref());

        let resp = self.client.send(req).await?;
        let list: TablesList = serde_json::from_slice(resp.body())?;
        Ok(QueryTablesResult {
            tables: list.value,
            next_table_name: headers::get_string(resp.headers(), X_MS_CONTINUATION_NEXT_TABLE_NAME),
        })
    }

    pub async fn get_acl(&self, table_name: &str) -> Result<Vec<SignedIdentifier>> {
        validate::lower_case_name("table_name", table_name)?;

        let req = StorageRequest::get(table_name).query("comp", "acl");
        let resp = self.client.send(req).await?;
        Ok(xml::from_xml::<SignedIdentifiers>(resp.body())?.items)
    }

    /// Replace the stored access policies of the table.
    pub async fn set_acl(&self, table_name: &str, acl: Vec<SignedIdentifier>) -> Result<()> {
        validate::lower_case_name("table_name", table_name)?;
        let acl = SignedIdentifiers::new(acl)?;

        let req = StorageRequest::put(table_name)
            .query("comp", "acl")
            .xml_body(&acl)?
            .expect(&[StatusCode::NO_CONTENT]);
        self.client.send(req).await?;
        Ok(())
    }
}
