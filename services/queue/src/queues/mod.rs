use std::collections::HashMap;

use azstorage_core::acl::{SignedIdentifier, SignedIdentifiers};
use azstorage_core::service_properties::StorageServiceProperties;
use azstorage_core::{headers, metadata, validate, xml};
use azstorage_core::{Client, Result, StorageRequest};
use http::{Method, StatusCode};
use log::debug;

mod id;
pub use id::QueueId;

const X_MS_APPROXIMATE_MESSAGES_COUNT: &str = "x-ms-approximate-messages-count";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueueMetadata {
    pub metadata: HashMap<String, String>,
    /// Approximate number of messages in the queue. Never lower than the
    /// real count, but may include expired or deleted messages.
    pub approximate_message_count: u64,
}

/// Operations on queues, plus the account level service properties.
#[derive(Debug, Clone)]
pub struct QueuesClient {
    client: Client,
}

impl QueuesClient {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn request(method: Method, queue_name: &str) -> Result<StorageRequest> {
        validate::lower_case_name("queue_name", queue_name)?;
        Ok(StorageRequest::new(method, queue_name))
    }

    /// Create a queue. Creating an existing queue with the same metadata
    /// succeeds.
    pub async fn create(&self, queue_name: &str, metadata: &HashMap<String, String>) -> Result<()> {
        validate::length_between("queue_name", queue_name, 3, 63)?;
        metadata::validate(metadata)?;

        let req = Self::request(Method::PUT, queue_name)?
            .metadata(metadata)
            .expect(&[StatusCode::CREATED, StatusCode::NO_CONTENT]);

        debug!("creating queue {queue_name}");
        self.client.send(req).await?;
        Ok(())
    }

    pub async fn delete(&self, queue_name: &str) -> Result<()> {
        let req = Self::request(Method::DELETE, queue_name)?.expect(&[StatusCode::NO_CONTENT]);
        self.client.send(req).await?;
        Ok(())
    }

    pub async fn get_metadata(&self, queue_name: &str) -> Result<QueueMetadata> {
        let req = Self::request(Method::GET, queue_name)?.query("comp", "metadata");
        let resp = self.client.send(req).await?;

        let h = resp.headers();
        Ok(QueueMetadata {
            metadata: metadata::from_headers(h),
            approximate_message_count: headers::parse(h, X_MS_APPROXIMATE_MESSAGES_COUNT)?
                .unwrap_or_default(),
        })
    }

    /// Replace all metadata of the queue.
    pub async fn set_metadata(
        &self,
        queue_name: &str,
        metadata: &HashMap<String, String>,
    ) -> Result<()> {
        metadata::validate(metadata)?;

        let req = Self::request(Method::PUT, queue_name)?
            .query("comp", "metadata")
            .metadata(metadata)
            .expect(&[StatusCode::NO_CONTENT]);
        self.client.send(req).await?;
        Ok(())
    }

    pub async fn get_acl(&self, queue_name: &str) -> Result<Vec<SignedIdentifier>> {
        let req = Self::request(Method::GET, queue_name)?.query("comp", "acl");
        let resp = self.client.send(req).await?;
        Ok(xml::from_xml::<SignedIdentifiers>(resp.body())?.items)
    }

    /// Replace the stored access policies of the queue.
    pub async fn set_acl(&self, queue_name: &str, acl: Vec<SignedIdentifier>) -> Result<()> {
        let acl = SignedIdentifiers::new(acl)?;

        let req = Self::request(Method::PUT, queue_name)?
            .query("comp", "acl")
            .xml_body(&acl)?
            .expect(&[StatusCode::NO_CONTENT]);
        self.client.send(req).await?;
        Ok(())
    }

    pub async fn get_service_properties(&self) -> Result<StorageServiceProperties> {
        let req = StorageRequest::get("")
            .query("restype", "service")
            .query("comp", "properties");
        let resp = self.client.send(req).await?;
        xml::from_xml(resp.body())
    }

    /// Replace the queue service properties. The queue service has no
    /// static website or delete retention settings; leave those unset.
    pub async fn set_service_properties(&self, properties: &StorageServiceProperties) -> Result<()> {
        let req = StorageRequest::put("")
            .query("restype", "service")
            .query("comp", "properties")
            .xml_body(properties)?
            .expect(&[StatusCode::ACCEPTED]);
        self.client.send(req).await?;
        Ok(())
    }
}
