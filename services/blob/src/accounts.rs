use azstorage_core::service_properties::StorageServiceProperties;
use azstorage_core::{xml, Client, Result, StorageRequest};
use http::StatusCode;

/// Account level operations of the blob service.
#[derive(Debug, Clone)]
pub struct AccountsClient {
    client: Client,
}

impl AccountsClient {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub async fn get_service_properties(&self) -> Result<StorageServiceProperties> {
        let req = StorageRequest::get("")
            .query("restype", "service")
            .query("comp", "properties");

        let resp = self.client.send(req).await?;
        xml::from_xml(resp.body())
    }

    /// Replace the service properties. Unset sections keep their current
    /// value on the service.
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
