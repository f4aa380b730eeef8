use std::collections::HashMap;

use crate::{Error, Result, SubDomainType};

/// Endpoint information found in a connection string.
///
/// Credentials are ignored here, authorization is handled by an
/// [`Authorize`](crate::Authorize) implementation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct ConnectionInfo {
    pub account_name: Option<String>,
    pub endpoint: Option<String>,
}

/// Parses an [Azure connection string][1].
///
/// [1]: https://learn.microsoft.com/en-us/azure/storage/common/storage-configure-connection-string
pub(crate) fn parse(conn_str: &str, service: SubDomainType) -> Result<ConnectionInfo> {
    let key_values = parse_into_key_values(conn_str)?;

    if let Some(development) = collect_development_config(&key_values, service) {
        return Ok(development);
    }

    Ok(ConnectionInfo {
        account_name: key_values.get("AccountName").cloned(),
        endpoint: collect_endpoint(&key_values, service)?,
    })
}

fn parse_into_key_values(conn_str: &str) -> Result<HashMap<String, String>> {
    conn_str
        .trim()
        .replace('\n', "")
        .split(';')
        .filter(|&field| !field.trim().is_empty())
        .map(|field| {
            let (key, value) = field.trim().split_once('=').ok_or_else(|| {
                Error::config_invalid(format!(
                    "invalid connection string, expected '=' in field: {field}"
                ))
            })?;
            Ok((key.to_string(), value.to_string()))
        })
        .collect()
}

/// Azurite endpoints, the emulator has no file or data lake service.
fn collect_development_config(
    key_values: &HashMap<String, String>,
    service: SubDomainType,
) -> Option<ConnectionInfo> {
    const AZURITE_DEFAULT_STORAGE_ACCOUNT_NAME: &str = "devstoreaccount1";

    if key_values.get("UseDevelopmentStorage").map(String::as_str) != Some("true") {
        return None;
    }

    let port = match service {
        SubDomainType::Blob => 10000,
        SubDomainType::Queue => 10001,
        SubDomainType::Table => 10002,
        SubDomainType::File | SubDomainType::DataLake => return None,
    };

    let account_name = key_values
        .get("AccountName")
        .cloned()
        .unwrap_or(AZURITE_DEFAULT_STORAGE_ACCOUNT_NAME.to_string());
    let proxy_uri = key_values
        .get("DevelopmentStorageProxyUri")
        .cloned()
        .unwrap_or(format!("http://127.0.0.1:{port}"));

    Some(ConnectionInfo {
        endpoint: Some(format!("{proxy_uri}/{account_name}")),
        account_name: Some(account_name),
    })
}

/// Parses an endpoint from the key-value pairs if possible.
fn collect_endpoint(
    key_values: &HashMap<String, String>,
    service: SubDomainType,
) -> Result<Option<String>> {
    if let Some(key) = endpoint_key(service) {
        if let Some(endpoint) = key_values.get(key) {
            return Ok(Some(endpoint.clone()));
        }
    }

    collect_endpoint_from_parts(key_values, service)
}

fn endpoint_key(service: SubDomainType) -> Option<&'static str> {
    match service {
        SubDomainType::Blob => Some("BlobEndpoint"),
        SubDomainType::File => Some("FileEndpoint"),
        SubDomainType::Table => Some("TableEndpoint"),
        SubDomainType::Queue => Some("QueueEndpoint"),
        // Data Lake has no dedicated endpoint key
        SubDomainType::DataLake => None,
    }
}

fn collect_endpoint_from_parts(
    key_values: &HashMap<String, String>,
    service: SubDomainType,
) -> Result<Option<String>> {
    let (account_name, endpoint_suffix) = match (
        key_values.get("AccountName"),
        key_values.get("EndpointSuffix"),
    ) {
        (Some(name), Some(suffix)) => (name, suffix),
        _ => return Ok(None),
    };

    let protocol = key_values
        .get("DefaultEndpointsProtocol")
        .map(String::as_str)
        .unwrap_or("https");
    if protocol != "http" && protocol != "https" {
        return Err(Error::config_invalid(format!(
            "invalid DefaultEndpointsProtocol: {protocol}"
        )));
    }

    Ok(Some(format!(
        "{protocol}://{account_name}.{service}.{endpoint_suffix}"
    )))
}
