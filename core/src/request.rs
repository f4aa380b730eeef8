use std::collections::HashMap;
use std::fmt::Write;

use bytes::Bytes;
use http::header::{CONTENT_LENGTH, CONTENT_TYPE, USER_AGENT};
use http::{Method, StatusCode};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::Serialize;

use crate::{encode_path, metadata, time, xml, Config, Result};

/// Characters left as-is in query values.
pub(crate) static QUERY_ENCODE_SET: AsciiSet = NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'/')
    .remove(b'~');

/// Characters left as-is in paths.
///
/// `=`, `,` and `:` stay readable so table entity keys keep their
/// `table(PartitionKey='a',RowKey='b')` shape.
pub(crate) static PATH_ENCODE_SET: AsciiSet = NON_ALPHANUMERIC
    .remove(b'/')
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')')
    .remove(b'=')
    .remove(b',')
    .remove(b':');

pub(crate) const X_MS_VERSION: &str = "x-ms-version";
pub(crate) const X_MS_DATE: &str = "x-ms-date";

/// A storage request before it is bound to an endpoint.
///
/// Paths are relative to the configured endpoint and not yet
/// percent-encoded. Query pairs and headers keep insertion order.
#[derive(Debug, Clone)]
pub struct StorageRequest {
    method: Method,
    path: String,
    query: Vec<(String, String)>,
    headers: Vec<(String, String)>,
    body: Bytes,
    expected: Vec<StatusCode>,
}

impl StorageRequest {
    /// Create a request expecting `200 OK` unless told otherwise.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            headers: Vec::new(),
            body: Bytes::new(),
            expected: vec![StatusCode::OK],
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn head(path: impl Into<String>) -> Self {
        Self::new(Method::HEAD, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    /// Append a query parameter.
    pub fn query(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    /// Append a query parameter when `value` is set.
    pub fn query_opt(self, key: &str, value: Option<impl ToString>) -> Self {
        match value {
            Some(v) => self.query(key, v),
            None => self,
        }
    }

    /// Append a header.
    pub fn header(mut self, key: &str, value: impl ToString) -> Self {
        self.headers.push((key.to_string(), value.to_string()));
        self
    }

    /// Append a header when `value` is set.
    pub fn header_opt(self, key: &str, value: Option<impl ToString>) -> Self {
        match value {
            Some(v) => self.header(key, v),
            None => self,
        }
    }

    /// Append one `x-ms-meta-*` header per entry.
    ///
    /// Keys must have been checked with [`metadata::validate`].
    pub fn metadata(mut self, meta: &HashMap<String, String>) -> Self {
        self.headers.extend(metadata::to_headers(meta));
        self
    }

    /// Set a raw body with its content type.
    pub fn body(mut self, body: impl Into<Bytes>, content_type: &str) -> Self {
        self.body = body.into();
        self.headers
            .push((CONTENT_TYPE.to_string(), content_type.to_string()));
        self
    }

    /// Serialize `value` as the XML body.
    pub fn xml_body<T: Serialize>(self, value: &T) -> Result<Self> {
        let content = xml::to_xml(value)?;
        Ok(self.body(content, "application/xml; charset=utf-8"))
    }

    /// Serialize `value` as the JSON body.
    pub fn json_body<T: Serialize>(self, value: &T, content_type: &str) -> Result<Self> {
        let content = serde_json::to_vec(value)?;
        Ok(self.body(content, content_type))
    }

    /// Replace the set of status codes treated as success.
    pub fn expect(mut self, statuses: &[StatusCode]) -> Self {
        self.expected = statuses.to_vec();
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query_pairs(&self) -> &[(String, String)] {
        &self.query
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// Check whether `status` is one of the expected status codes.
    pub fn is_expected(&self, status: StatusCode) -> bool {
        self.expected.contains(&status)
    }

    /// Build the full url against `endpoint`.
    pub fn url(&self, endpoint: &str) -> String {
        let mut url = format!(
            "{}/{}",
            endpoint.trim_end_matches('/'),
            encode_path(self.path.trim_start_matches('/'))
        );

        for (i, (k, v)) in self.query.iter().enumerate() {
            let sep = if i == 0 { '?' } else { '&' };
            // Writing into a String never fails.
            let _ = write!(
                url,
                "{sep}{}={}",
                utf8_percent_encode(k, &QUERY_ENCODE_SET),
                utf8_percent_encode(v, &QUERY_ENCODE_SET)
            );
        }
        url
    }

    /// Bind the request to `config`, adding the version, date, user agent
    /// and content length headers.
    pub fn build(self, config: &Config) -> Result<http::Request<Bytes>> {
        let mut builder = http::Request::builder()
            .method(self.method.clone())
            .uri(self.url(config.endpoint()))
            .header(X_MS_VERSION, config.api_version().as_str())
            .header(X_MS_DATE, time::format_http_date(time::now()))
            .header(USER_AGENT, config.user_agent());

        for (k, v) in &self.headers {
            builder = builder.header(k.as_str(), v.as_str());
        }

        if !(self.body.is_empty() && matches!(self.method, Method::GET | Method::HEAD)) {
            builder = builder.header(CONTENT_LENGTH, self.body.len());
        }

        Ok(builder.body(self.body)?)
    }
}
