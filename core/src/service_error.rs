use bytes::Bytes;
use http::header::CONTENT_TYPE;
use http::Response;
use serde::Deserialize;

use crate::headers::{self, X_MS_ERROR_CODE};
use crate::{xml, ServiceError};

/// The XML error envelope of the blob, file and queue services.
#[derive(Default, Debug, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
struct XmlError {
    code: String,
    message: String,
}

/// `{"error": {"code": "...", "message": "..."}}` from Data Lake.
#[derive(Default, Debug, Deserialize)]
#[serde(default)]
struct JsonError {
    error: Option<JsonErrorBody>,
    #[serde(rename = "odata.error")]
    odata_error: Option<ODataErrorBody>,
}

#[derive(Default, Debug, Deserialize)]
#[serde(default)]
struct JsonErrorBody {
    code: String,
    message: String,
}

/// `{"odata.error": {"code": "...", "message": {"value": "..."}}}` from Table.
#[derive(Default, Debug, Deserialize)]
#[serde(default)]
struct ODataErrorBody {
    code: String,
    message: ODataMessage,
}

#[derive(Default, Debug, Deserialize)]
#[serde(default)]
struct ODataMessage {
    value: String,
}

/// Decode the error envelope of a failed response.
///
/// Falls back to the `x-ms-error-code` header, then to `Unknown`.
pub(crate) fn decode(resp: &Response<Bytes>) -> ServiceError {
    let (code, message) = decode_body(resp).unwrap_or_default();

    let code = if code.is_empty() {
        headers::get_string(resp.headers(), X_MS_ERROR_CODE).unwrap_or_else(|| "Unknown".to_string())
    } else {
        code
    };
    let message = if message.is_empty() {
        "Unknown service error".to_string()
    } else {
        message.trim().to_string()
    };

    ServiceError {
        status: resp.status(),
        code,
        message,
        request_id: headers::parse_request_id(resp.headers()),
    }
}

fn decode_body(resp: &Response<Bytes>) -> Option<(String, String)> {
    let body: &[u8] = resp.body();
    let content_type = headers::get_str(resp.headers(), CONTENT_TYPE.as_str()).unwrap_or_default();
    let trimmed = body
        .strip_prefix(b"\xEF\xBB\xBF")
        .unwrap_or(body)
        .trim_ascii_start();

    if content_type.contains("xml") || trimmed.starts_with(b"<") {
        let e: XmlError = xml::from_xml(trimmed).ok()?;
        return Some((e.code, e.message));
    }

    if content_type.contains("json") || trimmed.starts_with(b"{") {
        let e: JsonError = serde_json::from_slice(trimmed).ok()?;
        if let Some(e) = e.error {
            return Some((e.code, e.message));
        }
        if let Some(e) = e.odata_error {
            return Some((e.code, e.message.value));
        }
    }

    None
}
