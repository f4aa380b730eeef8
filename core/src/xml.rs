//! XML bodies used by the blob, file and queue services.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::{Error, Result};

const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="utf-8"?>"#;

/// Deserialize an XML response body.
///
/// The service prefixes some bodies with a UTF-8 byte order mark, which is
/// skipped.
pub fn from_xml<T: DeserializeOwned>(bs: &[u8]) -> Result<T> {
    let bs = bs.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bs);
    quick_xml::de::from_reader(bs)
        .map_err(|e| Error::unexpected("failed to decode xml response").with_source(e))
}

/// Serialize a request body, including the XML declaration.
pub fn to_xml<T: Serialize>(value: &T) -> Result<String> {
    let content = quick_xml::se::to_string(value)
        .map_err(|e| Error::unexpected("failed to encode xml request").with_source(e))?;
    Ok(format!("{XML_DECLARATION}{content}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde::Deserialize;

    #[derive(Debug, Default, Serialize, Deserialize, PartialEq)]
    #[serde(rename = "QueueMessage", rename_all = "PascalCase")]
    struct QueueMessage {
        message_text: String,
    }

    #[test]
    fn test_to_xml() {
        let body = to_xml(&QueueMessage {
            message_text: "hello".to_string(),
        })
        .unwrap();
        assert_eq!(
            body,
            r#"<?xml version="1.0" encoding="utf-8"?><QueueMessage><MessageText>hello</MessageText></QueueMessage>"#
        );
    }

    #[test]
    fn test_from_xml_with_bom() {
        let bs = b"\xEF\xBB\xBF<?xml version=\"1.0\" encoding=\"utf-8\"?><QueueMessage><MessageText>hi</MessageText></QueueMessage>";
        let msg: QueueMessage = from_xml(bs).unwrap();
        assert_eq!(msg.message_text, "hi");
    }
}
