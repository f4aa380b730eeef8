use std::fmt;

use azstorage_core::StorageRequest;

const APPLICATION_JSON: &str = "application/json";

/// How much OData metadata the service includes in JSON responses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum MetadataLevel {
    #[default]
    None,
    Minimal,
    Full,
}

impl MetadataLevel {
    fn accept(&self) -> &'static str {
        match self {
            MetadataLevel::None => "application/json;odata=nometadata",
            MetadataLevel::Minimal => "application/json;odata=minimalmetadata",
            MetadataLevel::Full => "application/json;odata=fullmetadata",
        }
    }
}

impl fmt::Display for MetadataLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.accept())
    }
}

/// Headers every JSON table request carries.
pub(crate) fn json_request(req: StorageRequest, level: MetadataLevel) -> StorageRequest {
    req.header("accept", level.accept())
        .header("dataserviceversion", "3.0;NetFx")
        .header("maxdataserviceversion", "3.0;NetFx")
}

/// Attach a JSON body and ask the service not to echo it back.
pub(crate) fn json_body<T: serde::Serialize>(
    req: StorageRequest,
    value: &T,
) -> azstorage_core::Result<StorageRequest> {
    Ok(req
        .json_body(value, APPLICATION_JSON)?
        .header("prefer", "return-no-content"))
}

/// Quote a key for use inside `PartitionKey='...'`.
pub(crate) fn quote_key(key: &str) -> String {
    key.replace('\'', "''")
}

/// Read a quoted key up to its closing `'`.
///
/// `input` starts just after the opening quote. Returns the unquoted key and
/// whatever follows the closing quote.
pub(crate) fn read_quoted_key(input: &str) -> Option<(String, &str)> {
    let mut key = String::new();
    let mut chars = input.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        if c != '\'' {
            key.push(c);
            continue;
        }
        match chars.peek() {
            Some((_, '\'')) => {
                key.push('\'');
                chars.next();
            }
            _ => return Some((key, &input[i + 1..])),
        }
    }
    None
}
