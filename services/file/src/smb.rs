//! SMB properties every file and directory write must carry on newer api
//! versions.

use azstorage_core::{Capability, Client, StorageRequest};

const X_MS_FILE_PERMISSION: &str = "x-ms-file-permission";
const X_MS_FILE_ATTRIBUTES: &str = "x-ms-file-attributes";
const X_MS_FILE_CREATION_TIME: &str = "x-ms-file-creation-time";
const X_MS_FILE_LAST_WRITE_TIME: &str = "x-ms-file-last-write-time";

/// Defaults for a new file or directory: inherited permissions, the given
/// attributes, timestamps set by the service.
pub(crate) fn defaults(client: &Client, req: StorageRequest, attributes: &str) -> StorageRequest {
    if !client.api_version().supports(Capability::FileSmbProperties) {
        return req;
    }
    req.header(X_MS_FILE_PERMISSION, "inherit")
        .header(X_MS_FILE_ATTRIBUTES, attributes)
        .header(X_MS_FILE_CREATION_TIME, "now")
        .header(X_MS_FILE_LAST_WRITE_TIME, "now")
}

/// Keep the current SMB properties when updating.
pub(crate) fn preserve(client: &Client, req: StorageRequest) -> StorageRequest {
    if !client.api_version().supports(Capability::FileSmbProperties) {
        return req;
    }
    req.header(X_MS_FILE_PERMISSION, "preserve")
        .header(X_MS_FILE_ATTRIBUTES, "preserve")
        .header(X_MS_FILE_CREATION_TIME, "preserve")
        .header(X_MS_FILE_LAST_WRITE_TIME, "preserve")
}
