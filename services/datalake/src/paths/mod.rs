use std::fmt;
use std::str::FromStr;

use azstorage_core::time::DateTime;
use azstorage_core::{headers, validate};
use azstorage_core::{Capability, Client, Error, Result, StorageRequest};
use http::{Method, StatusCode};
use log::debug;

mod id;
pub use id::PathId;

const X_MS_RESOURCE_TYPE: &str = "x-ms-resource-type";
const X_MS_OWNER: &str = "x-ms-owner";
const X_MS_GROUP: &str = "x-ms-group";
const X_MS_PERMISSIONS: &str = "x-ms-permissions";
const X_MS_UMASK: &str = "x-ms-umask";
const X_MS_ACL: &str = "x-ms-acl";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathResource {
    File,
    Directory,
}

impl PathResource {
    pub fn as_str(&self) -> &'static str {
        match self {
            PathResource::File => "file",
            PathResource::Directory => "directory",
        }
    }
}

impl fmt::Display for PathResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PathResource {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "file" => Ok(PathResource::File),
            "directory" => Ok(PathResource::Directory),
            v => Err(Error::unexpected(format!("unknown path resource type {v:?}"))),
        }
    }
}

/// Extra information asked of [`PathsClient::get_properties`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GetPropertiesAction {
    /// System properties only, user defined properties are skipped.
    GetStatus,
    /// Include the access control list of the path.
    GetAccessControl,
}

impl GetPropertiesAction {
    fn as_str(&self) -> &'static str {
        match self {
            GetPropertiesAction::GetStatus => "getStatus",
            GetPropertiesAction::GetAccessControl => "getAccessControl",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatePathInput {
    pub resource: PathResource,
    pub owner: Option<String>,
    pub group: Option<String>,
    /// POSIX permissions in symbolic (`rwxr-x---`) or octal (`0750`) form.
    pub permissions: Option<String>,
    /// Octal umask applied to `permissions`, e.g. `0027`.
    pub umask: Option<String>,
}

impl CreatePathInput {
    pub fn new(resource: PathResource) -> Self {
        Self {
            resource,
            owner: None,
            group: None,
            permissions: None,
            umask: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SetAccessControlInput {
    pub owner: Option<String>,
    pub group: Option<String>,
    /// Access control list, e.g. `user::rwx,group::r-x,other::---`.
    /// Mutually exclusive with `permissions`.
    pub acl: Option<String>,
    pub permissions: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathProperties {
    pub resource_type: PathResource,
    pub owner: Option<String>,
    pub group: Option<String>,
    pub permissions: Option<String>,
    /// Only returned for [`GetPropertiesAction::GetAccessControl`].
    pub acl: Option<String>,
    pub content_length: Option<u64>,
    pub etag: Option<String>,
    pub last_modified: Option<DateTime>,
}

fn check_permissions(field: &str, value: &str) -> Result<()> {
    let octal = matches!(value.len(), 3 | 4) && value.chars().all(|c| ('0'..='7').contains(&c));
    let symbolic = matches!(value.len(), 9 | 10)
        && value
            .chars()
            .all(|c| matches!(c, 'r' | 'w' | 'x' | '-' | 't' | 'T' | 's' | 'S' | '+'));
    if octal || symbolic {
        Ok(())
    } else {
        Err(Error::invalid_input(format!(
            "`{field}` must be symbolic like `rwxr-x---` or octal like `0750`, got {value:?}"
        )))
    }
}

/// Operations on files and directories of a Data Lake file system.
#[derive(Debug, Clone)]
pub struct PathsClient {
    client: Client,
}

impl PathsClient {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// An empty `path` addresses the root directory.
    fn request(&self, method: Method, file_system_name: &str, path: &str) -> Result<StorageRequest> {
        self.client.require(Capability::DataLakePaths)?;
        validate::non_empty("file_system_name", file_system_name)?;

        Ok(StorageRequest::new(
            method,
            format!("{file_system_name}/{}", path.trim_matches('/')),
        ))
    }

    pub async fn create(
        &self,
        file_system_name: &str,
        path: &str,
        input: &CreatePathInput,
    ) -> Result<()> {
        validate::non_empty("path", path.trim_matches('/'))?;
        if let Some(p) = &input.permissions {
            check_permissions("permissions", p)?;
        }
        if let Some(u) = &input.umask {
            if u.len() != 4 || !u.chars().all(|c| ('0'..='7').contains(&c)) {
                return Err(Error::invalid_input(format!(
                    "`umask` must be four octal digits, got {u:?}"
                )));
            }
        }

        let req = self
            .request(Method::PUT, file_system_name, path)?
            .query("resource", input.resource)
            .header_opt(X_MS_OWNER, input.owner.as_deref())
            .header_opt(X_MS_GROUP, input.group.as_deref())
            .header_opt(X_MS_PERMISSIONS, input.permissions.as_deref())
            .header_opt(X_MS_UMASK, input.umask.as_deref())
            .expect(&[StatusCode::CREATED]);

        debug!("creating {} {file_system_name}/{path}", input.resource);
        self.client.send(req).await?;
        Ok(())
    }

    pub async fn delete(&self, file_system_name: &str, path: &str) -> Result<()> {
        validate::non_empty("path", path.trim_matches('/'))?;

        let req = self.request(Method::DELETE, file_system_name, path)?;
        self.client.send(req).await?;
        Ok(())
    }

    pub async fn get_properties(
        &self,
        file_system_name: &str,
        path: &str,
        action: Option<GetPropertiesAction>,
    ) -> Result<PathProperties> {
        let req = self
            .request(Method::HEAD, file_system_name, path)?
            .query_opt("action", action.map(|a| a.as_str()));
        let resp = self.client.send(req).await?;

        let h = resp.headers();
        Ok(PathProperties {
            resource_type: headers::require_str(h, X_MS_RESOURCE_TYPE)?.parse()?,
            owner: headers::get_string(h, X_MS_OWNER),
            group: headers::get_string(h, X_MS_GROUP),
            permissions: headers::get_string(h, X_MS_PERMISSIONS),
            acl: headers::get_string(h, X_MS_ACL),
            content_length: headers::parse_content_length(h)?,
            etag: headers::parse_etag(h),
            last_modified: headers::parse_last_modified(h)?,
        })
    }

    pub async fn set_access_control(
        &self,
        file_system_name: &str,
        path: &str,
        input: &SetAccessControlInput,
    ) -> Result<()> {
        if input.acl.is_some() && input.permissions.is_some() {
            return Err(Error::invalid_input(
                "`acl` and `permissions` must not be set together",
            ));
        }
        if let Some(p) = &input.permissions {
            check_permissions("permissions", p)?;
        }

        let req = self
            .request(Method::PATCH, file_system_name, path)?
            .query("action", "setAccessControl")
            .header_opt(X_MS_OWNER, input.owner.as_deref())
            .header_opt(X_MS_GROUP, input.group.as_deref())
            .header_opt(X_MS_ACL, input.acl.as_deref())
            .header_opt(X_MS_PERMISSIONS, input.permissions.as_deref());
        self.client.send(req).await?;
        Ok(())
    }
}
