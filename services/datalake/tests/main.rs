use std::collections::{BTreeMap, HashMap};
use std::env;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use azstorage_core::{ApiVersion, Authorize, Client, Config, Context, ErrorKind, HttpSend, Result};
use azstorage_datalake::{
    CreatePathInput, FileSystemsClient, GetPropertiesAction, ListFileSystemsInput, PathResource,
    PathsClient, SetAccessControlInput,
};
use azstorage_http_send_reqwest::ReqwestHttpSend;
use bytes::Bytes;
use http::{Response, StatusCode};
use log::warn;
use pretty_assertions::assert_eq;

const ENDPOINT: &str = "https://account1.dfs.core.windows.net";
const DEFAULT_ACL: &str = "user::rwx,group::r-x,other::---";

#[derive(Debug, Clone)]
struct PathEntry {
    resource: String,
    owner: String,
    group: String,
    permissions: String,
    acl: String,
}

#[derive(Debug, Default)]
struct State {
    /// File system name to its raw `x-ms-properties` header.
    file_systems: BTreeMap<String, String>,
    paths: BTreeMap<(String, String), PathEntry>,
    requests: usize,
}

#[derive(Debug, Clone, Default)]
struct FakeDataLakeService(Arc<Mutex<State>>);

impl FakeDataLakeService {
    fn client(&self, version: ApiVersion) -> Client {
        Client::new(
            Context::new().with_http_send(self.clone()),
            Config::new(ENDPOINT).with_api_version(version),
        )
    }

    fn requests(&self) -> usize {
        self.0.lock().unwrap().requests
    }
}

fn respond(status: StatusCode, headers: &[(&str, String)], body: String) -> Result<Response<Bytes>> {
    let mut builder = Response::builder().status(status);
    for (k, v) in headers {
        builder = builder.header(*k, v.as_str());
    }
    Ok(builder.body(Bytes::from(body))?)
}

/// Data Lake errors carry a JSON body, except for HEAD which only has the
/// error code header.
fn error(status: StatusCode, code: &str, head: bool) -> Result<Response<Bytes>> {
    let header = [("x-ms-error-code", code.to_string())];
    if head {
        return respond(status, &header, String::new());
    }
    respond(
        status,
        &[("content-type", "application/json;charset=utf-8".to_string())],
        format!(r#"{{"error":{{"code":"{code}","message":"{code} raised by the fake"}}}}"#),
    )
}

fn header(req: &http::Request<Bytes>, name: &str) -> Option<String> {
    req.headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(String::from)
}

#[async_trait]
impl HttpSend for FakeDataLakeService {
    async fn http_send(&self, req: http::Request<Bytes>) -> Result<Response<Bytes>> {
        let path = req.uri().path().trim_start_matches('/').to_string();
        let query: HashMap<String, String> =
            form_urlencoded::parse(req.uri().query().unwrap_or_default().as_bytes())
                .into_owned()
                .collect();
        let method = req.method().as_str();
        let head = method == "HEAD";

        let mut guard = self.0.lock().unwrap();
        let state = &mut *guard;
        state.requests += 1;

        if query.get("resource").map(String::as_str) == Some("account") {
            assert_eq!((method, path.as_str()), ("GET", ""));
            let prefix = query.get("prefix").map(String::as_str).unwrap_or_default();
            let max: usize = query.get("maxResults").map_or(5000, |v| v.parse().unwrap());

            // The continuation token is the first name of the next page.
            let mut names = state
                .file_systems
                .keys()
                .filter(|n| n.starts_with(prefix))
                .filter(|n| query.get("continuation").map_or(true, |c| *n >= c));
            let page: Vec<String> = names
                .by_ref()
                .take(max)
                .map(|n| {
                    format!(
                        r#"{{"name":"{n}","lastModified":"Thu, 01 Oct 2020 10:00:00 GMT","eTag":"0x8D4BCC2E4835CD0"}}"#
                    )
                })
                .collect();
            let headers: Vec<(&str, String)> = names
                .next()
                .map(|c| ("x-ms-continuation", c.clone()))
                .into_iter()
                .collect();
            return respond(
                StatusCode::OK,
                &headers,
                format!(r#"{{"filesystems":[{}]}}"#, page.join(",")),
            );
        }

        if query.get("resource").map(String::as_str) == Some("filesystem") {
            return match method {
                "PUT" if state.file_systems.contains_key(&path) => {
                    error(StatusCode::CONFLICT, "FilesystemAlreadyExists", false)
                }
                "PUT" => {
                    let props = header(&req, "x-ms-properties").unwrap_or_default();
                    state.file_systems.insert(path, props);
                    respond(StatusCode::CREATED, &[], String::new())
                }
                _ if !state.file_systems.contains_key(&path) => {
                    error(StatusCode::NOT_FOUND, "FilesystemNotFound", head)
                }
                "HEAD" => respond(
                    StatusCode::OK,
                    &[
                        ("x-ms-properties", state.file_systems[&path].clone()),
                        ("x-ms-namespace-enabled", "true".to_string()),
                        ("etag", "\"0x8D4BCC2E4835CD0\"".to_string()),
                    ],
                    String::new(),
                ),
                "PATCH" => {
                    let props = header(&req, "x-ms-properties").unwrap_or_default();
                    state.file_systems.insert(path, props);
                    respond(StatusCode::OK, &[], String::new())
                }
                "DELETE" => {
                    state.file_systems.remove(&path);
                    state.paths.retain(|(fs, _), _| *fs != path);
                    respond(StatusCode::ACCEPTED, &[], String::new())
                }
                _ => error(StatusCode::BAD_REQUEST, "UnsupportedHttpVerb", head),
            };
        }

        let (fs, rest) = path.split_once('/').unwrap_or((path.as_str(), ""));
        if !state.file_systems.contains_key(fs) {
            return error(StatusCode::NOT_FOUND, "FilesystemNotFound", head);
        }
        let key = (fs.to_string(), rest.to_string());

        match method {
            "PUT" => {
                let entry = PathEntry {
                    resource: query["resource"].clone(),
                    owner: header(&req, "x-ms-owner").unwrap_or_else(|| "$superuser".to_string()),
                    group: header(&req, "x-ms-group").unwrap_or_else(|| "$superuser".to_string()),
                    permissions: header(&req, "x-ms-permissions")
                        .unwrap_or_else(|| "rwxr-x---".to_string()),
                    acl: DEFAULT_ACL.to_string(),
                };
                state.paths.insert(key, entry);
                respond(StatusCode::CREATED, &[], String::new())
            }
            // The root always exists.
            "HEAD" if rest.is_empty() => respond(
                StatusCode::OK,
                &[("x-ms-resource-type", "directory".to_string())],
                String::new(),
            ),
            "HEAD" => {
                let Some(entry) = state.paths.get(&key) else {
                    return error(StatusCode::NOT_FOUND, "PathNotFound", true);
                };
                let mut headers = vec![
                    ("x-ms-resource-type", entry.resource.clone()),
                    ("x-ms-owner", entry.owner.clone()),
                    ("x-ms-group", entry.group.clone()),
                    ("x-ms-permissions", entry.permissions.clone()),
                    ("content-length", "0".to_string()),
                    ("last-modified", "Thu, 01 Oct 2020 10:00:00 GMT".to_string()),
                ];
                if query.get("action").map(String::as_str) == Some("getAccessControl") {
                    headers.push(("x-ms-acl", entry.acl.clone()));
                }
                respond(StatusCode::OK, &headers, String::new())
            }
            "PATCH" => {
                assert_eq!(query["action"], "setAccessControl");
                let Some(entry) = state.paths.get_mut(&key) else {
                    return error(StatusCode::NOT_FOUND, "PathNotFound", false);
                };
                if let Some(acl) = header(&req, "x-ms-acl") {
                    entry.acl = acl;
                }
                if let Some(owner) = header(&req, "x-ms-owner") {
                    entry.owner = owner;
                }
                respond(StatusCode::OK, &[], String::new())
            }
            "DELETE" => match state.paths.remove(&key) {
                Some(_) => respond(StatusCode::OK, &[], String::new()),
                None => error(StatusCode::NOT_FOUND, "PathNotFound", false),
            },
            _ => error(StatusCode::BAD_REQUEST, "UnsupportedHttpVerb", head),
        }
    }
}

#[tokio::test]
async fn test_file_system_lifecycle() -> anyhow::Result<()> {
    let fake = FakeDataLakeService::default();
    let client = FileSystemsClient::new(fake.client(ApiVersion::default()));

    let properties = HashMap::from([
        ("hello".to_string(), "aGVsbG8".to_string()),
        ("project".to_string(), "lake house".to_string()),
    ]);
    client.create("fileSystem1", &properties).await?;

    let props = client.get_properties("fileSystem1").await?;
    assert_eq!(props.properties, properties);
    assert!(props.namespace_enabled);
    assert!(props.etag.is_some());

    let updated = HashMap::from([("project".to_string(), "archive".to_string())]);
    client.set_properties("fileSystem1", &updated).await?;
    assert_eq!(client.get_properties("fileSystem1").await?.properties, updated);

    let err = client
        .create("fileSystem1", &HashMap::new())
        .await
        .unwrap_err();
    assert_eq!(err.service_error().unwrap().code, "FilesystemAlreadyExists");

    client.delete("fileSystem1").await?;
    let err = client.get_properties("fileSystem1").await.unwrap_err();
    assert!(err.is_not_found());
    Ok(())
}

#[tokio::test]
async fn test_list_file_systems_in_pages() -> anyhow::Result<()> {
    let fake = FakeDataLakeService::default();
    let client = FileSystemsClient::new(fake.client(ApiVersion::default()));
    for name in ["logs-a", "logs-b", "logs-c", "other"] {
        client.create(name, &HashMap::new()).await?;
    }

    let mut input = ListFileSystemsInput {
        prefix: Some("logs-".to_string()),
        max_results: Some(2),
        ..Default::default()
    };
    let page = client.list(&input).await?;
    let names: Vec<&str> = page.file_systems.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, ["logs-a", "logs-b"]);
    assert_eq!(page.continuation.as_deref(), Some("logs-c"));
    assert_eq!(page.file_systems[0].etag.as_deref(), Some("0x8D4BCC2E4835CD0"));
    assert!(page.file_systems[0].last_modified()?.is_some());

    input.continuation = page.continuation;
    let page = client.list(&input).await?;
    let names: Vec<&str> = page.file_systems.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, ["logs-c"]);
    assert_eq!(page.continuation, None);

    let all = client.list(&ListFileSystemsInput::default()).await?;
    assert_eq!(all.file_systems.len(), 4);
    Ok(())
}

#[tokio::test]
async fn test_directory_access_control() -> anyhow::Result<()> {
    let fake = FakeDataLakeService::default();
    let client = fake.client(ApiVersion::default());
    FileSystemsClient::new(client.clone())
        .create("fs1", &HashMap::new())
        .await?;

    let paths = PathsClient::new(client);
    paths
        .create("fs1", "test", &CreatePathInput::new(PathResource::Directory))
        .await?;

    let props = paths
        .get_properties("fs1", "test", Some(GetPropertiesAction::GetAccessControl))
        .await?;
    assert_eq!(props.resource_type, PathResource::Directory);
    assert_eq!(props.acl.as_deref(), Some(DEFAULT_ACL));

    let new_acl = "user::rwx,group::r-x,other::r-x,default:user::rwx,default:group::r-x,default:other::---";
    paths
        .set_access_control(
            "fs1",
            "test",
            &SetAccessControlInput {
                acl: Some(new_acl.to_string()),
                ..Default::default()
            },
        )
        .await?;
    let props = paths
        .get_properties("fs1", "test", Some(GetPropertiesAction::GetAccessControl))
        .await?;
    assert_eq!(props.acl.as_deref(), Some(new_acl));

    // Without the action the acl is not returned.
    let props = paths.get_properties("fs1", "test", None).await?;
    assert_eq!(props.acl, None);

    paths.delete("fs1", "test").await?;
    let err = paths.get_properties("fs1", "test", None).await.unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(err.service_error().unwrap().code, "PathNotFound");
    Ok(())
}

#[tokio::test]
async fn test_create_file_with_owner_and_permissions() -> anyhow::Result<()> {
    let fake = FakeDataLakeService::default();
    let client = fake.client(ApiVersion::default());
    FileSystemsClient::new(client.clone())
        .create("fs1", &HashMap::new())
        .await?;

    let paths = PathsClient::new(client);
    let input = CreatePathInput {
        owner: Some("user1".to_string()),
        group: Some("group1".to_string()),
        permissions: Some("rwxr-----".to_string()),
        umask: Some("0027".to_string()),
        ..CreatePathInput::new(PathResource::File)
    };
    paths.create("fs1", "dir1/file1.txt", &input).await?;

    let props = paths
        .get_properties("fs1", "dir1/file1.txt", Some(GetPropertiesAction::GetStatus))
        .await?;
    assert_eq!(props.resource_type, PathResource::File);
    assert_eq!(props.owner.as_deref(), Some("user1"));
    assert_eq!(props.group.as_deref(), Some("group1"));
    assert_eq!(props.permissions.as_deref(), Some("rwxr-----"));
    assert_eq!(props.content_length, Some(0));
    assert!(props.last_modified.is_some());

    let root = paths.get_properties("fs1", "", None).await?;
    assert_eq!(root.resource_type, PathResource::Directory);
    Ok(())
}

#[tokio::test]
async fn test_missing_file_system_error_is_decoded() {
    let fake = FakeDataLakeService::default();
    let err = PathsClient::new(fake.client(ApiVersion::default()))
        .delete("missing", "dir1")
        .await
        .unwrap_err();

    let service = err.service_error().unwrap();
    assert_eq!(service.status, StatusCode::NOT_FOUND);
    assert_eq!(service.code, "FilesystemNotFound");
    assert_eq!(service.message, "FilesystemNotFound raised by the fake");
}

#[tokio::test]
async fn test_validation_happens_before_sending() {
    let fake = FakeDataLakeService::default();
    let client = fake.client(ApiVersion::default());
    let paths = PathsClient::new(client.clone());

    let err = paths
        .create("fs1", "/", &CreatePathInput::new(PathResource::Directory))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidInput);

    let input = CreatePathInput {
        umask: Some("27".to_string()),
        ..CreatePathInput::new(PathResource::File)
    };
    let err = paths.create("fs1", "file1", &input).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidInput);

    let err = FileSystemsClient::new(fake.client(ApiVersion::V2017_07_29))
        .create("fs1", &HashMap::new())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unsupported);

    let err = PathsClient::new(fake.client(ApiVersion::V2018_03_28))
        .get_properties("fs1", "dir1", None)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unsupported);

    assert_eq!(fake.requests(), 0);
}

/// Appends a SAS token to every request.
#[derive(Debug)]
struct SasToken(String);

#[async_trait]
impl Authorize for SasToken {
    async fn authorize(&self, _: &Context, req: &mut http::request::Parts) -> Result<()> {
        let sep = if req.uri.query().is_some() { '&' } else { '?' };
        req.uri = format!("{}{sep}{}", req.uri, self.0.trim_start_matches('?')).parse()?;
        Ok(())
    }
}

fn init_live_client() -> Option<Client> {
    let _ = env_logger::builder().is_test(true).try_init();
    let _ = dotenv::dotenv();

    if env::var("AZSTORAGE_TEST").unwrap_or_default() != "on" {
        return None;
    }

    let endpoint = env::var("AZSTORAGE_DATALAKE_ENDPOINT")
        .expect("env AZSTORAGE_DATALAKE_ENDPOINT must set");
    let sas = env::var("AZSTORAGE_SAS_TOKEN").expect("env AZSTORAGE_SAS_TOKEN must set");

    let ctx = Context::new().with_http_send(ReqwestHttpSend::default());
    Some(Client::new(ctx, Config::new(endpoint)).with_authorizer(SasToken(sas)))
}

#[tokio::test]
async fn test_live_path_round_trip() -> anyhow::Result<()> {
    let Some(client) = init_live_client() else {
        warn!("AZSTORAGE_TEST is not set, skipped");
        return Ok(());
    };

    let fs = format!("azstorage-{}", std::process::id());
    let file_systems = FileSystemsClient::new(client.clone());
    let paths = PathsClient::new(client);

    file_systems.create(&fs, &HashMap::new()).await?;
    paths
        .create(&fs, "test", &CreatePathInput::new(PathResource::Directory))
        .await?;
    let props = paths
        .get_properties(&fs, "test", Some(GetPropertiesAction::GetAccessControl))
        .await?;
    assert_eq!(props.acl.as_deref(), Some(DEFAULT_ACL));

    paths.delete(&fs, "test").await?;
    file_systems.delete(&fs).await?;
    Ok(())
}
