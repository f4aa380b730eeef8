//! `StorageServiceProperties` documents shared by the blob and queue services.
//!
//! Fields that only one service understands are optional and skipped when
//! unset.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename = "StorageServiceProperties", rename_all = "PascalCase")]
pub struct StorageServiceProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logging: Option<Logging>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hour_metrics: Option<Metrics>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minute_metrics: Option<Metrics>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cors: Option<Cors>,
    /// Blob only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_service_version: Option<String>,
    /// Blob only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delete_retention_policy: Option<RetentionPolicy>,
    /// Blob only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub static_website: Option<StaticWebsite>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Logging {
    pub version: String,
    pub delete: bool,
    pub read: bool,
    pub write: bool,
    pub retention_policy: RetentionPolicy,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Metrics {
    pub version: String,
    pub enabled: bool,
    #[serde(
        rename = "IncludeAPIs",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub include_apis: Option<bool>,
    pub retention_policy: RetentionPolicy,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RetentionPolicy {
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub days: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cors {
    #[serde(rename = "CorsRule", default)]
    pub rules: Vec<CorsRule>,
}

/// Lists are comma separated, as the service expects them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CorsRule {
    pub allowed_origins: String,
    pub allowed_methods: String,
    pub max_age_in_seconds: u32,
    #[serde(default)]
    pub exposed_headers: String,
    #[serde(default)]
    pub allowed_headers: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StaticWebsite {
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index_document: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_document404_path: Option<String>,
}
