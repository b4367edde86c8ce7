use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tfprobe_domain::{
    BucketAttrs, BucketEncryption, BucketLogging, Lifecycle, LifecycleAction, LifecycleCondition,
    LifecycleRule, Liveness,
};
use tracing::debug;

use crate::driver::{BucketInspector, RegionSource};
use crate::error::DriverError;

const CLOUD_PLATFORM_SCOPE: &str = "https://www.googleapis.com/auth/cloud-platform";

// ── Base URLs (overridden in tests to point at a mock server) ─────────────────

#[derive(Clone)]
struct BaseUrls {
    storage: String,
    compute: String,
}

impl Default for BaseUrls {
    fn default() -> Self {
        Self {
            storage: "https://storage.googleapis.com".into(),
            compute: "https://compute.googleapis.com".into(),
        }
    }
}

// ── Token provider ────────────────────────────────────────────────────────────

/// Abstraction over GCP token acquisition — enables test injection.
#[async_trait]
trait TokenProvider: Send + Sync {
    async fn token(&self) -> Result<String, DriverError>;
}

/// Token provider backed by a `gcp_auth` service account.
struct GcpAuthTokenProvider {
    inner: Arc<dyn gcp_auth::TokenProvider>,
}

#[async_trait]
impl TokenProvider for GcpAuthTokenProvider {
    async fn token(&self) -> Result<String, DriverError> {
        let token = self
            .inner
            .token(&[CLOUD_PLATFORM_SCOPE])
            .await
            .map_err(|e| DriverError::Internal(format!("GCP auth failed: {}", e)))?;
        Ok(token.as_str().to_string())
    }
}

/// Fixed token for wiremock tests.
#[cfg(test)]
struct StaticToken(String);

#[cfg(test)]
#[async_trait]
impl TokenProvider for StaticToken {
    async fn token(&self) -> Result<String, DriverError> {
        Ok(self.0.clone())
    }
}

// ── Wire format (storage JSON API) ────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawBucket {
    name: String,
    #[serde(default)]
    location: String,
    versioning: Option<RawVersioning>,
    lifecycle: Option<RawLifecycle>,
    encryption: Option<RawEncryption>,
    #[serde(default)]
    labels: BTreeMap<String, String>,
    logging: Option<RawLogging>,
}

#[derive(Debug, Deserialize)]
struct RawVersioning {
    #[serde(default)]
    enabled: bool,
}

#[derive(Debug, Deserialize)]
struct RawLifecycle {
    #[serde(default)]
    rule: Vec<RawRule>,
}

#[derive(Debug, Deserialize)]
struct RawRule {
    action: RawAction,
    #[serde(default)]
    condition: RawCondition,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawAction {
    #[serde(rename = "type")]
    action_type: String,
    storage_class: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawCondition {
    age: Option<i64>,
    is_live: Option<bool>,
    num_newer_versions: Option<i64>,
    #[serde(default)]
    matches_storage_class: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawEncryption {
    default_kms_key_name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawLogging {
    log_bucket: Option<String>,
    #[serde(default)]
    log_object_prefix: String,
}

impl From<RawBucket> for BucketAttrs {
    fn from(raw: RawBucket) -> Self {
        let rules = raw
            .lifecycle
            .map(|l| l.rule)
            .unwrap_or_default()
            .into_iter()
            .map(|r| LifecycleRule {
                action: LifecycleAction {
                    action_type: r.action.action_type,
                    storage_class: r.action.storage_class,
                },
                condition: LifecycleCondition {
                    age_in_days: r.condition.age.unwrap_or(0),
                    liveness: Liveness::from_is_live(r.condition.is_live),
                    num_newer_versions: r.condition.num_newer_versions.unwrap_or(0),
                    matches_storage_class: r.condition.matches_storage_class,
                },
            })
            .collect();

        // An encryption or logging block without its target is the same as none.
        let encryption = raw
            .encryption
            .and_then(|e| e.default_kms_key_name)
            .map(|default_kms_key_name| BucketEncryption { default_kms_key_name });
        let logging = raw.logging.and_then(|l| {
            l.log_bucket
                .filter(|b| !b.is_empty())
                .map(|log_bucket| BucketLogging {
                    log_bucket,
                    log_object_prefix: l.log_object_prefix,
                })
        });

        BucketAttrs {
            name: raw.name,
            location: raw.location,
            versioning_enabled: raw.versioning.map(|v| v.enabled).unwrap_or(false),
            lifecycle: Lifecycle { rules },
            encryption,
            labels: raw.labels,
            logging,
        }
    }
}

// ── GcpClient ─────────────────────────────────────────────────────────────────

/// Read-only client for the storage and compute REST APIs.
pub struct GcpClient {
    client: reqwest::Client,
    token: Box<dyn TokenProvider>,
    base: BaseUrls,
}

impl GcpClient {
    /// Create a client from a service account credentials payload, given
    /// either as the JSON document itself or as a path to it.
    pub fn from_credentials(credentials: &str) -> Result<Self, DriverError> {
        let trimmed = credentials.trim();
        let parsed = if trimmed.starts_with('{') {
            gcp_auth::CustomServiceAccount::from_json(trimmed)
        } else {
            gcp_auth::CustomServiceAccount::from_file(Path::new(trimmed))
        };
        let account = parsed
            .map_err(|e| DriverError::Internal(format!("invalid GCP credentials: {}", e)))?;
        Ok(Self::with_provider(Arc::new(account)))
    }

    fn with_provider(inner: Arc<dyn gcp_auth::TokenProvider>) -> Self {
        Self {
            client: reqwest::Client::new(),
            token: Box::new(GcpAuthTokenProvider { inner }),
            base: BaseUrls::default(),
        }
    }

    /// Create a client with a static bearer token and custom base URLs.
    #[cfg(test)]
    fn with_static_token(token: &str, base: BaseUrls) -> Self {
        Self {
            client: reqwest::Client::new(),
            token: Box::new(StaticToken(token.to_string())),
            base,
        }
    }

    async fn bearer(&self) -> Result<String, DriverError> {
        self.token.token().await
    }

    /// Convert a GCP REST error envelope into a human-readable message:
    ///   `"NOT_FOUND: The specified bucket does not exist. [notFound — global]"`
    fn extract_gcp_error(body: &Value) -> String {
        let err = &body["error"];
        let status = err["status"].as_str().unwrap_or("UNKNOWN");
        let message = err["message"].as_str().unwrap_or("unknown error");

        // Storage and compute report legacy `errors[]` rather than `details[]`.
        let detail_suffix = err["details"]
            .as_array()
            .and_then(|arr| arr.first())
            .and_then(|d| {
                let reason = d["reason"].as_str()?;
                let meta_vals: Vec<&str> = d["metadata"]
                    .as_object()
                    .map(|m| m.values().filter_map(|v| v.as_str()).collect())
                    .unwrap_or_default();
                Some(format!(" [{} — {}]", reason, meta_vals.join(", ")))
            })
            .or_else(|| {
                err["errors"].as_array().and_then(|arr| arr.first()).and_then(|e| {
                    let reason = e["reason"].as_str()?;
                    let domain = e["domain"].as_str().unwrap_or("");
                    Some(format!(" [{} — {}]", reason, domain))
                })
            })
            .unwrap_or_default();

        format!("{}: {}{}", status, message, detail_suffix)
    }

    async fn get_json(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<Option<Value>, DriverError> {
        let token = self.bearer().await?;
        let resp = self
            .client
            .get(url)
            .query(query)
            .bearer_auth(&token)
            .send()
            .await
            .map_err(|e| DriverError::Api(format!("GET {}: {}", url, e)))?;

        if resp.status().as_u16() == 404 {
            return Ok(None);
        }
        if !resp.status().is_success() {
            let code = resp.status().as_u16();
            let body: Value = resp.json().await.unwrap_or_default();
            return Err(DriverError::Api(format!(
                "HTTP {}: {}",
                code,
                Self::extract_gcp_error(&body)
            )));
        }

        let body: Value = resp
            .json()
            .await
            .map_err(|e| DriverError::Api(format!("decode {}: {}", url, e)))?;
        Ok(Some(body))
    }

    fn bucket_url(&self, bucket: &str) -> String {
        format!("{}/storage/v1/b/{}", self.base.storage, bucket)
    }
}

#[async_trait]
impl BucketInspector for GcpClient {
    async fn bucket_attrs(&self, bucket: &str) -> Result<BucketAttrs, DriverError> {
        let body = self
            .get_json(&self.bucket_url(bucket), &[])
            .await?
            .ok_or_else(|| DriverError::Api(format!("bucket '{}' does not exist", bucket)))?;

        let raw: RawBucket = serde_json::from_value(body)
            .map_err(|e| DriverError::Api(format!("decode bucket '{}': {}", bucket, e)))?;
        debug!(bucket, "fetched bucket attributes");
        Ok(raw.into())
    }

    async fn bucket_exists(&self, bucket: &str) -> Result<bool, DriverError> {
        Ok(self.get_json(&self.bucket_url(bucket), &[]).await?.is_some())
    }
}

#[async_trait]
impl RegionSource for GcpClient {
    async fn regions(&self, project_id: &str) -> Result<Vec<String>, DriverError> {
        let base = format!("{}/compute/v1/projects/{}/regions", self.base.compute, project_id);
        let mut regions = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let query: Vec<(&str, &str)> = match &page_token {
                Some(t) => vec![("pageToken", t.as_str())],
                None => Vec::new(),
            };
            let page = self
                .get_json(&base, &query)
                .await?
                .ok_or_else(|| DriverError::Api(format!("project '{}' not found", project_id)))?;

            if let Some(items) = page["items"].as_array() {
                regions.extend(
                    items
                        .iter()
                        .filter_map(|r| r["name"].as_str())
                        .map(str::to_string),
                );
            }

            match page["nextPageToken"].as_str() {
                Some(t) if !t.is_empty() => page_token = Some(t.to_string()),
                _ => break,
            }
        }

        debug!(project_id, count = regions.len(), "listed compute regions");
        Ok(regions)
    }
}
