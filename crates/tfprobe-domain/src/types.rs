use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::error::DomainError;

// ── Identity ─────────────────────────────────────────────────────────────────

/// Project, region and unique name assigned to one test run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestIdentity {
    pub project_id: String,
    pub region_id: String,
    pub test_name: String,
}

impl std::fmt::Display for TestIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({}/{})", self.test_name, self.project_id, self.region_id)
    }
}

/// Check that a name prefix can be embedded in bucket, key ring and service
/// account names: non-empty, lowercase ASCII letters, digits and `-`.
pub fn validate_name_prefix(prefix: &str) -> Result<(), DomainError> {
    if prefix.is_empty() {
        return Err(DomainError::InvalidNamePrefix("prefix is empty".into()));
    }
    if let Some(c) = prefix
        .chars()
        .find(|c| !(c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-'))
    {
        return Err(DomainError::InvalidNamePrefix(format!(
            "'{}' contains invalid character '{}'",
            prefix, c
        )));
    }
    Ok(())
}

// ── Resource naming ──────────────────────────────────────────────────────────

/// Names of every resource the state-bucket module creates for a test run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceNames {
    pub state_bucket: String,
    pub log_bucket: String,
    pub state_key_ring: String,
    pub state_key: String,
    pub log_key_ring: String,
    pub log_key: String,
    pub service_account: String,
}

impl ResourceNames {
    pub fn for_test(test_name: &str) -> Self {
        Self {
            state_bucket: format!("{}-state", test_name),
            log_bucket: format!("{}-logs", test_name),
            state_key_ring: format!("{}-state-key-ring", test_name),
            state_key: format!("{}-state-key", test_name),
            log_key_ring: format!("{}-logs-key-ring", test_name),
            log_key: format!("{}-logs-key", test_name),
            service_account: format!("{}-terraform", test_name),
        }
    }
}

/// Fully-qualified Cloud KMS crypto key id. The key ring is assumed to live in
/// the `global` location.
pub fn crypto_key_id(project_id: &str, key_ring_id: &str, key_name: &str) -> String {
    format!(
        "projects/{}/locations/global/keyRings/{}/cryptoKeys/{}",
        project_id, key_ring_id, key_name
    )
}

// ── Provisioning options ─────────────────────────────────────────────────────

/// Everything a Terraform invocation needs: where the code lives, the input
/// variables, and the extra process environment.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProvisioningOptions {
    pub terraform_dir: PathBuf,
    /// Input variables. Values may be strings, numbers or nested maps.
    #[serde(default)]
    pub vars: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    pub env_vars: BTreeMap<String, String>,
}

// ── Bucket attributes ────────────────────────────────────────────────────────

/// Which object generations a lifecycle condition applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Liveness {
    #[default]
    LiveAndArchived,
    Live,
    Archived,
}

impl Liveness {
    /// Map the storage API's optional `isLive` flag.
    pub fn from_is_live(is_live: Option<bool>) -> Self {
        match is_live {
            None => Liveness::LiveAndArchived,
            Some(true) => Liveness::Live,
            Some(false) => Liveness::Archived,
        }
    }

    /// Numeric code used by the Go storage client (0, 1, 2).
    pub fn code(&self) -> u8 {
        match self {
            Liveness::LiveAndArchived => 0,
            Liveness::Live => 1,
            Liveness::Archived => 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LifecycleAction {
    /// `Delete` or `SetStorageClass`.
    #[serde(rename = "type")]
    pub action_type: String,
    pub storage_class: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LifecycleCondition {
    /// Zero means the condition is not set.
    pub age_in_days: i64,
    pub liveness: Liveness,
    pub num_newer_versions: i64,
    #[serde(default)]
    pub matches_storage_class: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LifecycleRule {
    pub action: LifecycleAction,
    pub condition: LifecycleCondition,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Lifecycle {
    pub rules: Vec<LifecycleRule>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketEncryption {
    pub default_kms_key_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketLogging {
    pub log_bucket: String,
    pub log_object_prefix: String,
}

/// Bucket properties as reported by the storage API. Also used as the literal
/// expectation a scenario compares against.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BucketAttrs {
    pub name: String,
    pub location: String,
    pub versioning_enabled: bool,
    pub lifecycle: Lifecycle,
    pub encryption: Option<BucketEncryption>,
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
    pub logging: Option<BucketLogging>,
}

impl std::fmt::Display for BucketAttrs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "gs://{}", self.name)
    }
}
