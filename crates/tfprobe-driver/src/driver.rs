use async_trait::async_trait;
use tfprobe_domain::{BucketAttrs, ProvisioningOptions};

use crate::error::DriverError;

/// Captured output of one IaC command.
#[derive(Debug, Clone, Default)]
pub struct RunLog {
    /// Sub-command, e.g. `"apply"`.
    pub command: String,
    pub exit_code: i32,
    /// Combined stdout+stderr.
    pub output: String,
}

/// Creates and destroys the infrastructure described by a set of options.
#[async_trait]
pub trait Provisioner: Send + Sync + 'static {
    /// Run `init` followed by `apply`. Returns the combined log of both.
    async fn init_and_apply(&self, options: &ProvisioningOptions) -> Result<RunLog, DriverError>;

    /// Tear down everything `init_and_apply` created.
    async fn destroy(&self, options: &ProvisioningOptions) -> Result<RunLog, DriverError>;
}

// ── Read-only cloud inspection ────────────────────────────────────────────────

#[async_trait]
pub trait BucketInspector: Send + Sync + 'static {
    /// Fetch the live attributes of a bucket. A missing bucket is an error.
    async fn bucket_attrs(&self, bucket: &str) -> Result<BucketAttrs, DriverError>;

    async fn bucket_exists(&self, bucket: &str) -> Result<bool, DriverError>;
}

#[async_trait]
pub trait RegionSource: Send + Sync + 'static {
    /// Every region available to `project_id`.
    async fn regions(&self, project_id: &str) -> Result<Vec<String>, DriverError>;
}
