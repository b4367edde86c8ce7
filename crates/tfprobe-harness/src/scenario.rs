use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use serde_json::{json, Value};
use tfprobe_config::{terraform_env_vars, HarnessConfig};
use tfprobe_domain::{BucketAttrs, ProvisioningOptions, ResourceNames, TestIdentity};
use tfprobe_driver::{
    copy_terraform_folder_to_temp, BucketInspector, Provisioner, RegionSource, TestFolder,
};
use tracing::{info, warn};
use uuid::Uuid;

use crate::assertions::Assertions;
use crate::error::HarnessError;
use crate::expectations::Expectations;
use crate::identity::generate_identity;
use crate::report::ScenarioReport;

/// What to provision and how to name it.
#[derive(Debug, Clone)]
pub struct ScenarioSpec {
    pub name_prefix: String,
    /// Folder copied to a temporary location before provisioning.
    pub terraform_root: PathBuf,
    /// Terraform code location, relative to `terraform_root`.
    pub terraform_subdir: PathBuf,
    /// Passed as the `labels` variable and expected on both buckets.
    pub custom_labels: BTreeMap<String, String>,
}

impl ScenarioSpec {
    /// State bucket module applied without a pre-existing service account.
    pub fn no_service_account(terraform_root: impl Into<PathBuf>) -> Self {
        Self {
            name_prefix: "no-sa".into(),
            terraform_root: terraform_root.into(),
            terraform_subdir: PathBuf::from("."),
            custom_labels: BTreeMap::from([("foo".to_string(), "bar".to_string())]),
        }
    }
}

/// Input variables and environment for one Terraform run.
pub fn provisioning_options(
    terraform_dir: &Path,
    identity: &TestIdentity,
    names: &ResourceNames,
    custom_labels: &BTreeMap<String, String>,
    env_vars: BTreeMap<String, String>,
) -> ProvisioningOptions {
    let vars: BTreeMap<String, Value> = BTreeMap::from([
        ("gcp_region".to_string(), json!(identity.region_id)),
        ("gcp_project".to_string(), json!(identity.project_id)),
        ("state_bucket_name".to_string(), json!(names.state_bucket)),
        ("log_bucket_name".to_string(), json!(names.log_bucket)),
        ("state_kms_key_ring_name".to_string(), json!(names.state_key_ring)),
        ("state_kms_key_name".to_string(), json!(names.state_key)),
        ("logs_kms_key_ring_name".to_string(), json!(names.log_key_ring)),
        ("logs_kms_key_name".to_string(), json!(names.log_key)),
        ("service_account_name".to_string(), json!(names.service_account)),
        ("labels".to_string(), json!(custom_labels)),
    ]);

    ProvisioningOptions {
        terraform_dir: terraform_dir.to_path_buf(),
        vars,
        env_vars,
    }
}

/// Compare one bucket's live attributes against its expectation.
pub fn check_bucket(a: &mut Assertions, role: &str, expected: &BucketAttrs, actual: &BucketAttrs) {
    let subject = expected.name.as_str();

    a.equal(
        subject,
        "location",
        &expected.location,
        &actual.location,
        &format!("{} bucket should be in the {} location.", role, expected.location),
    );
    let versioning_msg = if expected.versioning_enabled {
        format!("{} bucket should have versioning enabled.", role)
    } else {
        format!("{} bucket should not have versioning enabled.", role)
    };
    a.equal(
        subject,
        "versioning",
        &expected.versioning_enabled,
        &actual.versioning_enabled,
        &versioning_msg,
    );
    a.equal(
        subject,
        "lifecycle",
        &expected.lifecycle,
        &actual.lifecycle,
        &format!("{} bucket should have lifecycle rules", role),
    );
    a.equal(
        subject,
        "encryption",
        &expected.encryption,
        &actual.encryption,
        &format!("{} bucket should have encryption enabled", role),
    );
    a.equal(
        subject,
        "labels",
        &expected.labels,
        &actual.labels,
        &format!("{} bucket should have terraform labels.", role),
    );
    match &expected.logging {
        Some(logging) => {
            a.equal(
                subject,
                "logging",
                &Some(logging.clone()),
                &actual.logging,
                &format!(
                    "{} bucket should have logging to the {} bucket configured.",
                    role, logging.log_bucket
                ),
            );
        }
        None => {
            a.is_none(
                subject,
                "logging",
                &actual.logging,
                &format!("{} bucket should not have logging configured.", role),
            );
        }
    }
}

/// Apply, then fetch and check both buckets. Fetch errors abort; mismatches
/// are collected.
async fn provision_and_inspect(
    provisioner: Arc<dyn Provisioner>,
    inspector: Arc<dyn BucketInspector>,
    options: Arc<ProvisioningOptions>,
    expected: Expectations,
) -> Result<Assertions, HarnessError> {
    provisioner.init_and_apply(&options).await?;

    let mut a = Assertions::new();
    for (role, bucket) in [("State", &expected.state), ("Log", &expected.logs)] {
        let actual = inspector.bucket_attrs(&bucket.name).await?;
        let exists = inspector.bucket_exists(&bucket.name).await?;
        a.is_true(
            &bucket.name,
            "exists",
            exists,
            &format!("{} bucket should exist.", role),
        );
        check_bucket(&mut a, role, bucket, &actual);
    }
    Ok(a)
}

/// One full cycle: apply and inspect in a nested task, then `destroy` no
/// matter how that task ended. Owns the working copy, which is removed only
/// after teardown. A panic in the nested task is re-raised after `destroy`.
async fn provision_inspect_destroy(
    provisioner: Arc<dyn Provisioner>,
    inspector: Arc<dyn BucketInspector>,
    options: Arc<ProvisioningOptions>,
    expected: Expectations,
    folder: TestFolder,
    test_name: String,
) -> (Result<Assertions, HarnessError>, Option<String>) {
    let body = tokio::spawn(provision_and_inspect(
        provisioner.clone(),
        inspector,
        options.clone(),
        expected,
    ));
    let joined = body.await;

    let teardown_error = match provisioner.destroy(&options).await {
        Ok(_) => None,
        Err(e) => {
            warn!(error = %e, %test_name, "teardown failed; resources may leak");
            Some(e.to_string())
        }
    };
    drop(folder);

    match joined {
        Ok(result) => (result, teardown_error),
        Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
        Err(e) => (
            Err(HarnessError::Internal(format!("scenario body: {}", e))),
            teardown_error,
        ),
    }
}

// ── Scenario ──────────────────────────────────────────────────────────────────

/// Drives one provision → inspect → destroy cycle.
pub struct Scenario {
    config: HarnessConfig,
    provisioner: Arc<dyn Provisioner>,
    inspector: Arc<dyn BucketInspector>,
    regions: Arc<dyn RegionSource>,
}

impl Scenario {
    pub fn new(
        config: HarnessConfig,
        provisioner: Arc<dyn Provisioner>,
        inspector: Arc<dyn BucketInspector>,
        regions: Arc<dyn RegionSource>,
    ) -> Self {
        Self {
            config,
            provisioner,
            inspector,
            regions,
        }
    }

    /// Run the scenario.
    ///
    /// Once the working copy exists, `destroy` runs exactly once whatever
    /// happens next: success, assertion failures, a fatal error, a panic
    /// while provisioning or inspecting (re-raised after teardown), or the
    /// caller dropping this future. Fatal errors are returned as `Err` after
    /// teardown.
    pub async fn run(&self, spec: &ScenarioSpec) -> Result<ScenarioReport, HarnessError> {
        let started_at = Utc::now();

        let identity =
            generate_identity(&self.config, self.regions.as_ref(), &spec.name_prefix).await?;
        let folder = copy_terraform_folder_to_temp(
            &spec.terraform_root,
            &spec.terraform_subdir,
            &identity.test_name,
        )?;

        let expected = Expectations::build(
            &identity.project_id,
            &identity.test_name,
            &spec.custom_labels,
        );
        let options = provisioning_options(
            folder.path(),
            &identity,
            &expected.names,
            &spec.custom_labels,
            terraform_env_vars(&self.config),
        );

        info!(%identity, dir = %folder.path().display(), "starting scenario");

        // Teardown lives in the same spawned task as apply, so dropping this
        // future detaches the task without skipping `destroy`.
        let cycle = tokio::spawn(provision_inspect_destroy(
            self.provisioner.clone(),
            self.inspector.clone(),
            Arc::new(options),
            expected,
            folder,
            identity.test_name.clone(),
        ));
        let (outcome, teardown_error) = match cycle.await {
            Ok(done) => done,
            Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
            Err(e) => return Err(HarnessError::Internal(format!("scenario task: {}", e))),
        };
        let assertions = outcome?;

        let report = ScenarioReport {
            id: Uuid::new_v4(),
            identity,
            started_at,
            finished_at: Utc::now(),
            checks: assertions.checks(),
            failures: assertions.into_failures(),
            teardown_error,
        };
        info!(
            test_name = %report.identity.test_name,
            passed = report.passed(),
            failures = report.failures.len(),
            "scenario finished"
        );
        Ok(report)
    }
}
