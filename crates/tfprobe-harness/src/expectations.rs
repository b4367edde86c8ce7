use std::collections::BTreeMap;

use tfprobe_domain::{
    crypto_key_id, BucketAttrs, BucketEncryption, BucketLogging, Lifecycle, LifecycleAction,
    LifecycleCondition, LifecycleRule, Liveness, ResourceNames,
};

pub const EXPECTED_LOCATION: &str = "US";

/// Objects older than this are deleted.
pub const EXPECTED_DELETE_AGE_DAYS: i64 = 90;

/// Labels every resource of the module carries, before custom labels.
pub fn base_labels() -> BTreeMap<String, String> {
    BTreeMap::from([
        ("terraform".to_string(), "true".to_string()),
        ("terraform_managed".to_string(), "true".to_string()),
    ])
}

/// Exactly one rule: delete archived generations after 90 days.
pub fn expected_lifecycle() -> Lifecycle {
    Lifecycle {
        rules: vec![LifecycleRule {
            action: LifecycleAction {
                action_type: "Delete".into(),
                storage_class: None,
            },
            condition: LifecycleCondition {
                age_in_days: EXPECTED_DELETE_AGE_DAYS,
                liveness: Liveness::Archived,
                ..Default::default()
            },
        }],
    }
}

/// The literal oracle for one run.
#[derive(Debug, Clone)]
pub struct Expectations {
    pub names: ResourceNames,
    pub state: BucketAttrs,
    pub logs: BucketAttrs,
}

impl Expectations {
    pub fn build(
        project_id: &str,
        test_name: &str,
        custom_labels: &BTreeMap<String, String>,
    ) -> Self {
        let names = ResourceNames::for_test(test_name);

        let mut labels = base_labels();
        labels.extend(custom_labels.iter().map(|(k, v)| (k.clone(), v.clone())));

        let state = BucketAttrs {
            name: names.state_bucket.clone(),
            location: EXPECTED_LOCATION.into(),
            versioning_enabled: true,
            lifecycle: expected_lifecycle(),
            encryption: Some(BucketEncryption {
                default_kms_key_name: crypto_key_id(
                    project_id,
                    &names.state_key_ring,
                    &names.state_key,
                ),
            }),
            labels: labels.clone(),
            logging: Some(BucketLogging {
                log_bucket: names.log_bucket.clone(),
                log_object_prefix: names.state_bucket.clone(),
            }),
        };

        // The log bucket must never log into itself.
        let logs = BucketAttrs {
            name: names.log_bucket.clone(),
            location: EXPECTED_LOCATION.into(),
            versioning_enabled: false,
            lifecycle: expected_lifecycle(),
            encryption: Some(BucketEncryption {
                default_kms_key_name: crypto_key_id(
                    project_id,
                    &names.log_key_ring,
                    &names.log_key,
                ),
            }),
            labels,
            logging: None,
        };

        Self { names, state, logs }
    }
}
