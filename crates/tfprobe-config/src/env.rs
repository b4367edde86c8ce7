use std::collections::BTreeMap;

use crate::loader::{HarnessConfig, CREDENTIALS_VAR};

/// Environment variables passed to every Terraform subprocess.
///
/// `ASDF_TERRAFORM_VERSION` makes asdf select the pinned Terraform release
/// whatever the global version is set to.
pub fn terraform_env_vars(config: &HarnessConfig) -> BTreeMap<String, String> {
    BTreeMap::from([
        (CREDENTIALS_VAR.to_string(), config.credentials.clone()),
        (
            "ASDF_TERRAFORM_VERSION".to_string(),
            config.terraform_version.clone(),
        ),
    ])
}
