use std::path::Path;

use tracing::debug;

use crate::error::ConfigError;
use crate::raw::RawOverlay;

/// Environment variables checked, in order, for the GCP project id.
pub const PROJECT_VARS: &[&str] = &[
    "GOOGLE_PROJECT",
    "GOOGLE_CLOUD_PROJECT",
    "GOOGLE_CLOUD_PROJECT_ID",
    "GCLOUD_PROJECT",
    "CLOUDSDK_CORE_PROJECT",
];

/// Environment variable holding the credentials payload handed to Terraform.
pub const CREDENTIALS_VAR: &str = "GOOGLE_CREDENTIALS";

/// Terraform version pinned for asdf, regardless of the global install.
pub const TERRAFORM_VERSION: &str = "0.12.12";

/// Ambient settings for a harness run. Built once, before any cloud call.
#[derive(Clone)]
pub struct HarnessConfig {
    pub project_id: String,
    /// Service account JSON or a path to one.
    pub credentials: String,
    pub terraform_version: String,
    pub terraform_binary: String,
    /// Regions a run may land in. Empty means any.
    pub approved_regions: Vec<String>,
    /// Regions a run must never land in.
    pub forbidden_regions: Vec<String>,
}

impl std::fmt::Debug for HarnessConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HarnessConfig")
            .field("project_id", &self.project_id)
            .field("credentials", &"<redacted>")
            .field("terraform_version", &self.terraform_version)
            .field("terraform_binary", &self.terraform_binary)
            .field("approved_regions", &self.approved_regions)
            .field("forbidden_regions", &self.forbidden_regions)
            .finish()
    }
}

impl HarnessConfig {
    /// Resolve the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve the configuration through `lookup`, which stands in for the
    /// process environment. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let project_id = PROJECT_VARS
            .iter()
            .find_map(|&var| {
                get(var).map(|v| {
                    debug!(var, "resolved project id");
                    v
                })
            })
            .ok_or_else(|| ConfigError::MissingProjectId {
                vars: PROJECT_VARS.to_vec(),
            })?;

        let credentials = get(CREDENTIALS_VAR).ok_or(ConfigError::MissingCredentials {
            var: CREDENTIALS_VAR,
        })?;

        Ok(Self {
            project_id,
            credentials,
            terraform_version: TERRAFORM_VERSION.to_string(),
            terraform_binary: "terraform".to_string(),
            approved_regions: Vec::new(),
            forbidden_regions: Vec::new(),
        })
    }

    /// Apply a YAML overlay file on top of the environment-derived values.
    pub fn with_overlay_file(self, path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        let raw: RawOverlay =
            serde_yaml::from_str(&content).map_err(|e| ConfigError::YamlParse {
                path: path.display().to_string(),
                source: e,
            })?;
        debug!("Loaded harness overlay from {}", path.display());
        Ok(self.apply_overlay(raw))
    }

    fn apply_overlay(mut self, raw: RawOverlay) -> Self {
        if let Some(binary) = raw.terraform_binary {
            self.terraform_binary = binary;
        }
        if !raw.approved_regions.is_empty() {
            self.approved_regions = raw.approved_regions;
        }
        if !raw.forbidden_regions.is_empty() {
            self.forbidden_regions = raw.forbidden_regions;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn resolves_project_and_credentials() {
        let cfg = HarnessConfig::from_lookup(lookup_from(&[
            ("GOOGLE_CLOUD_PROJECT", "proj-a"),
            ("GOOGLE_CREDENTIALS", "{}"),
        ]))
        .unwrap();
        assert_eq!(cfg.project_id, "proj-a");
        assert_eq!(cfg.credentials, "{}");
        assert_eq!(cfg.terraform_version, "0.12.12");
        assert_eq!(cfg.terraform_binary, "terraform");
        assert!(cfg.approved_regions.is_empty());
    }

    #[test]
    fn earlier_project_var_wins() {
        let cfg = HarnessConfig::from_lookup(lookup_from(&[
            ("GCLOUD_PROJECT", "later"),
            ("GOOGLE_PROJECT", "first"),
            ("GOOGLE_CREDENTIALS", "{}"),
        ]))
        .unwrap();
        assert_eq!(cfg.project_id, "first");
    }

    #[test]
    fn missing_project_is_an_error() {
        let err = HarnessConfig::from_lookup(lookup_from(&[("GOOGLE_CREDENTIALS", "{}")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::MissingProjectId { .. }));
        assert!(err.to_string().contains("GOOGLE_PROJECT"));
    }

    #[test]
    fn blank_credentials_count_as_missing() {
        let err = HarnessConfig::from_lookup(lookup_from(&[
            ("GOOGLE_PROJECT", "p"),
            ("GOOGLE_CREDENTIALS", "   "),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::MissingCredentials { .. }));
    }

    #[test]
    fn debug_redacts_credentials() {
        let cfg = HarnessConfig::from_lookup(lookup_from(&[
            ("GOOGLE_PROJECT", "p"),
            ("GOOGLE_CREDENTIALS", "secret-payload"),
        ]))
        .unwrap();
        let shown = format!("{:?}", cfg);
        assert!(!shown.contains("secret-payload"));
    }
}
