use serde::Deserialize;

/// Raw YAML representation of an optional harness config file.
///
/// ```yaml
/// terraform_binary: tofu
/// approved_regions: [us-central1, us-east1]
/// forbidden_regions: []
/// ```
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawOverlay {
    pub terraform_binary: Option<String>,
    #[serde(default)]
    pub approved_regions: Vec<String>,
    #[serde(default)]
    pub forbidden_regions: Vec<String>,
}
