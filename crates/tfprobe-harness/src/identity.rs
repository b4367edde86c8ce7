use rand::distributions::Alphanumeric;
use rand::seq::SliceRandom;
use rand::Rng;
use tfprobe_config::HarnessConfig;
use tfprobe_domain::{validate_name_prefix, TestIdentity};
use tfprobe_driver::RegionSource;
use tracing::info;

use crate::error::HarnessError;

const UNIQUE_ID_LEN: usize = 6;

/// A short random base-62 token. Six characters keep resource names under
/// the provider's length limits while making collisions between concurrent
/// runs vanishingly unlikely.
pub fn unique_id() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(UNIQUE_ID_LEN)
        .map(char::from)
        .collect()
}

/// `{prefix}-{lowercased unique id}`.
pub fn test_name(prefix: &str) -> Result<String, HarnessError> {
    validate_name_prefix(prefix)?;
    Ok(format!("{}-{}", prefix, unique_id().to_lowercase()))
}

/// Pick a random region from `available`, keeping only approved regions (when
/// any are listed) and dropping forbidden ones.
pub fn pick_region(
    project_id: &str,
    available: &[String],
    approved: &[String],
    forbidden: &[String],
) -> Result<String, HarnessError> {
    let candidates: Vec<&String> = available
        .iter()
        .filter(|r| approved.is_empty() || approved.contains(r))
        .filter(|r| !forbidden.contains(r))
        .collect();

    candidates
        .choose(&mut rand::thread_rng())
        .map(|r| r.to_string())
        .ok_or_else(|| HarnessError::NoRegions {
            project_id: project_id.to_string(),
            available: available.len(),
        })
}

/// Resolve the project, a random region and a unique test name for one run.
pub async fn generate_identity(
    config: &HarnessConfig,
    regions: &dyn RegionSource,
    prefix: &str,
) -> Result<TestIdentity, HarnessError> {
    let test_name = test_name(prefix)?;
    let available = regions.regions(&config.project_id).await?;
    let region_id = pick_region(
        &config.project_id,
        &available,
        &config.approved_regions,
        &config.forbidden_regions,
    )?;

    let identity = TestIdentity {
        project_id: config.project_id.clone(),
        region_id,
        test_name,
    };
    info!(%identity, "generated test identity");
    Ok(identity)
}
