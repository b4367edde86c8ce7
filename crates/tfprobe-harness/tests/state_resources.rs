//! Live end-to-end test: applies the state bucket module to a real GCP
//! project, inspects both buckets through the storage API and destroys
//! everything again.
//!
//! ```bash
//! GOOGLE_PROJECT=<project> \
//! GOOGLE_CREDENTIALS="$(cat key.json)" \
//! cargo test -p tfprobe-harness --test state_resources -- --ignored --nocapture
//! ```

use std::path::Path;
use std::sync::Arc;

use tfprobe_config::HarnessConfig;
use tfprobe_driver::{GcpClient, TerraformRunner};
use tfprobe_harness::{Scenario, ScenarioSpec};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

#[tokio::test]
#[ignore = "provisions real GCP resources; needs GOOGLE_PROJECT, GOOGLE_CREDENTIALS and terraform"]
async fn no_service_account() {
    init_tracing();

    let config = HarnessConfig::from_env().expect("GCP project and credentials must be set");
    let gcp = Arc::new(
        GcpClient::from_credentials(&config.credentials).expect("credentials should parse"),
    );
    let runner = Arc::new(TerraformRunner::new(config.terraform_binary.clone()));
    let scenario = Scenario::new(config, runner, gcp.clone(), gcp);

    let root = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../terraform");
    let report = scenario
        .run(&ScenarioSpec::no_service_account(root))
        .await
        .expect("scenario aborted");

    assert!(report.passed(), "{}", report);
}
