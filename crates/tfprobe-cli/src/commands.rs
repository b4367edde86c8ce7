use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tfprobe_config::HarnessConfig;
use tfprobe_driver::{GcpClient, TerraformRunner};
use tfprobe_harness::{generate_identity, Scenario, ScenarioSpec};

use crate::cli::ReportOutput;
use crate::output;

fn load_config(overlay: Option<PathBuf>) -> Result<HarnessConfig> {
    let config = HarnessConfig::from_env().context("Failed to resolve GCP settings")?;
    match overlay {
        Some(path) => config
            .with_overlay_file(&path)
            .with_context(|| format!("Failed to load {}", path.display())),
        None => Ok(config),
    }
}

// ── Run ───────────────────────────────────────────────────────────────────────

pub async fn run(
    overlay: Option<PathBuf>,
    terraform_dir: PathBuf,
    subdir: PathBuf,
    prefix: String,
    labels: Vec<(String, String)>,
    format: ReportOutput,
) -> Result<()> {
    let config = load_config(overlay)?;
    let gcp = Arc::new(
        GcpClient::from_credentials(&config.credentials)
            .context("Failed to initialise GCP client")?,
    );
    let runner = Arc::new(TerraformRunner::new(config.terraform_binary.clone()));

    let mut spec = ScenarioSpec::no_service_account(terraform_dir);
    spec.terraform_subdir = subdir;
    spec.name_prefix = prefix;
    if !labels.is_empty() {
        spec.custom_labels = labels.into_iter().collect::<BTreeMap<_, _>>();
    }

    let scenario = Scenario::new(config, runner, gcp.clone(), gcp);
    let report = scenario.run(&spec).await.context("Scenario aborted")?;

    match format {
        ReportOutput::Text => print!("{}", report),
        ReportOutput::Json => println!("{}", output::render_report_json(&report)),
    }

    if !report.passed() {
        anyhow::bail!("{} expectation(s) failed", report.failures.len());
    }
    Ok(())
}

// ── Name ──────────────────────────────────────────────────────────────────────

pub async fn name(overlay: Option<PathBuf>, prefix: String) -> Result<()> {
    let config = load_config(overlay)?;
    let gcp = GcpClient::from_credentials(&config.credentials)
        .context("Failed to initialise GCP client")?;
    let identity = generate_identity(&config, &gcp, &prefix)
        .await
        .context("Failed to generate test identity")?;
    print!("{}", output::render_identity(&identity));
    Ok(())
}

// ── KeyId ─────────────────────────────────────────────────────────────────────

pub fn key_id(project: String, key_ring: String, key: String) -> Result<()> {
    println!("{}", tfprobe_domain::crypto_key_id(&project, &key_ring, &key));
    Ok(())
}
