use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use tfprobe_domain::ProvisioningOptions;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::driver::{Provisioner, RunLog};
use crate::error::DriverError;

/// File written into the working directory carrying the input variables.
/// Terraform loads `*.auto.tfvars.json` automatically on plan/apply/destroy.
pub const TFVARS_FILE: &str = "tfprobe.auto.tfvars.json";

/// Terraform should never need more than 30 minutes for a single sub-command.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(1800);

// ── TerraformRunner ───────────────────────────────────────────────────────────

/// Runs `terraform` (or `tofu`) as a subprocess against a working directory.
///
/// - Writes [`TFVARS_FILE`] from the options' variables
/// - Runs `init` + `apply`, or `destroy`
/// - Merges stdout+stderr into a [`RunLog`], mirroring each line to tracing
/// - Kills the process once the timeout elapses
pub struct TerraformRunner {
    binary: String,
    leading_args: Vec<String>,
    timeout: Duration,
}

impl TerraformRunner {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
            leading_args: Vec::new(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Run a shell script in place of the real binary.
    #[cfg(test)]
    fn with_script(script: &Path) -> Self {
        Self {
            binary: "sh".into(),
            leading_args: vec![script.display().to_string()],
            timeout: DEFAULT_TIMEOUT,
        }
    }

    // ── Process execution ─────────────────────────────────────────────────────

    /// Run a sub-command, capturing combined stdout+stderr.
    /// Returns (exit_code, combined_log).
    async fn run_tf(
        &self,
        workspace: &Path,
        args: &[&str],
        env_vars: &BTreeMap<String, String>,
    ) -> Result<(i32, String), DriverError> {
        let binary = self.binary.as_str();
        info!(binary, ?args, workspace = %workspace.display(), "running IaC command");

        let mut cmd = Command::new(binary);
        cmd.args(&self.leading_args)
            .args(args)
            .current_dir(workspace)
            .stdin(std::process::Stdio::null())
            .stdout(std::process::Stdio::piped())
            .stderr(std::process::Stdio::piped())
            .kill_on_drop(true)
            // Disable interactive prompts
            .env("TF_IN_AUTOMATION", "1")
            .env("TF_INPUT", "0")
            .envs(env_vars);

        let mut child = cmd
            .spawn()
            .map_err(|e| DriverError::Internal(format!("spawn {}: {}", binary, e)))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| DriverError::Internal("stdout not captured".into()))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| DriverError::Internal("stderr not captured".into()))?;

        let mut log = String::new();
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel::<String>();

        let tx1 = tx.clone();
        let stdout_task = tokio::spawn(async move {
            let mut lines = BufReader::new(stdout).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                let _ = tx1.send(line);
            }
        });

        let tx2 = tx.clone();
        let stderr_task = tokio::spawn(async move {
            let mut lines = BufReader::new(stderr).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                let _ = tx2.send(line);
            }
        });

        drop(tx); // rx finishes once both reader tasks finish

        let collect = async {
            while let Some(line) = rx.recv().await {
                debug!(target: "tfprobe::iac", "{}", line);
                log.push_str(&line);
                log.push('\n');
            }
        };
        let timed_out = tokio::time::timeout(self.timeout, collect).await.is_err();

        if timed_out {
            let _ = child.kill().await;
            stdout_task.abort();
            stderr_task.abort();
            return Err(DriverError::Internal(format!(
                "{} {} timed out after {}s",
                binary,
                args.first().copied().unwrap_or(""),
                self.timeout.as_secs(),
            )));
        }

        stdout_task.await.ok();
        stderr_task.await.ok();

        let status = child
            .wait()
            .await
            .map_err(|e| DriverError::Internal(format!("wait {}: {}", binary, e)))?;

        let code = status.code().unwrap_or(-1);
        if code != 0 {
            warn!(binary, code, "IaC command exited non-zero");
        }
        Ok((code, log))
    }
}

#[async_trait]
impl Provisioner for TerraformRunner {
    async fn init_and_apply(&self, options: &ProvisioningOptions) -> Result<RunLog, DriverError> {
        let workspace = options.terraform_dir.as_path();
        write_tfvars(workspace, &options.vars)?;

        let mut log = String::new();

        let (init_exit, init_output) = self
            .run_tf(workspace, &["init", "-input=false", "-no-color"], &options.env_vars)
            .await
            .map_err(|e| DriverError::ProvisionFailed(format!("terraform init: {}", e)))?;

        log.push_str("=== terraform init ===\n");
        log.push_str(&init_output);

        if init_exit != 0 {
            return Err(DriverError::ProvisionFailed(format!(
                "terraform init exited with code {}\n{}",
                init_exit, init_output
            )));
        }

        let (apply_exit, apply_output) = self
            .run_tf(
                workspace,
                &["apply", "-input=false", "-auto-approve", "-lock=false", "-no-color"],
                &options.env_vars,
            )
            .await
            .map_err(|e| DriverError::ProvisionFailed(format!("terraform apply: {}", e)))?;

        log.push_str("\n=== terraform apply ===\n");
        log.push_str(&apply_output);

        if apply_exit != 0 {
            return Err(DriverError::ProvisionFailed(format!(
                "terraform apply exited with code {}\n{}",
                apply_exit, apply_output
            )));
        }

        Ok(RunLog {
            command: "apply".into(),
            exit_code: 0,
            output: log,
        })
    }

    async fn destroy(&self, options: &ProvisioningOptions) -> Result<RunLog, DriverError> {
        let workspace = options.terraform_dir.as_path();

        if !workspace.exists() {
            debug!(workspace = %workspace.display(), "no workspace found; nothing to destroy");
            return Ok(RunLog {
                command: "destroy".into(),
                exit_code: 0,
                output: String::new(),
            });
        }

        let (exit_code, output) = self
            .run_tf(
                workspace,
                &["destroy", "-input=false", "-auto-approve", "-lock=false", "-no-color"],
                &options.env_vars,
            )
            .await
            .map_err(|e| DriverError::TeardownFailed(format!("terraform destroy: {}", e)))?;

        if exit_code != 0 {
            return Err(DriverError::TeardownFailed(format!(
                "terraform destroy exited with code {}\n{}",
                exit_code, output
            )));
        }

        Ok(RunLog {
            command: "destroy".into(),
            exit_code,
            output: format!("=== terraform destroy ===\n{}", output),
        })
    }
}

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Write the input variables as `tfprobe.auto.tfvars.json`. Nested maps (for
/// example a `labels` variable) are written as JSON objects.
fn write_tfvars(
    workspace: &Path,
    vars: &BTreeMap<String, serde_json::Value>,
) -> Result<(), DriverError> {
    let content = serde_json::to_string_pretty(vars)
        .map_err(|e| DriverError::Internal(format!("encode {}: {}", TFVARS_FILE, e)))?;
    std::fs::write(workspace.join(TFVARS_FILE), content)
        .map_err(|e| DriverError::Internal(format!("write {}: {}", TFVARS_FILE, e)))?;
    Ok(())
}
