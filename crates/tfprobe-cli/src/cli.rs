use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "tfprobe",
    about = "Provision a Terraform module, assert on the resulting GCS buckets, tear it down",
    version
)]
pub struct Cli {
    /// YAML overlay with region filters and the Terraform binary.
    #[arg(long, env = "TFPROBE_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the state bucket scenario end to end.
    Run {
        /// Folder copied to a temporary location and applied.
        #[arg(long, default_value = "terraform")]
        terraform_dir: PathBuf,

        /// Terraform code location relative to --terraform-dir.
        #[arg(long, default_value = ".")]
        subdir: PathBuf,

        /// Prefix for every generated resource name.
        #[arg(long, default_value = "no-sa")]
        prefix: String,

        /// Custom label passed to the module and expected on both buckets (KEY=VALUE).
        #[arg(long = "label", value_parser = parse_label)]
        labels: Vec<(String, String)>,

        /// Report format.
        #[arg(long, default_value = "text")]
        output: ReportOutput,
    },

    /// Print a generated test identity without provisioning anything.
    Name {
        #[arg(default_value = "no-sa")]
        prefix: String,
    },

    /// Print the fully-qualified id of a KMS crypto key in the global location.
    KeyId {
        project: String,
        key_ring: String,
        key: String,
    },
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ReportOutput {
    Text,
    Json,
}

fn parse_label(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((k, v)) if !k.is_empty() => Ok((k.to_string(), v.to_string())),
        _ => Err(format!("expected KEY=VALUE, got '{}'", s)),
    }
}
