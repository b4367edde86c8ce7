use thiserror::Error;

/// Errors that abort a scenario. Assertion mismatches are not errors; they
/// are collected on the report.
#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("config error: {0}")]
    Config(#[from] tfprobe_config::ConfigError),

    #[error("{0}")]
    Domain(#[from] tfprobe_domain::DomainError),

    #[error("driver error: {0}")]
    Driver(#[from] tfprobe_driver::DriverError),

    #[error("no region left for project {project_id} after filtering {available} candidates")]
    NoRegions { project_id: String, available: usize },

    #[error("internal error: {0}")]
    Internal(String),
}
