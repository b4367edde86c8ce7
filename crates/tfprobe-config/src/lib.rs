mod raw;
mod loader;
pub mod env;
pub mod error;

pub use env::terraform_env_vars;
pub use error::ConfigError;
pub use loader::{HarnessConfig, CREDENTIALS_VAR, PROJECT_VARS, TERRAFORM_VERSION};
