pub mod driver;
pub mod error;
pub mod gcp;
pub mod terraform;
pub mod workdir;

pub use driver::{BucketInspector, Provisioner, RegionSource, RunLog};
pub use error::DriverError;
pub use gcp::GcpClient;
pub use terraform::TerraformRunner;
pub use workdir::{copy_terraform_folder_to_temp, TestFolder};
