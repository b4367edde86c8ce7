pub mod assertions;
pub mod error;
pub mod expectations;
pub mod identity;
pub mod report;
pub mod scenario;

pub use assertions::{Assertions, Failure};
pub use error::HarnessError;
pub use expectations::Expectations;
pub use identity::{generate_identity, unique_id};
pub use report::ScenarioReport;
pub use scenario::{Scenario, ScenarioSpec};
