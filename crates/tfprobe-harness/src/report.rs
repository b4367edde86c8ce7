use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tfprobe_domain::TestIdentity;
use uuid::Uuid;

use crate::assertions::Failure;

/// Outcome of a scenario that ran to completion (no fatal error).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioReport {
    pub id: Uuid,
    pub identity: TestIdentity,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub checks: usize,
    pub failures: Vec<Failure>,
    /// Set when `destroy` failed; resources may have leaked.
    pub teardown_error: Option<String>,
}

impl ScenarioReport {
    pub fn passed(&self) -> bool {
        self.failures.is_empty() && self.teardown_error.is_none()
    }
}

impl std::fmt::Display for ScenarioReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let verdict = if self.passed() { "PASS" } else { "FAIL" };
        writeln!(f, "{} {} (run {})", verdict, self.identity, self.id)?;
        writeln!(
            f,
            "  {} checks, {} failed, {}s",
            self.checks,
            self.failures.len(),
            (self.finished_at - self.started_at).num_seconds()
        )?;
        for failure in &self.failures {
            writeln!(f, "  - {}", failure)?;
        }
        if let Some(e) = &self.teardown_error {
            writeln!(f, "  teardown: {}", e)?;
        }
        Ok(())
    }
}
