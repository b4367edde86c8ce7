use std::fmt::Debug;

use serde::{Deserialize, Serialize};
use tracing::warn;

/// One expectation that did not hold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Failure {
    /// What was inspected, e.g. a bucket name.
    pub subject: String,
    pub attribute: String,
    pub expected: String,
    pub actual: String,
    pub message: String,
}

impl std::fmt::Display for Failure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} [{}]: {}\n    expected: {}\n    actual:   {}",
            self.subject, self.attribute, self.message, self.expected, self.actual
        )
    }
}

/// Non-aborting assertions: every mismatch is recorded and checking carries on.
#[derive(Debug, Default)]
pub struct Assertions {
    checks: usize,
    failures: Vec<Failure>,
}

impl Assertions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a failure unless `expected == actual`. Returns whether it held.
    pub fn equal<T: PartialEq + Debug>(
        &mut self,
        subject: &str,
        attribute: &str,
        expected: &T,
        actual: &T,
        message: &str,
    ) -> bool {
        self.checks += 1;
        if expected == actual {
            return true;
        }
        warn!(subject, attribute, "{}", message);
        self.failures.push(Failure {
            subject: subject.to_string(),
            attribute: attribute.to_string(),
            expected: format!("{:?}", expected),
            actual: format!("{:?}", actual),
            message: message.to_string(),
        });
        false
    }

    pub fn is_true(&mut self, subject: &str, attribute: &str, actual: bool, message: &str) -> bool {
        self.equal(subject, attribute, &true, &actual, message)
    }

    /// Expect an optional attribute to be absent.
    pub fn is_none<T: PartialEq + Debug>(
        &mut self,
        subject: &str,
        attribute: &str,
        actual: &Option<T>,
        message: &str,
    ) -> bool {
        self.equal(subject, attribute, &None, actual, message)
    }

    pub fn checks(&self) -> usize {
        self.checks
    }

    pub fn failures(&self) -> &[Failure] {
        &self.failures
    }

    pub fn into_failures(self) -> Vec<Failure> {
        self.failures
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mismatch_is_recorded_and_checking_continues() {
        let mut a = Assertions::new();
        assert!(!a.equal("b", "location", &"US", &"EU", "should be US"));
        assert!(a.is_true("b", "versioning", true, "should be versioned"));
        assert!(!a.is_true("b", "exists", false, "should exist"));

        assert_eq!(a.checks(), 3);
        assert_eq!(a.failures().len(), 2);
        let first = &a.failures()[0];
        assert_eq!(first.attribute, "location");
        assert_eq!(first.expected, "\"US\"");
        assert_eq!(first.actual, "\"EU\"");
    }

    #[test]
    fn is_none_rejects_present_value() {
        let mut a = Assertions::new();
        assert!(a.is_none::<u8>("b", "logging", &None, "no logging"));
        assert!(!a.is_none("b", "logging", &Some(1u8), "no logging"));
        assert_eq!(a.into_failures().len(), 1);
    }

    #[test]
    fn failure_display_names_bucket_and_attribute() {
        let f = Failure {
            subject: "x-logs".into(),
            attribute: "versioning".into(),
            expected: "false".into(),
            actual: "true".into(),
            message: "Log bucket should not have versioning enabled.".into(),
        };
        let shown = f.to_string();
        assert!(shown.starts_with("x-logs [versioning]"));
        assert!(shown.contains("expected: false"));
    }
}
