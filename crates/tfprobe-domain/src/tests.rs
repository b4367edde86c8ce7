#[cfg(test)]
mod tests {
    use crate::types::*;

    #[test]
    fn resource_names_follow_convention() {
        let names = ResourceNames::for_test("no-sa-abc123");
        assert_eq!(names.state_bucket, "no-sa-abc123-state");
        assert_eq!(names.log_bucket, "no-sa-abc123-logs");
        assert_eq!(names.state_key_ring, "no-sa-abc123-state-key-ring");
        assert_eq!(names.state_key, "no-sa-abc123-state-key");
        assert_eq!(names.log_key_ring, "no-sa-abc123-logs-key-ring");
        assert_eq!(names.log_key, "no-sa-abc123-logs-key");
        assert_eq!(names.service_account, "no-sa-abc123-terraform");
    }

    #[test]
    fn crypto_key_id_uses_global_location() {
        let id = crypto_key_id("my-proj", "ring", "key");
        assert_eq!(
            id,
            "projects/my-proj/locations/global/keyRings/ring/cryptoKeys/key"
        );
        assert_eq!(id, crypto_key_id("my-proj", "ring", "key"));
    }

    #[test]
    fn crypto_key_id_does_not_validate_parts() {
        let id = crypto_key_id("", "a/b", "");
        assert_eq!(id, "projects//locations/global/keyRings/a/b/cryptoKeys/");
    }

    #[test]
    fn liveness_from_is_live() {
        assert_eq!(Liveness::from_is_live(None), Liveness::LiveAndArchived);
        assert_eq!(Liveness::from_is_live(Some(true)), Liveness::Live);
        assert_eq!(Liveness::from_is_live(Some(false)), Liveness::Archived);
        assert_eq!(Liveness::Archived.code(), 2);
    }

    #[test]
    fn prefix_validation() {
        assert!(validate_name_prefix("no-sa").is_ok());
        assert!(validate_name_prefix("t1").is_ok());
        assert!(validate_name_prefix("").is_err());
        assert!(validate_name_prefix("No-SA").is_err());
        assert!(validate_name_prefix("no_sa").is_err());
    }

    #[test]
    fn attrs_default_has_no_logging_or_encryption() {
        let attrs = BucketAttrs::default();
        assert!(attrs.logging.is_none());
        assert!(attrs.encryption.is_none());
        assert!(attrs.lifecycle.rules.is_empty());
    }
}
