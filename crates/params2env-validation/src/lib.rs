//! Input validators for SSM parameter store operations.
//!
//! Every check here is pure and runs before any network call. Empty strings
//! are accepted by the optional-field validators (region, KMS key, role ARN)
//! and mean "unset".

use std::sync::OnceLock;

use regex_lite::Regex;

const PARAMETER_PATH_PATTERN: &str = r"^/[a-zA-Z0-9_.-]+(/[a-zA-Z0-9_.-]+)*$";
const REGION_PATTERN: &str = r"^[a-z]{2}(-[a-z]+)+-\d$";
const KMS_KEY_ID_PATTERN: &str =
    r"^[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}$";
const KMS_ALIAS_PATTERN: &str = r"^alias/[a-zA-Z0-9/_-]+$";
const KMS_ARN_PATTERN: &str = r"^arn:aws:kms:[a-z]{2}(-[a-z]+)+-\d:\d{12}:key/[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}$";
const ROLE_ARN_PATTERN: &str =
    r"^arn:aws:iam::\d{12}:role/[a-zA-Z0-9+=,.@_-]+(/[a-zA-Z0-9+=,.@_-]+)*$";

/// Parameter type for plain values.
pub const PARAMETER_TYPE_STRING: &str = "String";
/// Parameter type for values encrypted with KMS.
pub const PARAMETER_TYPE_SECURE_STRING: &str = "SecureString";

/// Validation failures, each reported before any side effect.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("parameter path cannot be empty")]
    EmptyPath,

    #[error("parameter path must start with '/'")]
    MissingLeadingSlash,

    #[error("parameter path must not end with '/'")]
    TrailingSlash,

    #[error("parameter path must not contain consecutive '/'")]
    ConsecutiveSlash,

    #[error("invalid parameter path format: {0}")]
    InvalidPath(String),

    #[error("invalid region format: {0}")]
    InvalidRegion(String),

    #[error("invalid replica region: invalid region format: {0}")]
    InvalidReplicaRegion(String),

    #[error("invalid KMS key format: {0}")]
    InvalidKmsKey(String),

    #[error("invalid role ARN format: {0}")]
    InvalidRoleArn(String),

    #[error("replica region '{replica}' cannot be the same as primary region '{primary}'")]
    SameRegion { primary: String, replica: String },

    #[error("invalid parameter type: {0} (must be 'String' or 'SecureString')")]
    InvalidParameterType(String),

    #[error("required flag \"{0}\" not set")]
    MissingValue(&'static str),
}

fn compiled(cell: &'static OnceLock<Regex>, pattern: &str) -> &'static Regex {
    cell.get_or_init(|| Regex::new(pattern).expect("static pattern compiles"))
}

fn parameter_path_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    compiled(&RE, PARAMETER_PATH_PATTERN)
}

fn region_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    compiled(&RE, REGION_PATTERN)
}

fn kms_key_id_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    compiled(&RE, KMS_KEY_ID_PATTERN)
}

fn kms_alias_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    compiled(&RE, KMS_ALIAS_PATTERN)
}

fn kms_arn_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    compiled(&RE, KMS_ARN_PATTERN)
}

fn role_arn_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    compiled(&RE, ROLE_ARN_PATTERN)
}

/// Validate an SSM parameter path.
///
/// The structural checks run first so the caller gets a specific message
/// (`/a//b` reports consecutive slashes rather than a generic format error).
pub fn validate_parameter_path(path: &str) -> Result<(), ValidationError> {
    if path.is_empty() {
        return Err(ValidationError::EmptyPath);
    }
    if !path.starts_with('/') {
        return Err(ValidationError::MissingLeadingSlash);
    }
    if path.ends_with('/') {
        return Err(ValidationError::TrailingSlash);
    }
    if path.contains("//") {
        return Err(ValidationError::ConsecutiveSlash);
    }
    if !parameter_path_regex().is_match(path) {
        return Err(ValidationError::InvalidPath(path.to_string()));
    }
    Ok(())
}

/// Validate an AWS region name such as `eu-central-1`.
pub fn validate_region(region: &str) -> Result<(), ValidationError> {
    if region.is_empty() || region_regex().is_match(region) {
        Ok(())
    } else {
        Err(ValidationError::InvalidRegion(region.to_string()))
    }
}

/// Validate a replica region; same rule as [`validate_region`] with a
/// replica-specific message.
pub fn validate_replica_region(region: &str) -> Result<(), ValidationError> {
    validate_region(region).map_err(|_| ValidationError::InvalidReplicaRegion(region.to_string()))
}

/// Validate a KMS key identifier: key id (UUID), `alias/<name>`, or key ARN.
pub fn validate_kms_key(key: &str) -> Result<(), ValidationError> {
    if key.is_empty()
        || kms_key_id_regex().is_match(key)
        || kms_alias_regex().is_match(key)
        || kms_arn_regex().is_match(key)
    {
        Ok(())
    } else {
        Err(ValidationError::InvalidKmsKey(key.to_string()))
    }
}

/// Validate an IAM role ARN.
pub fn validate_role_arn(arn: &str) -> Result<(), ValidationError> {
    if arn.is_empty() || role_arn_regex().is_match(arn) {
        Ok(())
    } else {
        Err(ValidationError::InvalidRoleArn(arn.to_string()))
    }
}

/// Ensure the replica region differs from the primary region.
pub fn validate_regions(primary: &str, replica: &str) -> Result<(), ValidationError> {
    if !replica.is_empty() && primary == replica {
        return Err(ValidationError::SameRegion {
            primary: primary.to_string(),
            replica: replica.to_string(),
        });
    }
    Ok(())
}

/// Validate a parameter type, tolerating surrounding whitespace.
///
/// Returns the trimmed type on success.
pub fn validate_parameter_type(param_type: &str) -> Result<&str, ValidationError> {
    let trimmed = param_type.trim();
    if trimmed == PARAMETER_TYPE_STRING || trimmed == PARAMETER_TYPE_SECURE_STRING {
        Ok(trimmed)
    } else {
        Err(ValidationError::InvalidParameterType(trimmed.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_paths() {
        for path in ["/a", "/a/b", "/my-app/config.v2/db_url", "/A/B/C"] {
            assert!(validate_parameter_path(path).is_ok(), "{} should be valid", path);
        }
    }

    #[test]
    fn test_path_errors_are_specific() {
        assert_eq!(validate_parameter_path(""), Err(ValidationError::EmptyPath));
        assert_eq!(
            validate_parameter_path("a/b"),
            Err(ValidationError::MissingLeadingSlash)
        );
        assert_eq!(validate_parameter_path("/a/"), Err(ValidationError::TrailingSlash));
        assert_eq!(
            validate_parameter_path("/a//b"),
            Err(ValidationError::ConsecutiveSlash)
        );
        assert!(matches!(
            validate_parameter_path("/a/b c"),
            Err(ValidationError::InvalidPath(_))
        ));
    }

    #[test]
    fn test_consecutive_slash_message() {
        let err = validate_parameter_path("/a//b").unwrap_err();
        assert!(err.to_string().contains("consecutive"));
    }

    #[test]
    fn test_regions() {
        assert!(validate_region("").is_ok());
        assert!(validate_region("us-east-1").is_ok());
        assert!(validate_region("eu-central-1").is_ok());
        assert!(validate_region("us-gov-west-1").is_ok());
        assert!(validate_region("useast1").is_err());
        assert!(validate_region("US-EAST-1").is_err());
        assert!(validate_region("us-east-12").is_err());
    }

    #[test]
    fn test_replica_region_message() {
        let err = validate_replica_region("nowhere").unwrap_err();
        assert!(err.to_string().starts_with("invalid replica region"));
    }

    #[test]
    fn test_kms_keys() {
        assert!(validate_kms_key("").is_ok());
        assert!(validate_kms_key("1234abcd-12ab-34cd-56ef-1234567890ab").is_ok());
        assert!(validate_kms_key("alias/my-key").is_ok());
        assert!(validate_kms_key(
            "arn:aws:kms:us-east-1:123456789012:key/1234abcd-12ab-34cd-56ef-1234567890ab"
        )
        .is_ok());
        assert!(validate_kms_key("alias/").is_err());
        assert!(validate_kms_key("arn:aws:kms:us-east-1:123:key/1234abcd-12ab-34cd-56ef-1234567890ab").is_err());
        assert!(validate_kms_key("not-a-key").is_err());
    }

    #[test]
    fn test_role_arns() {
        assert!(validate_role_arn("").is_ok());
        assert!(validate_role_arn("arn:aws:iam::123456789012:role/deploy").is_ok());
        assert!(validate_role_arn("arn:aws:iam::123456789012:role/path/to/deploy").is_ok());
        assert!(validate_role_arn("arn:aws:iam::12345:role/deploy").is_err());
        assert!(validate_role_arn("arn:aws:iam::123456789012:user/deploy").is_err());
    }

    #[test]
    fn test_same_region_rejected() {
        assert!(validate_regions("us-east-1", "").is_ok());
        assert!(validate_regions("us-east-1", "us-west-2").is_ok());
        assert!(matches!(
            validate_regions("us-east-1", "us-east-1"),
            Err(ValidationError::SameRegion { .. })
        ));
    }

    #[test]
    fn test_parameter_type() {
        assert_eq!(validate_parameter_type("String"), Ok("String"));
        assert_eq!(validate_parameter_type(" SecureString "), Ok("SecureString"));
        assert!(validate_parameter_type("StringList").is_err());
    }
}
