//! KMS key region translation for replica writes.

use crate::error::{Error, Result};

const ARN_PREFIX: &str = "arn:";
const ARN_FIELDS: usize = 6;

fn invalid(arn: &str, reason: &str) -> Error {
    Error::InvalidKmsArn {
        arn: arn.to_string(),
        reason: reason.to_string(),
    }
}

/// Point a KMS key identifier at `region`.
///
/// Key ARNs (`arn:<partition>:kms:<region>:<account>:key/<id>`) get their
/// region field replaced. Aliases and bare key ids are returned unchanged.
/// A string that starts like an ARN but is not a well-formed key ARN is an
/// error; this never produces a malformed ARN.
pub fn rewrite_kms_region(key: &str, region: &str) -> Result<String> {
    if !key.starts_with(ARN_PREFIX) {
        return Ok(key.to_string());
    }

    let fields: Vec<&str> = key.split(':').collect();
    if fields.len() != ARN_FIELDS {
        return Err(invalid(
            key,
            &format!("expected {} colon-separated fields, found {}", ARN_FIELDS, fields.len()),
        ));
    }
    if fields[2] != "kms" {
        return Err(invalid(key, "service field must be 'kms'"));
    }
    if fields[4].is_empty() {
        return Err(invalid(key, "account field is empty"));
    }
    match fields[5].strip_prefix("key/") {
        Some(id) if !id.is_empty() => {}
        _ => return Err(invalid(key, "resource must be 'key/<id>'")),
    }

    Ok(format!(
        "{}:{}:{}:{}:{}:{}",
        fields[0], fields[1], fields[2], region, fields[4], fields[5]
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    const ARN: &str = "arn:aws:kms:us-east-1:123456789012:key/1234abcd-12ab-34cd-56ef-1234567890ab";

    #[test]
    fn test_rewrites_region() {
        assert_eq!(
            rewrite_kms_region(ARN, "eu-west-1").unwrap(),
            "arn:aws:kms:eu-west-1:123456789012:key/1234abcd-12ab-34cd-56ef-1234567890ab"
        );
    }

    #[test]
    fn test_rewrite_is_idempotent() {
        let once = rewrite_kms_region(ARN, "eu-west-1").unwrap();
        let twice = rewrite_kms_region(&once, "eu-west-1").unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_non_arn_identifiers_untouched() {
        for key in ["alias/app", "1234abcd-12ab-34cd-56ef-1234567890ab"] {
            assert_eq!(rewrite_kms_region(key, "eu-west-1").unwrap(), key);
        }
    }

    #[test]
    fn test_malformed_arns_rejected() {
        let cases = [
            "arn:aws:kms:us-east-1:123456789012",
            "arn:aws:kms:us-east-1:123456789012:key/abc:extra",
            "arn:aws:iam:us-east-1:123456789012:key/abc",
            "arn:aws:kms:us-east-1::key/abc",
            "arn:aws:kms:us-east-1:123456789012:alias/app",
            "arn:aws:kms:us-east-1:123456789012:key/",
        ];
        for arn in cases {
            assert!(
                matches!(rewrite_kms_region(arn, "eu-west-1"), Err(Error::InvalidKmsArn { .. })),
                "{} should be rejected",
                arn
            );
        }
    }
}
