//! Common validation utilities.

use validator::ValidationError;

/// Maximum length of a caller-supplied external id.
const MAX_EXTERNAL_ID_LEN: usize = 128;

/// Maximum number of variables accepted in a single dispatch request.
const MAX_DISPATCH_VARIABLES: usize = 64;

/// Validates a caller-supplied external id.
///
/// External ids are correlation keys chosen by the tenant, so the charset is
/// restricted to something safe to index and echo back: ASCII alphanumerics
/// plus `-`, `_`, `.` and `:`.
pub fn validate_external_id(external_id: &str) -> Result<(), ValidationError> {
    if external_id.is_empty() || external_id.len() > MAX_EXTERNAL_ID_LEN {
        let mut err = ValidationError::new("external_id_length");
        err.message = Some("External id must be 1-128 characters".into());
        return Err(err);
    }

    if !external_id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | ':'))
    {
        let mut err = ValidationError::new("external_id_charset");
        err.message =
            Some("External id may contain only letters, digits, '-', '_', '.' and ':'".into());
        return Err(err);
    }

    Ok(())
}

/// Validates the variable map of a dispatch request.
///
/// Keys must be non-empty and the map is capped so a single request cannot
/// carry an unbounded payload into the rendered artifact.
pub fn validate_variables(
    variables: &std::collections::HashMap<String, String>,
) -> Result<(), ValidationError> {
    if variables.len() > MAX_DISPATCH_VARIABLES {
        let mut err = ValidationError::new("too_many_variables");
        err.message = Some("At most 64 variables per dispatch".into());
        return Err(err);
    }

    if variables.keys().any(|k| k.is_empty()) {
        let mut err = ValidationError::new("empty_variable_key");
        err.message = Some("Variable keys must be non-empty".into());
        return Err(err);
    }

    Ok(())
}

/// Validates a recipient address.
///
/// The address format is channel-specific and ultimately checked by the
/// transport provider; this only rejects obviously unusable values.
pub fn validate_recipient(recipient: &str) -> Result<(), ValidationError> {
    let trimmed = recipient.trim();
    if trimmed.is_empty() || trimmed.len() > 320 {
        let mut err = ValidationError::new("recipient_length");
        err.message = Some("Recipient must be 1-320 characters".into());
        return Err(err);
    }

    if trimmed.chars().any(|c| c.is_control()) {
        let mut err = ValidationError::new("recipient_charset");
        err.message = Some("Recipient must not contain control characters".into());
        return Err(err);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_validate_external_id_valid() {
        assert!(validate_external_id("user-42").is_ok());
        assert!(validate_external_id("order:2024.01_a").is_ok());
        assert!(validate_external_id("a").is_ok());
    }

    #[test]
    fn test_validate_external_id_empty() {
        assert!(validate_external_id("").is_err());
    }

    #[test]
    fn test_validate_external_id_too_long() {
        let id = "x".repeat(129);
        assert!(validate_external_id(&id).is_err());
    }

    #[test]
    fn test_validate_external_id_max_length() {
        let id = "x".repeat(128);
        assert!(validate_external_id(&id).is_ok());
    }

    #[test]
    fn test_validate_external_id_bad_charset() {
        assert!(validate_external_id("user 42").is_err());
        assert!(validate_external_id("user/42").is_err());
        assert!(validate_external_id("usér42").is_err());
    }

    #[test]
    fn test_validate_variables_ok() {
        let mut vars = HashMap::new();
        vars.insert("name".to_string(), "Ana".to_string());
        assert!(validate_variables(&vars).is_ok());
    }

    #[test]
    fn test_validate_variables_empty_map() {
        assert!(validate_variables(&HashMap::new()).is_ok());
    }

    #[test]
    fn test_validate_variables_empty_key() {
        let mut vars = HashMap::new();
        vars.insert("".to_string(), "value".to_string());
        assert!(validate_variables(&vars).is_err());
    }

    #[test]
    fn test_validate_variables_too_many() {
        let mut vars = HashMap::new();
        for i in 0..65 {
            vars.insert(format!("k{}", i), "v".to_string());
        }
        assert!(validate_variables(&vars).is_err());
    }

    #[test]
    fn test_validate_recipient_valid() {
        assert!(validate_recipient("a@b.com").is_ok());
        assert!(validate_recipient("+420123456789").is_ok());
    }

    #[test]
    fn test_validate_recipient_empty() {
        assert!(validate_recipient("").is_err());
        assert!(validate_recipient("   ").is_err());
    }

    #[test]
    fn test_validate_recipient_control_chars() {
        assert!(validate_recipient("a@b.com\n").is_err());
        assert!(validate_recipient("a\tb").is_err());
    }
}
