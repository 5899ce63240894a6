// Validation utilities for string fields

/// Trim and validate string fields
///
/// # Arguments
/// * `field` - The string field to validate
/// * `required` - Whether the field is required (cannot be empty)
pub fn trim_and_validate_field(field: &str, required: bool) -> Result<String, String> {
    let trimmed = field.trim().to_string();
    if trimmed.is_empty() {
        if required {
            Err("Field cannot be empty".to_string())
        } else {
            Ok(trimmed) // For optional fields, empty is valid
        }
    } else {
        Ok(trimmed)
    }
}

/// Trim and optionally validate a string field
///
/// Returns `None` if the field is None or empty after trimming.
pub fn trim_optional_field(field: Option<&String>) -> Option<String> {
    field.and_then(|s| {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

/// Validate a rejection reason or admin remark: mandatory, non-blank.
/// Every reject/approve decision in the workflow goes through this.
pub fn require_reason(reason: &str) -> Result<String, String> {
    trim_and_validate_field(reason, true).map_err(|_| "A non-empty reason is required".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_reason_rejects_blank() {
        assert!(require_reason("").is_err());
        assert!(require_reason("   ").is_err());
        assert!(require_reason("\t\n").is_err());
    }

    #[test]
    fn test_require_reason_trims() {
        assert_eq!(
            require_reason("  duplicate content  ").unwrap(),
            "duplicate content"
        );
    }
}
