use super::*;

#[test]
fn test_error_status_codes() {
    assert_eq!(AppError::NotFound(String::new()).status_code(), 404);
    assert_eq!(AppError::Validation(String::new()).status_code(), 400);
    assert_eq!(AppError::BusinessRule(String::new()).status_code(), 422);
    assert_eq!(AppError::Configuration(String::new()).status_code(), 422);
    assert_eq!(AppError::Conflict(String::new()).status_code(), 409);
    assert_eq!(AppError::Storage(String::new()).status_code(), 500);
    assert_eq!(AppError::Internal(String::new()).status_code(), 500);
}

#[test]
fn test_error_codes() {
    assert_eq!(AppError::NotFound(String::new()).error_code(), "NOT_FOUND");
    assert_eq!(
        AppError::Validation(String::new()).error_code(),
        "VALIDATION_ERROR"
    );
    assert_eq!(
        AppError::BusinessRule(String::new()).error_code(),
        "BUSINESS_RULE_VIOLATION"
    );
    assert_eq!(AppError::Conflict(String::new()).error_code(), "CONFLICT");
    assert_eq!(
        AppError::Configuration(String::new()).error_code(),
        "CONFIGURATION_ERROR"
    );
}

#[test]
fn test_only_conflicts_are_retryable() {
    assert!(AppError::Conflict("stale".into()).is_retryable());
    assert!(!AppError::BusinessRule("stock".into()).is_retryable());
    assert!(!AppError::Internal("bug".into()).is_retryable());
}

#[test]
fn test_error_display() {
    assert_eq!(
        AppError::BusinessRule("msg".into()).to_string(),
        "Business rule violation: msg"
    );
    assert_eq!(
        AppError::Conflict("msg".into()).to_string(),
        "Conflict: msg"
    );
    assert_eq!(
        AppError::Configuration("msg".into()).to_string(),
        "Configuration error: msg"
    );
}
