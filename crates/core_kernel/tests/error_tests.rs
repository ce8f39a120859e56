//! Tests for kernel error types

use core_kernel::error::CoreError;
use core_kernel::geometry::GeometryError;
use core_kernel::ClaimId;

#[test]
fn test_validation_carries_the_message() {
    let error = CoreError::validation("Land size must be positive");

    match error {
        CoreError::Validation(msg) => assert_eq!(msg, "Land size must be positive"),
        _ => panic!("Expected Validation error"),
    }
}

#[test]
fn test_invalid_identifier_names_the_offending_value() {
    let error = CoreError::invalid_identifier("CLM-not-a-uuid", "invalid UUID");
    let display = error.to_string();

    assert!(display.contains("CLM-not-a-uuid"));
    assert!(display.starts_with("Invalid identifier"));
}

#[test]
fn test_malformed_claim_id_maps_into_invalid_identifier() {
    let raw = "CLM-zzzz";
    let parse_err = raw.parse::<ClaimId>().unwrap_err();
    let error = CoreError::invalid_identifier(raw, parse_err.to_string());

    assert!(matches!(error, CoreError::InvalidIdentifier { .. }));
}

#[test]
fn test_invalid_transition_records_both_endpoints() {
    let error = CoreError::invalid_transition("Draft", "Approved");

    match error {
        CoreError::InvalidStateTransition { from, to } => {
            assert_eq!(from, "Draft");
            assert_eq!(to, "Approved");
        }
        _ => panic!("Expected InvalidStateTransition error"),
    }
}

#[test]
fn test_not_found_display_names_entity_and_id() {
    let error = CoreError::not_found("Claim", "CLM-550e8400");
    let display = error.to_string();

    assert_eq!(display, "Claim not found: CLM-550e8400");
}

#[test]
fn test_geometry_errors_convert_into_core_errors() {
    let geometry_error = GeometryError::OpenRing;
    let core_error: CoreError = geometry_error.into();

    assert!(matches!(core_error, CoreError::Geometry(_)));
    assert!(core_error.to_string().starts_with("Geometry error"));
}

#[test]
fn test_display_prefixes() {
    assert!(CoreError::validation("x").to_string().contains("Validation error"));
    assert!(CoreError::Configuration("Missing API_JWT_SECRET".to_string())
        .to_string()
        .contains("Configuration error"));
}
