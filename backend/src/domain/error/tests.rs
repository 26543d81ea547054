//! Tests for error payload construction and serialisation.

use rstest::{fixture, rstest};
use serde_json::json;

use super::*;

#[fixture]
fn conflict_error() -> Error {
    Error::conflict("slot taken").with_details(json!({"appointmentId": "abc"}))
}

#[rstest]
#[case(Error::invalid_request("bad"), ErrorCode::InvalidRequest)]
#[case(Error::not_found("missing"), ErrorCode::NotFound)]
#[case(Error::conflict("overlap"), ErrorCode::Conflict)]
#[case(Error::business_rule("too late"), ErrorCode::BusinessRule)]
#[case(Error::service_unavailable("down"), ErrorCode::ServiceUnavailable)]
#[case(Error::internal("boom"), ErrorCode::InternalError)]
fn constructors_set_code(#[case] error: Error, #[case] expected: ErrorCode) {
    assert_eq!(error.code(), expected);
}

#[rstest]
fn try_new_rejects_empty_messages() {
    let result = Error::try_new(ErrorCode::InvalidRequest, "   ");
    assert!(matches!(result, Err(ErrorValidationError::EmptyMessage)));
}

#[rstest]
#[should_panic(expected = "error messages must satisfy validation")]
fn new_panics_on_empty_message() {
    let _ = Error::new(ErrorCode::Conflict, "");
}

#[rstest]
fn display_uses_message(conflict_error: Error) {
    assert_eq!(conflict_error.to_string(), "slot taken");
}

#[rstest]
fn serialises_with_snake_case_code(conflict_error: Error) {
    let value = serde_json::to_value(&conflict_error).expect("serialise");
    assert_eq!(
        value,
        json!({
            "code": "conflict",
            "message": "slot taken",
            "details": {"appointmentId": "abc"},
        })
    );
}

#[rstest]
fn details_are_omitted_when_absent() {
    let value = serde_json::to_value(Error::business_rule("too late")).expect("serialise");
    assert_eq!(value, json!({"code": "business_rule", "message": "too late"}));
}

#[rstest]
fn deserialisation_round_trips(conflict_error: Error) {
    let json = serde_json::to_string(&conflict_error).expect("serialise");
    let restored: Error = serde_json::from_str(&json).expect("deserialise");
    assert_eq!(restored, conflict_error);
}

#[rstest]
fn deserialisation_rejects_blank_messages() {
    let result = serde_json::from_value::<Error>(json!({
        "code": "not_found",
        "message": "  ",
    }));
    assert!(result.is_err());
}
