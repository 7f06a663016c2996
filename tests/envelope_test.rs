//! Characterization tests for permissive envelope decoding: absent or
//! mistyped fields always fold into the empty string.

use kaleido_handlers::api::envelope::{authorization, field};
use kaleido_handlers::api::{failure, success};
use kaleido_handlers::{ApiError, Envelope};
use serde_json::{json, Value};

fn envelopes_without_token() -> Vec<Value> {
    vec![
        json!({}),
        json!({"arguments": {"name": "Acme"}}),
        json!({"request": null}),
        json!({"request": []}),
        json!({"request": {"headers": {"authorization": "tok1"}}}),
        json!({"request": {"authorization": null}}),
        json!({"request": {"authorization": {"token": "tok1"}}}),
        json!("request"),
        Value::Null,
    ]
}

fn envelopes_without_arguments() -> Vec<Value> {
    vec![
        json!({}),
        json!({"request": {"authorization": "tok1"}}),
        json!({"arguments": null}),
        json!({"arguments": 7}),
        json!({"arguments": "name=Acme"}),
        json!({"arguments": [{"name": "Acme"}]}),
        json!({"input": {"name": "Acme"}}),
    ]
}

#[test]
fn test_authorization_is_empty_without_request_or_token() {
    for event in envelopes_without_token() {
        assert_eq!(authorization(&event), "", "event: {}", event);
    }
}

#[test]
fn test_fields_are_empty_without_argument_mapping() {
    for event in envelopes_without_arguments() {
        for key in ["name", "mailAddress", "url", ""] {
            assert_eq!(field(&event, key), "", "event: {}, key: {}", event, key);
        }
    }
}

#[test]
fn test_typed_decode_reports_absence() {
    let envelope = Envelope::decode(&json!({"arguments": {"name": "Acme", "age": 30}}));
    let document = envelope.document();

    assert_eq!(document.authorization(), None);
    assert_eq!(document.argument("name"), Some("Acme"));
    assert_eq!(document.argument("age"), None);
    assert_eq!(document.argument("url"), None);
}

#[test]
fn test_empty_string_argument_is_present_but_empty() {
    let envelope = Envelope::decode(&json!({"arguments": {"name": ""}}));
    assert_eq!(envelope.document().argument("name"), Some(""));
    assert_eq!(envelope.field("name"), "");
}

#[test]
fn test_success_body_decodes_to_payload() {
    let payloads = [
        json!(null),
        json!("text"),
        json!(12.5),
        json!([1, "two", {"three": 3}]),
        json!({"id": "abc", "nested": {"list": [true, false]}}),
    ];
    for payload in payloads {
        let response = success(&payload);
        assert_eq!(response.status_code(), 200);
        assert_eq!(serde_json::from_str::<Value>(response.body()).unwrap(), payload);
    }
}

#[test]
fn test_unauthenticated_failure_body_is_error_text() {
    let err = ApiError::Unauthenticated("Missing authorization token".to_string());
    let response = failure(&err);
    assert_eq!(response.status_code(), 401);
    assert_eq!(response.body(), err.to_string());
}
