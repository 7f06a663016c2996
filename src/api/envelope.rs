use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashMap;
use tracing::{debug, warn};

/// Inbound invocation payload, classified once at decode time.
#[derive(Debug, Clone, PartialEq)]
pub enum Envelope {
    /// Resolver style: `request.authorization` plus an `arguments` mapping
    Resolver(ResolverEnvelope),
    /// API Gateway proxy request
    Gateway(GatewayEnvelope),
}

/// Typed view of a resolver document. Each part is either present with the
/// expected shape or absent; nothing in here is ever an error.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolverEnvelope {
    authorization: Option<String>,
    arguments: Option<Map<String, Value>>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GatewayEnvelope {
    http_method: String,
    headers: HashMap<String, String>,
    // Decoded from the body when it carries a JSON object
    document: ResolverEnvelope,
}

impl Envelope {
    /// Re-serialize an arbitrary event into a generic document and decode it.
    pub fn from_event<T: Serialize + ?Sized>(event: &T) -> Self {
        match serde_json::to_value(event) {
            Ok(value) => Self::decode(&value),
            Err(e) => {
                warn!("Event could not be serialized, treating it as empty: {}", e);
                Envelope::Resolver(ResolverEnvelope::default())
            }
        }
    }

    pub fn decode(value: &Value) -> Self {
        if value.get("httpMethod").is_some() {
            debug!("Decoded gateway envelope");
            Envelope::Gateway(GatewayEnvelope::from_document(value))
        } else {
            debug!("Decoded resolver envelope");
            Envelope::Resolver(ResolverEnvelope::from_document(value))
        }
    }

    /// The resolver document carried by this envelope
    pub fn document(&self) -> &ResolverEnvelope {
        match self {
            Envelope::Resolver(resolver) => resolver,
            Envelope::Gateway(gateway) => &gateway.document,
        }
    }

    /// Bearer token from `request.authorization`, or `""`
    pub fn authorization(&self) -> String {
        self.document().authorization().unwrap_or_default().to_string()
    }

    /// String argument `arguments[key]`, or `""`
    pub fn field(&self, key: &str) -> String {
        self.document().argument(key).unwrap_or_default().to_string()
    }

    pub fn is_gateway(&self) -> bool {
        matches!(self, Envelope::Gateway(_))
    }
}

impl ResolverEnvelope {
    pub fn from_document(value: &Value) -> Self {
        let authorization = value
            .get("request")
            .and_then(Value::as_object)
            .and_then(|request| request.get("authorization"))
            .and_then(Value::as_str)
            .map(String::from);

        let arguments = value.get("arguments").and_then(Value::as_object).cloned();

        Self {
            authorization,
            arguments,
        }
    }

    pub fn authorization(&self) -> Option<&str> {
        self.authorization.as_deref()
    }

    /// Present only when `arguments` is a mapping and the value is a string.
    pub fn argument(&self, key: &str) -> Option<&str> {
        self.arguments
            .as_ref()
            .and_then(|args| args.get(key))
            .and_then(Value::as_str)
    }
}

impl GatewayEnvelope {
    pub fn from_document(value: &Value) -> Self {
        let http_method = value
            .get("httpMethod")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        let headers = value
            .get("headers")
            .and_then(Value::as_object)
            .map(|headers| {
                headers
                    .iter()
                    .filter_map(|(k, v)| v.as_str().map(|v| (k.clone(), v.to_string())))
                    .collect()
            })
            .unwrap_or_default();

        let document = value
            .get("body")
            .and_then(Value::as_str)
            .and_then(|body| serde_json::from_str::<Value>(body).ok())
            .filter(Value::is_object)
            .map(|body| ResolverEnvelope::from_document(&body))
            .unwrap_or_default();

        Self {
            http_method,
            headers,
            document,
        }
    }

    pub fn http_method(&self) -> &str {
        &self.http_method
    }

    /// Inbound headers. These are not consulted for the bearer token.
    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }
}

/// Bearer token of a raw event, or `""`
pub fn authorization(event: &Value) -> String {
    Envelope::decode(event).authorization()
}

/// Named string argument of a raw event, or `""`
pub fn field(event: &Value, key: &str) -> String {
    Envelope::decode(event).field(key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_resolver_extraction() {
        let event = json!({
            "request": {"authorization": "tok1"},
            "arguments": {"name": "Acme", "mailAddress": "a@b.com"}
        });

        let envelope = Envelope::decode(&event);
        assert!(!envelope.is_gateway());
        assert_eq!(envelope.authorization(), "tok1");
        assert_eq!(envelope.field("name"), "Acme");
        assert_eq!(envelope.field("mailAddress"), "a@b.com");
        assert_eq!(envelope.field("url"), "");
    }

    #[test]
    fn test_missing_request_yields_empty_token() {
        assert_eq!(authorization(&json!({"arguments": {}})), "");
        assert_eq!(authorization(&json!({"request": {}})), "");
        assert_eq!(authorization(&json!({"request": "tok1"})), "");
        assert_eq!(authorization(&json!({"request": {"authorization": 42}})), "");
        assert_eq!(authorization(&json!(null)), "");
    }

    #[test]
    fn test_malformed_arguments_yield_empty_fields() {
        for event in [
            json!({}),
            json!({"arguments": null}),
            json!({"arguments": "name"}),
            json!({"arguments": ["name"]}),
            json!([1, 2, 3]),
        ] {
            assert_eq!(field(&event, "name"), "", "event: {}", event);
        }
    }

    #[test]
    fn test_non_string_scalars_are_type_mismatches() {
        let event = json!({"arguments": {"count": 3, "flag": true, "nested": {"a": "b"}}});
        let envelope = Envelope::decode(&event);

        assert_eq!(envelope.document().argument("count"), None);
        assert_eq!(envelope.field("count"), "");
        assert_eq!(envelope.field("flag"), "");
        assert_eq!(envelope.field("nested"), "");
    }

    #[test]
    fn test_decode_does_not_mutate_event() {
        let event = json!({"request": {"authorization": "tok1"}, "arguments": {"name": "Acme"}});
        let before = event.clone();
        let _ = Envelope::decode(&event);
        assert_eq!(event, before);
    }

    #[test]
    fn test_gateway_body_carries_resolver_document() {
        let body = json!({
            "request": {"authorization": "tok1"},
            "arguments": {"name": "Acme"}
        });
        let event = json!({
            "httpMethod": "POST",
            "headers": {"Authorization": "Bearer from-header", "X-Count": 1},
            "body": body.to_string()
        });

        let envelope = Envelope::decode(&event);
        assert!(envelope.is_gateway());
        assert_eq!(envelope.authorization(), "tok1");
        assert_eq!(envelope.field("name"), "Acme");

        match envelope {
            Envelope::Gateway(gateway) => {
                assert_eq!(gateway.http_method(), "POST");
                assert_eq!(gateway.headers().len(), 1);
            }
            Envelope::Resolver(_) => panic!("Expected gateway envelope"),
        }
    }

    #[test]
    fn test_gateway_headers_are_not_a_token_source() {
        let event = json!({
            "httpMethod": "GET",
            "headers": {"authorization": "tok1"},
            "body": "not json"
        });
        assert_eq!(authorization(&event), "");
    }

    #[test]
    fn test_from_event_reserializes_typed_events() {
        #[derive(Serialize)]
        struct Request {
            authorization: String,
        }
        #[derive(Serialize)]
        struct Event {
            request: Request,
        }

        let envelope = Envelope::from_event(&Event {
            request: Request {
                authorization: "tok2".to_string(),
            },
        });
        assert_eq!(envelope.authorization(), "tok2");
    }
}
