use serde::Serialize;
use std::collections::HashMap;
use tracing::error;

use crate::api::error::ApiError;

/// Gateway-style response: status code, header mapping and a string body.
///
/// Only [`success`] and [`failure`] build one, so the status is always one of
/// 200, 400, 401, 404 or 500.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedResponse {
    status_code: u16,
    headers: HashMap<String, String>,
    body: String,
}

impl NormalizedResponse {
    pub fn status_code(&self) -> u16 {
        self.status_code
    }

    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    pub fn body(&self) -> &str {
        &self.body
    }
}

/// Permissive CORS headers attached to every response. There is no origin
/// allow-list.
pub fn cors_headers() -> HashMap<String, String> {
    [
        ("Access-Control-Allow-Headers", "*"),
        ("Access-Control-Allow-Methods", "GET,POST,PUT,DELETE"),
        ("Access-Control-Allow-Credentials", "true"),
        ("Access-Control-Allow-Origin", "*"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

/// 200 with the JSON-encoded payload as body
pub fn success<T: Serialize + ?Sized>(payload: &T) -> NormalizedResponse {
    match serde_json::to_string(payload) {
        Ok(body) => NormalizedResponse {
            status_code: 200,
            headers: cors_headers(),
            body,
        },
        Err(e) => {
            error!("Failed to serialize response payload: {}", e);
            failure(&ApiError::from(e))
        }
    }
}

/// Classified error response. The body is the raw error text.
pub fn failure(err: &ApiError) -> NormalizedResponse {
    NormalizedResponse {
        status_code: err.status_code(),
        headers: cors_headers(),
        body: err.to_string(),
    }
}
