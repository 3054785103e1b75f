use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, Method, Uri},
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::collections::HashMap;

use crate::models::{FunctionEvent, FunctionResponse};
use crate::startup::AppState;

/// Accepts every method so that non-POST callers get the JSON 405 body
/// instead of the router's empty one.
pub async fn decode(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> FunctionResponse {
    let event = to_event(&method, &uri, &headers, body);
    state.decoder.handle(event).await
}

/// Build the function event the way a functions runtime would: text bodies
/// pass through, binary bodies are base64-encoded and flagged.
pub fn to_event(method: &Method, uri: &Uri, headers: &HeaderMap, body: Bytes) -> FunctionEvent {
    let (body, is_base64_encoded) = if body.is_empty() {
        (None, false)
    } else {
        match String::from_utf8(body.to_vec()) {
            Ok(text) => (Some(text), false),
            Err(_) => (Some(STANDARD.encode(&body)), true),
        }
    };

    let headers: HashMap<String, String> = headers
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|v| (name.as_str().to_string(), v.to_string()))
        })
        .collect();

    FunctionEvent {
        http_method: method.as_str().to_string(),
        body,
        is_base64_encoded,
        headers,
        path: uri.path().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn text_body_passes_through() {
        let mut headers = HeaderMap::new();
        headers.insert("content-type", HeaderValue::from_static("application/json"));

        let event = to_event(
            &Method::POST,
            &Uri::from_static("/.netlify/functions/decode"),
            &headers,
            Bytes::from_static(br#"{"phrase":"roger"}"#),
        );

        assert_eq!(event.http_method, "POST");
        assert_eq!(event.body.as_deref(), Some(r#"{"phrase":"roger"}"#));
        assert!(!event.is_base64_encoded);
        assert_eq!(event.path, "/.netlify/functions/decode");
        assert_eq!(event.headers["content-type"], "application/json");
    }

    #[test]
    fn empty_body_is_absent() {
        let event = to_event(&Method::GET, &Uri::from_static("/api/decode"), &HeaderMap::new(), Bytes::new());
        assert_eq!(event.body, None);
    }

    #[test]
    fn binary_body_is_base64_flagged() {
        let event = to_event(
            &Method::POST,
            &Uri::from_static("/api/decode"),
            &HeaderMap::new(),
            Bytes::from_static(&[0xff, 0xfe, 0x00]),
        );

        assert!(event.is_base64_encoded);
        assert_eq!(event.body.as_deref(), Some("//4A"));
    }
}
