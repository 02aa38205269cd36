//! HTTP response building module
//!
//! Every response is a JSON object; failures carry a single `error` field.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Response, StatusCode};
use serde::Serialize;

pub const NOT_FOUND_MESSAGE: &str = "Route not found";
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal Server Error";
pub const PAYLOAD_TOO_LARGE_MESSAGE: &str = "Payload Too Large";

/// Body used when even the error reply cannot be serialized
const FALLBACK_ERROR_BODY: &str = r#"{"error":"Internal Server Error"}"#;

/// Build JSON response
pub fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Response<Full<Bytes>> {
    match serde_json::to_vec(body) {
        Ok(json) => build(status, Bytes::from(json)),
        Err(e) => {
            crate::logger::log_error(&format!("Failed to serialize response: {e}"));
            build(
                StatusCode::INTERNAL_SERVER_ERROR,
                Bytes::from_static(FALLBACK_ERROR_BODY.as_bytes()),
            )
        }
    }
}

/// Build `{"error": message}` response
pub fn error_response(status: StatusCode, message: &str) -> Response<Full<Bytes>> {
    json_response(status, &serde_json::json!({ "error": message }))
}

/// Build 404 Not Found response
pub fn build_not_found_response() -> Response<Full<Bytes>> {
    error_response(StatusCode::NOT_FOUND, NOT_FOUND_MESSAGE)
}

/// Build 500 Internal Server Error response
pub fn build_internal_error_response() -> Response<Full<Bytes>> {
    error_response(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR_MESSAGE)
}

/// Build 413 Payload Too Large response
pub fn build_payload_too_large_response() -> Response<Full<Bytes>> {
    error_response(StatusCode::PAYLOAD_TOO_LARGE, PAYLOAD_TOO_LARGE_MESSAGE)
}

fn build(status: StatusCode, body: Bytes) -> Response<Full<Bytes>> {
    let content_length = body.len();
    Response::builder()
        .status(status)
        .header("Content-Type", "application/json; charset=utf-8")
        .header("Content-Length", content_length)
        .body(Full::new(body.clone()))
        .unwrap_or_else(|e| {
            log_build_error(status, &e);
            let mut resp = Response::new(Full::new(body));
            *resp.status_mut() = status;
            resp
        })
}

/// Log response build error
fn log_build_error(status: StatusCode, error: &hyper::http::Error) {
    crate::logger::log_error(&format!("Failed to build {status} response: {error}"));
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn body_json(resp: Response<Full<Bytes>>) -> serde_json::Value {
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_not_found_response() {
        let resp = build_not_found_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            resp.headers()["Content-Type"],
            "application/json; charset=utf-8"
        );
        assert_eq!(body_json(resp).await, serde_json::json!({"error": "Route not found"}));
    }

    #[tokio::test]
    async fn test_internal_error_response() {
        let resp = build_internal_error_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body_json(resp).await,
            serde_json::json!({"error": "Internal Server Error"})
        );
    }

    #[tokio::test]
    async fn test_json_response_sets_length() {
        let resp = json_response(StatusCode::OK, &serde_json::json!({"message": "hi"}));
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()["Content-Length"], "16");
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&bytes[..], br#"{"message":"hi"}"#);
    }

    #[tokio::test]
    async fn test_unserializable_body_falls_back_to_500() {
        use std::collections::HashMap;
        // Non-string map keys cannot become JSON object keys
        let mut map: HashMap<(u8, u8), u8> = HashMap::new();
        map.insert((1, 2), 3);
        let resp = json_response(StatusCode::OK, &map);
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body_json(resp).await,
            serde_json::json!({"error": "Internal Server Error"})
        );
    }
}
