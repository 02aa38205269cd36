//! Request routing dispatch module
//!
//! Entry point for HTTP request processing: route lookup, body parsing,
//! handler invocation, then mapping of the dispatch outcome to a response.

use crate::config::AppState;
use crate::handler::body::{self, BodyError};
use crate::handler::{Handler, HandlerError, JsonReply, RequestContext};
use crate::http;
use crate::logger::{self, AccessLogEntry};
use http_body_util::Full;
use hyper::body::{Body, Bytes};
use hyper::{Method, Request, Response, Version};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;

/// Outcome of dispatching one request
#[derive(Debug)]
pub enum Dispatch {
    /// A route matched and its handler replied
    Matched(JsonReply),
    /// No route matched method + path
    NotFound,
    /// A route matched but its body was refused
    Rejected(BodyError),
    /// The matched handler failed or panicked
    Faulted(HandlerError),
}

/// Main entry point for HTTP request handling
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    peer_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible>
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let started = Instant::now();
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    let mut entry = AccessLogEntry::new(peer_addr.ip().to_string(), method.to_string(), path.clone());
    entry.query = req.uri().query().map(ToString::to_string);
    entry.http_version = version_label(req.version()).to_string();
    entry.referer = header_value(&req, "referer");
    entry.user_agent = header_value(&req, "user-agent");

    let outcome = dispatch(req, &state).await;
    let response = into_response(outcome, &method, &path);

    if state.config.logging.access_log {
        entry.status = response.status().as_u16();
        entry.body_bytes = response.body().size_hint().exact().unwrap_or(0);
        entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
        logger::log_access(&entry, &state.config.logging.access_log_format);
    }

    Ok(response)
}

/// Resolve a request to its dispatch outcome
pub async fn dispatch<B>(req: Request<B>, state: &AppState) -> Dispatch
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let (parts, req_body) = req.into_parts();
    let path = parts.uri.path();

    let Some(matched) = state.routes.find(&parts.method, path) else {
        return Dispatch::NotFound;
    };
    let handler = matched.route.handler;

    // JSON bodies are checked here; no handler consumes them
    if let Err(e) =
        body::read_json_body(&parts.headers, req_body, state.config.http.max_body_size).await
    {
        return Dispatch::Rejected(e);
    }

    let ctx = RequestContext {
        params: matched.params,
    };

    invoke(handler, &ctx)
}

/// Run a handler, turning both error returns and panics into `Faulted`
pub fn invoke(handler: Handler, ctx: &RequestContext) -> Dispatch {
    match panic::catch_unwind(AssertUnwindSafe(|| handler(ctx))) {
        Ok(Ok(reply)) => Dispatch::Matched(reply),
        Ok(Err(err)) => Dispatch::Faulted(err),
        Err(payload) => Dispatch::Faulted(HandlerError::Panic(panic_message(payload.as_ref()))),
    }
}

/// Map a dispatch outcome to the response sent to the client
pub fn into_response(outcome: Dispatch, method: &Method, path: &str) -> Response<Full<Bytes>> {
    match outcome {
        Dispatch::Matched(reply) => http::json_response(reply.status, &reply.body),
        Dispatch::NotFound => http::build_not_found_response(),
        Dispatch::Rejected(err @ BodyError::TooLarge { .. }) => {
            logger::log_warning(&format!("{method} {path}: {err}"));
            http::build_payload_too_large_response()
        }
        // Error handler: last stage, catches body and handler faults alike
        Dispatch::Rejected(err) => {
            logger::log_fault(method, path, &err);
            http::build_internal_error_response()
        }
        Dispatch::Faulted(err) => {
            logger::log_fault(method, path, &err);
            http::build_internal_error_response()
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

fn header_value<B>(req: &Request<B>, name: &str) -> Option<String> {
    req.headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string)
}

const fn version_label(version: Version) -> &'static str {
    match version {
        Version::HTTP_09 => "0.9",
        Version::HTTP_10 => "1.0",
        Version::HTTP_2 => "2",
        Version::HTTP_3 => "3",
        _ => "1.1",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::handler::api;
    use crate::handler::HandlerResult;
    use crate::routing::RouteTable;
    use http_body_util::BodyExt;
    use hyper::StatusCode;
    use serde_json::{json, Value};

    fn test_state(routes: RouteTable) -> Arc<AppState> {
        let mut cfg = Config::load_from("does-not-exist/config").unwrap();
        cfg.logging.access_log = false;
        cfg.http.max_body_size = 64;
        Arc::new(AppState::new(&cfg, routes))
    }

    fn peer() -> SocketAddr {
        "127.0.0.1:50000".parse().unwrap()
    }

    fn request(method: Method, uri: &str) -> Request<Full<Bytes>> {
        Request::builder()
            .method(method)
            .uri(uri)
            .body(Full::new(Bytes::new()))
            .unwrap()
    }

    fn json_request(uri: &str, body: &'static str) -> Request<Full<Bytes>> {
        Request::builder()
            .method(Method::GET)
            .uri(uri)
            .header("Content-Type", "application/json")
            .body(Full::new(Bytes::from_static(body.as_bytes())))
            .unwrap()
    }

    async fn send(state: &Arc<AppState>, req: Request<Full<Bytes>>) -> (StatusCode, Value) {
        let resp = handle_request(req, Arc::clone(state), peer()).await.unwrap();
        let status = resp.status();
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn failing(_ctx: &RequestContext) -> HandlerResult {
        Err(HandlerError::Internal("boom".to_string()))
    }

    fn panicking(_ctx: &RequestContext) -> HandlerResult {
        panic!("handler exploded")
    }

    #[tokio::test]
    async fn test_root() {
        let state = test_state(api::routes());
        let (status, body) = send(&state, request(Method::GET, "/")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"message": "Welcome to our API service!"}));
    }

    #[tokio::test]
    async fn test_root_ignores_query_and_headers() {
        let state = test_state(api::routes());
        let req = Request::builder()
            .uri("/?page=2&x=y")
            .header("X-Custom", "1")
            .body(Full::new(Bytes::new()))
            .unwrap();
        let (status, body) = send(&state, req).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Welcome to our API service!");
    }

    #[tokio::test]
    async fn test_user_lookup() {
        let state = test_state(api::routes());
        let (status, body) = send(&state, request(Method::GET, "/user/42")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"id": "42", "name": "User"}));
    }

    #[tokio::test]
    async fn test_user_id_is_echoed_verbatim() {
        let state = test_state(api::routes());
        for id in ["abc", "007", "-1", "x.y_z~"] {
            let (status, body) = send(&state, request(Method::GET, &format!("/user/{id}"))).await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(body, json!({"id": id, "name": "User"}));
        }
    }

    #[tokio::test]
    async fn test_empty_user_id_is_not_found() {
        let state = test_state(api::routes());
        let (status, body) = send(&state, request(Method::GET, "/user/")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({"error": "Route not found"}));
    }

    #[tokio::test]
    async fn test_non_get_is_not_found() {
        let state = test_state(api::routes());
        for method in [Method::POST, Method::PUT, Method::DELETE, Method::PATCH, Method::HEAD] {
            let (status, body) = send(&state, request(method, "/user/42")).await;
            assert_eq!(status, StatusCode::NOT_FOUND);
            assert_eq!(body, json!({"error": "Route not found"}));
        }
    }

    #[tokio::test]
    async fn test_unknown_path_is_not_found() {
        let state = test_state(api::routes());
        for uri in ["/nonexistent", "/user", "/user/42/extra", "/users/42"] {
            let (status, body) = send(&state, request(Method::GET, uri)).await;
            assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
            assert_eq!(body, json!({"error": "Route not found"}));
        }
    }

    #[tokio::test]
    async fn test_unmatched_route_ignores_body() {
        let state = test_state(api::routes());
        let (status, _) = send(&state, json_request("/nonexistent", "{broken")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_handler_error_becomes_500() {
        let state = test_state(RouteTable::new().get("/fail", failing));
        let (status, body) = send(&state, request(Method::GET, "/fail")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({"error": "Internal Server Error"}));
    }

    #[tokio::test]
    async fn test_handler_panic_becomes_500_and_serving_continues() {
        let state = test_state(
            RouteTable::new()
                .get("/panic", panicking)
                .get("/", api::root),
        );
        let (status, body) = send(&state, request(Method::GET, "/panic")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({"error": "Internal Server Error"}));

        let (status, _) = send(&state, request(Method::GET, "/")).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_user_id_is_percent_decoded() {
        let state = test_state(api::routes());
        let (status, body) = send(&state, request(Method::GET, "/user/a%20b")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"id": "a b", "name": "User"}));

        let (_, body) = send(&state, request(Method::GET, "/user/caf%C3%A9")).await;
        assert_eq!(body["id"], "caf\u{e9}");
    }

    #[tokio::test]
    async fn test_json_body_on_matched_route_is_accepted() {
        let state = test_state(api::routes());
        let (status, body) = send(&state, json_request("/user/1", r#"{"a":1}"#)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"id": "1", "name": "User"}));
    }

    #[tokio::test]
    async fn test_malformed_json_goes_to_error_handler() {
        let state = test_state(api::routes());
        let (status, body) = send(&state, json_request("/", "{oops")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({"error": "Internal Server Error"}));

        let (status, _) = send(&state, request(Method::GET, "/")).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_oversized_json_on_matched_route() {
        let state = test_state(api::routes());
        let big = r#"{"padding":"xxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxx"}"#;
        let (status, body) = send(&state, json_request("/", big)).await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(body, json!({"error": "Payload Too Large"}));
    }

    #[test]
    fn test_dispatch_outcomes() {
        let ctx = RequestContext {
            params: crate::routing::PathParams::default(),
        };
        assert!(matches!(invoke(api::root, &ctx), Dispatch::Matched(_)));
        assert!(matches!(invoke(failing, &ctx), Dispatch::Faulted(HandlerError::Internal(_))));
        match invoke(panicking, &ctx) {
            Dispatch::Faulted(HandlerError::Panic(msg)) => assert_eq!(msg, "handler exploded"),
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn test_version_label() {
        assert_eq!(version_label(Version::HTTP_11), "1.1");
        assert_eq!(version_label(Version::HTTP_10), "1.0");
    }
}
