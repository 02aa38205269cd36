//! Request handler module
//!
//! Responsible for request dispatch, the JSON API handlers, and the
//! fallback / error handling stages around them.

pub mod api;
pub mod body;
mod error;
pub mod router;

use hyper::StatusCode;
use serde_json::Value;

use crate::routing::PathParams;

pub use error::HandlerError;
// Re-export main entry point
pub use router::handle_request;

/// Handler signature: a matched request in, a JSON reply (or fault) out
pub type Handler = fn(&RequestContext) -> HandlerResult;

pub type HandlerResult = Result<JsonReply, HandlerError>;

/// Request context handed to a matched handler
#[derive(Debug)]
pub struct RequestContext {
    pub params: PathParams,
}

impl RequestContext {
    /// Get a path parameter bound by the route pattern
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name)
    }
}

/// Status + JSON body produced by a handler
#[derive(Debug, Clone, PartialEq)]
pub struct JsonReply {
    pub status: StatusCode,
    pub body: Value,
}

impl JsonReply {
    pub const fn new(status: StatusCode, body: Value) -> Self {
        Self { status, body }
    }

    /// 200 OK reply
    pub const fn ok(body: Value) -> Self {
        Self::new(StatusCode::OK, body)
    }
}
