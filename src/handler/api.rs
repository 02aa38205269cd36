//! JSON API handlers
//!
//! `GET /` welcome message and `GET /user/:id` synthetic user lookup.

use serde::Serialize;
use serde_json::json;

use super::{HandlerError, HandlerResult, JsonReply, RequestContext};
use crate::routing::RouteTable;

pub const WELCOME_MESSAGE: &str = "Welcome to our API service!";

/// Name given to every synthesized user
pub const USER_NAME: &str = "User";

/// User record built from the request path; never stored
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct User {
    pub id: String,
    pub name: String,
}

impl User {
    pub fn synthetic(id: &str) -> Self {
        Self {
            id: id.to_string(),
            name: USER_NAME.to_string(),
        }
    }
}

/// Build the application route table
pub fn routes() -> RouteTable {
    RouteTable::new().get("/", root).get("/user/:id", show_user)
}

/// `GET /`
pub fn root(_ctx: &RequestContext) -> HandlerResult {
    Ok(JsonReply::ok(json!({ "message": WELCOME_MESSAGE })))
}

/// `GET /user/:id`
pub fn show_user(ctx: &RequestContext) -> HandlerResult {
    let id = ctx
        .param("id")
        .ok_or_else(|| HandlerError::Internal("route parameter `id` missing".to_string()))?;
    let user = User::synthetic(id);
    Ok(JsonReply::ok(serde_json::to_value(&user)?))
}
