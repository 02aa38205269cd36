//! Route table module
//!
//! Ordered (method, pattern) → handler table. Built once at startup.

use hyper::Method;

use super::matcher::{PathParams, PathPattern};
use crate::handler::Handler;

/// A registered route
pub struct Route {
    pub method: Method,
    pub pattern: PathPattern,
    pub handler: Handler,
}

/// Result of a successful lookup
pub struct RouteMatch<'a> {
    pub route: &'a Route,
    pub params: PathParams,
}

/// Ordered route table
#[derive(Default)]
pub struct RouteTable {
    routes: Vec<Route>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a route for an arbitrary method
    #[must_use]
    pub fn route(mut self, method: Method, pattern: &str, handler: Handler) -> Self {
        self.routes.push(Route {
            method,
            pattern: PathPattern::parse(pattern),
            handler,
        });
        self
    }

    /// Register a GET route
    #[must_use]
    pub fn get(self, pattern: &str, handler: Handler) -> Self {
        self.route(Method::GET, pattern, handler)
    }

    /// Find the first route matching method and path
    pub fn find(&self, method: &Method, path: &str) -> Option<RouteMatch<'_>> {
        self.routes
            .iter()
            .filter(|route| route.method == *method)
            .find_map(|route| {
                route
                    .pattern
                    .matches(path)
                    .map(|params| RouteMatch { route, params })
            })
    }

    /// Routes in match order
    pub fn iter(&self) -> impl Iterator<Item = &Route> {
        self.routes.iter()
    }
}
