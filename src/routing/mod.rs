//! Routing module
//!
//! Provides method + path routing for the JSON API:
//! - Path patterns with literal and `:name` parameter segments
//! - An ordered route table where the first match wins

mod matcher;
mod table;

pub use matcher::PathParams;
pub use table::RouteTable;
