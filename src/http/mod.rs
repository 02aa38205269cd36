//! HTTP protocol layer module
//!
//! Builds the JSON responses sent by the router, decoupled from routing and handlers.

pub mod response;

// Re-export commonly used builders
pub use response::{
    build_internal_error_response, build_not_found_response, build_payload_too_large_response,
    json_response,
};
