//! JSON body parsing module
//!
//! Reads and parses `application/json` request bodies for matched routes.
//! Requests with any other content type are passed through without reading the body.

use http_body_util::{BodyExt, LengthLimitError, Limited};
use hyper::body::Body;
use hyper::HeaderMap;
use serde_json::Value;
use std::fmt;

/// Reason a request body was rejected
#[derive(Debug)]
pub enum BodyError {
    /// Body exceeds the configured limit
    TooLarge { limit: u64 },
    /// Body is not valid JSON
    Invalid(serde_json::Error),
    /// Body could not be read from the connection
    Read(String),
}

impl fmt::Display for BodyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooLarge { limit } => write!(f, "request body exceeds {limit} bytes"),
            Self::Invalid(e) => write!(f, "invalid JSON body: {e}"),
            Self::Read(msg) => write!(f, "failed to read request body: {msg}"),
        }
    }
}

impl std::error::Error for BodyError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Invalid(e) => Some(e),
            _ => None,
        }
    }
}

/// Check whether the request declares a JSON body
pub fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(hyper::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .is_some_and(|mime| {
            let mime = mime.trim().to_ascii_lowercase();
            mime == "application/json" || mime.ends_with("+json")
        })
}

/// Read and parse a JSON body, bounded by `max_body_size`
///
/// Returns `Ok(None)` for non-JSON or empty bodies.
pub async fn read_json_body<B>(
    headers: &HeaderMap,
    body: B,
    max_body_size: u64,
) -> Result<Option<Value>, BodyError>
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    if !is_json(headers) {
        return Ok(None);
    }

    if let Some(size) = declared_length(headers) {
        if size > max_body_size {
            return Err(BodyError::TooLarge {
                limit: max_body_size,
            });
        }
    }

    let limit = usize::try_from(max_body_size).unwrap_or(usize::MAX);
    let bytes = match Limited::new(body, limit).collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) if e.downcast_ref::<LengthLimitError>().is_some() => {
            return Err(BodyError::TooLarge {
                limit: max_body_size,
            });
        }
        Err(e) => return Err(BodyError::Read(e.to_string())),
    };

    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }

    serde_json::from_slice(&bytes)
        .map(Some)
        .map_err(BodyError::Invalid)
}

/// Parse the Content-Length header, ignoring malformed values
fn declared_length(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(hyper::header::CONTENT_LENGTH)?
        .to_str()
        .ok()?
        .trim()
        .parse()
        .ok()
}
