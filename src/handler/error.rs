// Handler fault types

use std::fmt;

/// Fault raised while a matched handler runs
#[derive(Debug)]
pub enum HandlerError {
    /// Handler reported an internal failure
    Internal(String),
    /// Handler panicked; holds the panic message
    Panic(String),
    /// Reply could not be converted to JSON
    Serialize(serde_json::Error),
}

impl fmt::Display for HandlerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Internal(msg) => write!(f, "handler error: {msg}"),
            Self::Panic(msg) => write!(f, "handler panicked: {msg}"),
            Self::Serialize(e) => write!(f, "failed to serialize reply: {e}"),
        }
    }
}

impl std::error::Error for HandlerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Serialize(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for HandlerError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialize(e)
    }
}
