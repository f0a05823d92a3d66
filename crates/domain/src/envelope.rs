//! API response envelope
//!
//! Every endpoint wraps its payload in `{success, data|error}`. Only the
//! two envelope fields are typed; the payload stays opaque JSON that the
//! caller passes through to whatever consumes it.

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::errors::{FloorLinkError, Result};

/// Decoded response envelope.
///
/// `success=false` implies `error` carries the server's message;
/// `success=true` implies the endpoint-specific payload is present under
/// `data` (list and record endpoints) or a named key such as `machine`
/// (cycle-count endpoints).
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope {
    pub success: bool,
    #[serde(default)]
    pub error: Option<String>,
    /// Endpoint-specific remainder of the envelope.
    #[serde(flatten)]
    pub payload: Map<String, Value>,
}

impl Envelope {
    /// Error text for a failed envelope. Servers occasionally omit the
    /// `error` field even on failure; degrade to a placeholder.
    pub fn error_message(&self) -> &str {
        self.error.as_deref().unwrap_or("no error message in response")
    }

    /// Look up a payload field by key.
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.payload.get(key)
    }

    /// The `data` payload as a record list, as returned by the reference
    /// data endpoints (`sites/`, `areas/`, `lines/`, `machines/`).
    pub fn records(&self) -> Result<&Vec<Value>> {
        self.field("data")
            .and_then(Value::as_array)
            .ok_or_else(|| FloorLinkError::Decode("envelope has no `data` record list".into()))
    }
}
