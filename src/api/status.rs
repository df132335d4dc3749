//! Server status endpoint

use std::time::Duration;

use serde_json::Value;

use super::{ApiRequest, BodyFormat, Payload, RawMap};
use crate::config::ClientConfig;
use crate::error::{payload_preview, ApiError};

/// `GET status.json`
///
/// The body is read as text and parsed as JSON. If that yields a JSON string,
/// the string is parsed as JSON once more. The final value must be an object.
#[derive(Debug, Clone, Default)]
pub struct StatusRequest;

impl StatusRequest {
    pub const TIMEOUT: Duration = Duration::from_secs(3);
}

impl ApiRequest for StatusRequest {
    type Response = RawMap;

    fn path(&self) -> String {
        "status.json".to_string()
    }

    fn timeout(&self, _config: &ClientConfig) -> Duration {
        Self::TIMEOUT
    }

    fn format(&self) -> BodyFormat {
        BodyFormat::Text
    }

    fn decode(&self, payload: Payload) -> Result<Self::Response, ApiError> {
        let text = payload.into_text()?;
        let invalid = || ApiError::UnexpectedResponseObject(payload_preview(text.as_bytes()));

        let value = match serde_json::from_str::<Value>(&text).map_err(|_| invalid())? {
            Value::String(inner) => serde_json::from_str::<Value>(&inner).map_err(|_| invalid())?,
            other => other,
        };

        match value {
            Value::Object(map) => Ok(map),
            _ => Err(invalid()),
        }
    }
}
