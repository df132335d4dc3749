//! Recorded program endpoints

use super::{decode_collection, decode_item, decode_map, ApiRequest, BodyFormat, Method, Payload, RawMap};
use crate::error::ApiError;
use crate::models::Recording;

/// `GET recorded.json`
#[derive(Debug, Clone, Default)]
pub struct RecordingRequest;

impl ApiRequest for RecordingRequest {
    type Response = Vec<Recording>;

    fn path(&self) -> String {
        "recorded.json".to_string()
    }

    fn decode(&self, payload: Payload) -> Result<Self::Response, ApiError> {
        Ok(decode_collection(payload.into_json()?, "recordings"))
    }
}

/// `GET recorded/{id}.json`, `None` when the object does not map
#[derive(Debug, Clone)]
pub struct RecordingDetailRequest {
    pub id: String,
}

impl RecordingDetailRequest {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

impl ApiRequest for RecordingDetailRequest {
    type Response = Option<Recording>;

    fn path(&self) -> String {
        format!("recorded/{}.json", self.id)
    }

    fn resource_id(&self) -> Option<&str> {
        Some(&self.id)
    }

    fn decode(&self, payload: Payload) -> Result<Self::Response, ApiError> {
        Ok(decode_item(payload.into_json()?))
    }
}

/// `GET recorded/{id}/file.json`
#[derive(Debug, Clone)]
pub struct RecordingFileInfoRequest {
    pub id: String,
}

impl RecordingFileInfoRequest {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

impl ApiRequest for RecordingFileInfoRequest {
    type Response = RawMap;

    fn path(&self) -> String {
        format!("recorded/{}/file.json", self.id)
    }

    fn resource_id(&self) -> Option<&str> {
        Some(&self.id)
    }

    fn decode(&self, payload: Payload) -> Result<Self::Response, ApiError> {
        Ok(decode_map(payload.into_json()?))
    }
}

/// `DELETE recorded/{id}.json`; any accepted status is success
#[derive(Debug, Clone)]
pub struct RecordingDeleteRequest {
    pub id: String,
}

impl RecordingDeleteRequest {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

impl ApiRequest for RecordingDeleteRequest {
    type Response = bool;

    fn method(&self) -> Method {
        Method::Delete
    }

    fn path(&self) -> String {
        format!("recorded/{}.json", self.id)
    }

    fn resource_id(&self) -> Option<&str> {
        Some(&self.id)
    }

    fn format(&self) -> BodyFormat {
        BodyFormat::Ignore
    }

    fn decode(&self, _payload: Payload) -> Result<Self::Response, ApiError> {
        Ok(true)
    }
}
