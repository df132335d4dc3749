//! Reservation (timer) endpoints

use super::{decode_collection, decode_item, decode_map, ApiRequest, Method, Payload, RawMap};
use crate::error::ApiError;
use crate::models::Timer;

/// `GET reserves.json`
#[derive(Debug, Clone, Default)]
pub struct TimerRequest;

impl ApiRequest for TimerRequest {
    type Response = Vec<Timer>;

    fn path(&self) -> String {
        "reserves.json".to_string()
    }

    fn decode(&self, payload: Payload) -> Result<Self::Response, ApiError> {
        Ok(decode_collection(payload.into_json()?, "timers"))
    }
}

/// `GET reserves/{id}.json`
#[derive(Debug, Clone)]
pub struct TimerItemRequest {
    pub id: String,
}

impl TimerItemRequest {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

impl ApiRequest for TimerItemRequest {
    type Response = Option<Timer>;

    fn path(&self) -> String {
        format!("reserves/{}.json", self.id)
    }

    fn resource_id(&self) -> Option<&str> {
        Some(&self.id)
    }

    fn decode(&self, payload: Payload) -> Result<Self::Response, ApiError> {
        Ok(decode_item(payload.into_json()?))
    }
}

/// `PUT reserves/{id}/skip.json`
#[derive(Debug, Clone)]
pub struct TimerSkipRequest {
    pub id: String,
}

impl TimerSkipRequest {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

impl ApiRequest for TimerSkipRequest {
    type Response = RawMap;

    fn method(&self) -> Method {
        Method::Put
    }

    fn path(&self) -> String {
        format!("reserves/{}/skip.json", self.id)
    }

    fn resource_id(&self) -> Option<&str> {
        Some(&self.id)
    }

    fn decode(&self, payload: Payload) -> Result<Self::Response, ApiError> {
        Ok(decode_map(payload.into_json()?))
    }
}

/// `PUT reserves/{id}/unskip.json`
#[derive(Debug, Clone)]
pub struct TimerUnskipRequest {
    pub id: String,
}

impl TimerUnskipRequest {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

impl ApiRequest for TimerUnskipRequest {
    type Response = RawMap;

    fn method(&self) -> Method {
        Method::Put
    }

    fn path(&self) -> String {
        format!("reserves/{}/unskip.json", self.id)
    }

    fn resource_id(&self) -> Option<&str> {
        Some(&self.id)
    }

    fn decode(&self, payload: Payload) -> Result<Self::Response, ApiError> {
        Ok(decode_map(payload.into_json()?))
    }
}

/// `PUT program/{id}.json`: manual reservation of a program
#[derive(Debug, Clone)]
pub struct TimerAddRequest {
    pub program_id: String,
}

impl TimerAddRequest {
    pub fn new(program_id: impl Into<String>) -> Self {
        Self { program_id: program_id.into() }
    }
}

impl ApiRequest for TimerAddRequest {
    type Response = RawMap;

    fn method(&self) -> Method {
        Method::Put
    }

    fn path(&self) -> String {
        format!("program/{}.json", self.program_id)
    }

    fn resource_id(&self) -> Option<&str> {
        Some(&self.program_id)
    }

    fn decode(&self, payload: Payload) -> Result<Self::Response, ApiError> {
        Ok(decode_map(payload.into_json()?))
    }
}

/// `DELETE reserves/{id}.json`
#[derive(Debug, Clone)]
pub struct TimerDeleteRequest {
    pub id: String,
}

impl TimerDeleteRequest {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

impl ApiRequest for TimerDeleteRequest {
    type Response = RawMap;

    fn method(&self) -> Method {
        Method::Delete
    }

    fn path(&self) -> String {
        format!("reserves/{}.json", self.id)
    }

    fn resource_id(&self) -> Option<&str> {
        Some(&self.id)
    }

    fn decode(&self, payload: Payload) -> Result<Self::Response, ApiError> {
        Ok(decode_map(payload.into_json()?))
    }
}
