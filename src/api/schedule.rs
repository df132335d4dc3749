//! Program guide endpoints

use serde_json::Value;

use super::{decode_collection, decode_item, ApiRequest, Payload};
use crate::error::ApiError;
use crate::models::{GuideEntry, Program};

/// `GET schedule.json`: programs grouped per channel
#[derive(Debug, Clone, Default)]
pub struct GuideRequest;

impl ApiRequest for GuideRequest {
    type Response = Vec<Vec<GuideEntry>>;

    fn path(&self) -> String {
        "schedule.json".to_string()
    }

    fn decode(&self, payload: Payload) -> Result<Self::Response, ApiError> {
        let Value::Array(channels) = payload.into_json()? else {
            tracing::warn!("Expected a list of channels in schedule");
            return Ok(Vec::new());
        };

        // Channels without a usable programs list collapse to empty groups and are dropped
        let groups = channels
            .into_iter()
            .map(|mut channel| match channel.get_mut("programs").map(Value::take) {
                Some(programs @ Value::Array(_)) => decode_collection(programs, "programs"),
                _ => Vec::new(),
            })
            .filter(|group: &Vec<GuideEntry>| !group.is_empty())
            .collect();
        Ok(groups)
    }
}

/// `GET program/{id}.json`
#[derive(Debug, Clone)]
pub struct ProgramDetailRequest {
    pub id: String,
}

impl ProgramDetailRequest {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

impl ApiRequest for ProgramDetailRequest {
    type Response = Option<Program>;

    fn path(&self) -> String {
        format!("program/{}.json", self.id)
    }

    fn resource_id(&self) -> Option<&str> {
        Some(&self.id)
    }

    fn decode(&self, payload: Payload) -> Result<Self::Response, ApiError> {
        Ok(decode_item(payload.into_json()?))
    }
}
