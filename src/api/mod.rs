//! Chinachu API request catalog
//!
//! Every server operation is a small request type implementing [`ApiRequest`].
//! A request knows its method, path, query and decoder; [`ApiRequest::build`]
//! turns it into a [`RequestSpec`] against a configuration snapshot.

mod media;
mod recording;
mod schedule;
mod status;
mod timer;

use std::collections::HashSet;
use std::fmt;
use std::time::Duration;

use base64::Engine;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use url::Url;

use crate::config::ClientConfig;
use crate::error::{payload_preview, ApiError};
use crate::models::Identified;

pub use media::{ChannelLogoRequest, PreviewImageRequest, StreamingMediaRequest};
pub use recording::{RecordingDeleteRequest, RecordingDetailRequest, RecordingFileInfoRequest, RecordingRequest};
pub use schedule::{GuideRequest, ProgramDetailRequest};
pub use status::StatusRequest;
pub use timer::{TimerAddRequest, TimerDeleteRequest, TimerItemRequest, TimerRequest, TimerSkipRequest, TimerUnskipRequest};

/// Untyped JSON object returned by action endpoints
pub type RawMap = Map<String, Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a response body is read before decoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyFormat {
    Json,
    Text,
    Image,
    Binary,
    /// Body is never read
    Ignore,
}

impl BodyFormat {
    pub fn accept(&self) -> Option<&'static str> {
        match self {
            BodyFormat::Json => Some("application/json"),
            BodyFormat::Text => Some("text/plain"),
            BodyFormat::Image => Some("image/png"),
            BodyFormat::Binary | BodyFormat::Ignore => None,
        }
    }
}

/// Response body after format parsing
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Json(Value),
    Text(String),
    Bytes(Vec<u8>),
    Empty,
}

impl Payload {
    pub fn parse(format: BodyFormat, bytes: Vec<u8>) -> Result<Self, ApiError> {
        match format {
            // Fragments are allowed: any JSON value is accepted at the top level
            BodyFormat::Json => serde_json::from_slice(&bytes)
                .map(Payload::Json)
                .map_err(|_| ApiError::UnexpectedResponseObject(payload_preview(&bytes))),
            BodyFormat::Text => String::from_utf8(bytes)
                .map(Payload::Text)
                .map_err(|e| ApiError::UnexpectedResponseObject(payload_preview(e.as_bytes()))),
            BodyFormat::Image | BodyFormat::Binary => Ok(Payload::Bytes(bytes)),
            BodyFormat::Ignore => Ok(Payload::Empty),
        }
    }

    pub fn into_json(self) -> Result<Value, ApiError> {
        match self {
            Payload::Json(value) => Ok(value),
            other => Err(unexpected(&other)),
        }
    }

    pub fn into_text(self) -> Result<String, ApiError> {
        match self {
            Payload::Text(text) => Ok(text),
            other => Err(unexpected(&other)),
        }
    }

    pub fn into_bytes(self) -> Result<Vec<u8>, ApiError> {
        match self {
            Payload::Bytes(bytes) => Ok(bytes),
            other => Err(unexpected(&other)),
        }
    }
}

fn unexpected(payload: &Payload) -> ApiError {
    let kind = match payload {
        Payload::Json(_) => "json",
        Payload::Text(_) => "text",
        Payload::Bytes(_) => "bytes",
        Payload::Empty => "empty",
    };
    ApiError::UnexpectedResponseObject(format!("unexpected {} payload", kind))
}

/// Fully resolved HTTP request, ready for a transport
#[derive(Debug, Clone, PartialEq)]
pub struct RequestSpec {
    pub method: Method,
    pub url: Url,
    pub headers: Vec<(String, String)>,
    pub timeout: Duration,
    pub format: BodyFormat,
}

impl RequestSpec {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn query_pairs(&self) -> Vec<(String, String)> {
        self.url.query_pairs().into_owned().collect()
    }

    /// URL without the query string, for logging
    pub fn endpoint(&self) -> &str {
        &self.url[..url::Position::AfterPath]
    }
}

pub trait ApiRequest {
    type Response;

    fn method(&self) -> Method {
        Method::Get
    }

    /// Path relative to `<address>/api/`
    fn path(&self) -> String;

    /// Identifier embedded in the path, checked before building
    fn resource_id(&self) -> Option<&str> {
        None
    }

    fn query(&self, _config: &ClientConfig) -> Vec<(&'static str, String)> {
        Vec::new()
    }

    fn timeout(&self, config: &ClientConfig) -> Duration {
        config.request_timeout()
    }

    fn format(&self) -> BodyFormat {
        BodyFormat::Json
    }

    fn decode(&self, payload: Payload) -> Result<Self::Response, ApiError>;

    fn build(&self, config: &ClientConfig) -> Result<RequestSpec, ApiError> {
        build_spec(self, config)
    }
}

fn build_spec<R: ApiRequest + ?Sized>(request: &R, config: &ClientConfig) -> Result<RequestSpec, ApiError> {
    let base = api_base(config)?;

    if let Some(id) = request.resource_id() {
        if id.is_empty() || id.contains(['/', '\\', '?', '#']) {
            return Err(ApiError::UnexpectedRequest);
        }
    }

    let mut url = base.join(&request.path()).map_err(|_| ApiError::UnexpectedRequest)?;
    let query = request.query(config);
    if !query.is_empty() {
        let mut pairs = url.query_pairs_mut();
        for (key, value) in &query {
            pairs.append_pair(key, value);
        }
    }

    let format = request.format();
    let mut headers = Vec::new();
    if let Some(auth) = basic_auth(config) {
        headers.push(("Authorization".to_string(), auth));
    }
    if let Some(accept) = format.accept() {
        headers.push(("Accept".to_string(), accept.to_string()));
    }

    Ok(RequestSpec {
        method: request.method(),
        url,
        headers,
        timeout: request.timeout(config),
        format,
    })
}

fn api_base(config: &ClientConfig) -> Result<Url, ApiError> {
    let mut base = Url::parse(&config.normalized_address()).map_err(|_| ApiError::InvalidBaseUrl)?;
    if !matches!(base.scheme(), "http" | "https") || base.host_str().is_none() {
        return Err(ApiError::InvalidBaseUrl);
    }

    let path = format!("{}/api/", base.path().trim_end_matches('/'));
    base.set_path(&path);
    base.set_query(None);
    base.set_fragment(None);
    Ok(base)
}

/// No header at all for an empty username
pub fn basic_auth(config: &ClientConfig) -> Option<String> {
    if !config.has_credentials() {
        return None;
    }
    let token = base64::engine::general_purpose::STANDARD
        .encode(format!("{}:{}", config.username, config.password));
    Some(format!("Basic {}", token))
}

/// Items that are not objects, miss required fields or have an empty id are dropped,
/// as are later items repeating an id already seen
pub(crate) fn decode_collection<T>(value: Value, what: &str) -> Vec<T>
where
    T: DeserializeOwned + Identified,
{
    let Value::Array(items) = value else {
        tracing::warn!("Expected a list of {}, got another shape", what);
        return Vec::new();
    };

    let total = items.len();
    let mut seen = HashSet::new();
    let records: Vec<T> = items
        .into_iter()
        .filter_map(decode_item::<T>)
        .filter(|record| seen.insert(record.id().to_string()))
        .collect();
    if records.len() < total {
        tracing::warn!("Dropped {} malformed or duplicate {} of {}", total - records.len(), what, total);
    }
    records
}

pub(crate) fn decode_item<T>(value: Value) -> Option<T>
where
    T: DeserializeOwned + Identified,
{
    if !value.is_object() {
        return None;
    }
    serde_json::from_value::<T>(value)
        .ok()
        .filter(|record| !record.id().is_empty())
}

pub(crate) fn decode_map(value: Value) -> RawMap {
    match value {
        Value::Object(map) => map,
        _ => RawMap::new(),
    }
}
