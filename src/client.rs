//! Chinachu API client
//!
//! Requests are built from the client's configuration snapshot, dispatched
//! through a [`Transport`] and decoded by the request type. [`ChinachuClient::send`]
//! runs the whole exchange on a worker thread.

use std::io::Read;
use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crate::api::{ApiRequest, BodyFormat, Method, Payload, RequestSpec};
use crate::config::ClientConfig;
use crate::error::ApiError;

/// Response head plus an unread body
pub struct RawResponse {
    pub status: u16,
    pub content_length: Option<u64>,
    pub body: Box<dyn Read>,
}

impl RawResponse {
    pub fn is_accepted(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn read_body(mut self) -> Result<Vec<u8>, ApiError> {
        let mut bytes = Vec::new();
        self.body.read_to_end(&mut bytes)?;
        Ok(bytes)
    }
}

pub trait Transport: Send + Sync {
    fn execute(&self, spec: &RequestSpec) -> Result<RawResponse, ApiError>;
}

/// HTTP transport over a shared ureq agent
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    pub fn new() -> Self {
        let agent = ureq::Agent::config_builder()
            // Status codes are classified by the client, not raised by ureq
            .http_status_as_error(false)
            .max_idle_connections(4)
            .max_idle_connections_per_host(2)
            .build()
            .new_agent();
        Self { agent }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

/// The request timeout bounds each wait on the server. Buffered bodies also get it
/// as a read deadline; binary media streams for as long as data keeps arriving.
fn prepare<B>(builder: ureq::RequestBuilder<B>, spec: &RequestSpec) -> ureq::RequestBuilder<B> {
    let timeout = Some(spec.timeout);
    let body_timeout = match spec.format {
        BodyFormat::Binary => None,
        _ => timeout,
    };
    let mut builder = builder
        .config()
        .timeout_resolve(timeout)
        .timeout_connect(timeout)
        .timeout_send_request(timeout)
        .timeout_recv_response(timeout)
        .timeout_recv_body(body_timeout)
        .build();
    for (name, value) in &spec.headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
}

impl Transport for UreqTransport {
    fn execute(&self, spec: &RequestSpec) -> Result<RawResponse, ApiError> {
        let url = spec.url.as_str();
        let response = match spec.method {
            Method::Get => prepare(self.agent.get(url), spec).call()?,
            Method::Delete => prepare(self.agent.delete(url), spec).call()?,
            Method::Put => prepare(self.agent.put(url), spec).send_empty()?,
        };

        let status = response.status().as_u16();
        let content_length = response
            .headers()
            .get("Content-Length")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse().ok());

        Ok(RawResponse {
            status,
            content_length,
            body: Box::new(response.into_body().into_reader()),
        })
    }
}

#[derive(Clone)]
pub struct ChinachuClient {
    config: Arc<ClientConfig>,
    transport: Arc<dyn Transport>,
}

impl ChinachuClient {
    pub fn new(config: ClientConfig) -> Self {
        Self::with_transport(config, Arc::new(UreqTransport::new()))
    }

    pub fn with_transport(config: ClientConfig, transport: Arc<dyn Transport>) -> Self {
        Self {
            config: Arc::new(config),
            transport,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// New client sharing the transport; requests already built keep the old snapshot
    pub fn with_config(&self, config: ClientConfig) -> Self {
        Self {
            config: Arc::new(config),
            transport: Arc::clone(&self.transport),
        }
    }

    /// Dispatch a built request and reject statuses outside 2xx before any body is read
    pub fn open(&self, spec: &RequestSpec) -> Result<RawResponse, ApiError> {
        tracing::debug!(
            method = %spec.method,
            endpoint = spec.endpoint(),
            timeout_ms = spec.timeout.as_millis() as u64,
            "Dispatching request"
        );

        let response = self.transport.execute(spec).map_err(|e| {
            tracing::warn!(endpoint = spec.endpoint(), "Request failed: {}", e);
            e
        })?;

        tracing::debug!(endpoint = spec.endpoint(), status = response.status, "Response received");
        if !response.is_accepted() {
            tracing::warn!(endpoint = spec.endpoint(), status = response.status, "HTTP status code out of range");
            return Err(ApiError::UnacceptableStatusCode(response.status));
        }
        Ok(response)
    }

    /// Blocking request/response round trip
    pub fn execute<R: ApiRequest>(&self, request: &R) -> Result<R::Response, ApiError> {
        let spec = request.build(&self.config)?;
        self.execute_spec(request, &spec)
    }

    fn execute_spec<R: ApiRequest>(&self, request: &R, spec: &RequestSpec) -> Result<R::Response, ApiError> {
        let response = self.open(spec)?;
        let payload = match spec.format {
            BodyFormat::Ignore => Payload::Empty,
            format => Payload::parse(format, response.read_body()?)?,
        };
        request.decode(payload)
    }

    /// Run the request on a worker thread and hand the result to `handler` there
    ///
    /// The request is built before the thread starts, so later configuration
    /// changes never reach it.
    pub fn send<R, F>(&self, request: R, handler: F) -> JoinHandle<()>
    where
        R: ApiRequest + Send + 'static,
        F: FnOnce(Result<R::Response, ApiError>) + Send + 'static,
    {
        let spec = request.build(&self.config);
        let client = self.clone();
        thread::spawn(move || {
            let result = spec.and_then(|spec| client.execute_spec(&request, &spec));
            handler(result)
        })
    }

    /// Like [`send`](Self::send), delivering the result over a channel
    pub fn send_to<R>(&self, request: R, sender: Sender<Result<R::Response, ApiError>>) -> JoinHandle<()>
    where
        R: ApiRequest + Send + 'static,
        R::Response: Send + 'static,
    {
        self.send(request, move |result| {
            // Receiver may have gone away; nothing else to do with the result
            let _ = sender.send(result);
        })
    }
}
