//! Fixtures and a scripted transport shared by the unit tests

use std::io::{Cursor, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use serde_json::{json, Value};

use crate::api::RequestSpec;
use crate::client::{ChinachuClient, RawResponse, Transport};
use crate::config::ClientConfig;
use crate::error::ApiError;

pub const START_MS: i64 = 1_705_320_000_000; // 2024-01-15 12:00:00 UTC

pub fn program_json(id: &str) -> Value {
    json!({
        "id": id,
        "category": "anime",
        "title": "Harekaze",
        "subTitle": "Departure",
        "fullTitle": "Harekaze [新]",
        "detail": "First episode",
        "episode": 1,
        "start": START_MS,
        "end": START_MS + 1_800_000,
        "seconds": 1800,
        "flags": ["新"],
        "channel": { "id": "GR_1024", "type": "GR", "channel": "27", "name": "NHK", "sid": 1024 }
    })
}

pub fn recording_json(id: &str) -> Value {
    let mut value = program_json(id);
    value["recorded"] = json!(format!("/recorded/{}.m2ts", id));
    value["tuner"] = json!({ "name": "PT3-T1", "command": "recpt1 <channel> - -", "isScrambling": false });
    value["command"] = json!("recpt1 27 - -");
    value
}

pub fn timer_json(id: &str, skip: bool, conflict: bool, manual: bool) -> Value {
    let mut value = program_json(id);
    value["isSkip"] = json!(skip);
    value["isConflict"] = json!(conflict);
    value["isManualReserved"] = json!(manual);
    value
}

pub fn config() -> ClientConfig {
    ClientConfig::new("http://chinachu.local:20772", "", "")
}

/// Reader that records whether anyone touched the body
pub struct TrackingReader {
    inner: Cursor<Vec<u8>>,
    touched: Arc<AtomicBool>,
}

impl Read for TrackingReader {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.touched.store(true, Ordering::SeqCst);
        self.inner.read(buf)
    }
}

/// Transport that answers every request with the same scripted response
pub struct ScriptedTransport {
    outcome: Result<(u16, Vec<u8>), ApiError>,
    requests: Mutex<Vec<RequestSpec>>,
    pub body_read: Arc<AtomicBool>,
}

impl ScriptedTransport {
    pub fn respond(status: u16, body: impl Into<Vec<u8>>) -> Arc<Self> {
        Arc::new(Self {
            outcome: Ok((status, body.into())),
            requests: Mutex::new(Vec::new()),
            body_read: Arc::new(AtomicBool::new(false)),
        })
    }

    pub fn json(status: u16, body: &Value) -> Arc<Self> {
        Self::respond(status, body.to_string())
    }

    pub fn failing(err: ApiError) -> Arc<Self> {
        Arc::new(Self {
            outcome: Err(err),
            requests: Mutex::new(Vec::new()),
            body_read: Arc::new(AtomicBool::new(false)),
        })
    }

    pub fn client(self: &Arc<Self>, config: ClientConfig) -> ChinachuClient {
        ChinachuClient::with_transport(config, self.clone())
    }

    pub fn requests(&self) -> Vec<RequestSpec> {
        self.requests.lock().unwrap().clone()
    }

    pub fn body_was_read(&self) -> bool {
        self.body_read.load(Ordering::SeqCst)
    }
}

impl Transport for ScriptedTransport {
    fn execute(&self, spec: &RequestSpec) -> Result<RawResponse, ApiError> {
        self.requests.lock().unwrap().push(spec.clone());
        let (status, body) = self.outcome.clone()?;
        Ok(RawResponse {
            status,
            content_length: Some(body.len() as u64),
            body: Box::new(TrackingReader {
                inner: Cursor::new(body),
                touched: Arc::clone(&self.body_read),
            }),
        })
    }
}

/// Canned reply for [`LoopbackServer`], optionally written in timed chunks
pub struct Reply {
    status: u16,
    body: Vec<u8>,
    chunk: usize,
    delay: Duration,
}

impl Reply {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        let body = body.into();
        Self {
            status,
            chunk: body.len().max(1),
            body,
            delay: Duration::ZERO,
        }
    }

    pub fn trickle(mut self, chunk: usize, delay: Duration) -> Self {
        self.chunk = chunk.max(1);
        self.delay = delay;
        self
    }
}

/// HTTP/1.1 server on 127.0.0.1 serving one reply per connection
pub struct LoopbackServer {
    pub address: String,
    heads: Arc<Mutex<Vec<String>>>,
    handle: Option<JoinHandle<()>>,
}

impl LoopbackServer {
    pub fn start(replies: Vec<Reply>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let address = format!("http://{}", listener.local_addr().unwrap());
        let heads = Arc::new(Mutex::new(Vec::new()));
        let recorded = Arc::clone(&heads);

        let handle = thread::spawn(move || {
            for reply in replies {
                let Ok((mut stream, _)) = listener.accept() else { return };
                recorded.lock().unwrap().push(read_head(&mut stream));
                let _ = write_reply(&mut stream, &reply);
            }
        });

        Self { address, heads, handle: Some(handle) }
    }

    pub fn config(&self) -> ClientConfig {
        ClientConfig::new(&self.address, "", "")
    }

    /// Request heads received so far, lowercased
    pub fn heads(&self) -> Vec<String> {
        self.heads.lock().unwrap().clone()
    }

    pub fn join(mut self) {
        if let Some(handle) = self.handle.take() {
            handle.join().unwrap();
        }
    }
}

fn read_head(stream: &mut TcpStream) -> String {
    let mut head = Vec::new();
    let mut buf = [0u8; 1024];
    while !head.windows(4).any(|w| w == b"\r\n\r\n") {
        match stream.read(&mut buf) {
            Ok(0) | Err(_) => break,
            Ok(n) => head.extend_from_slice(&buf[..n]),
        }
    }
    String::from_utf8_lossy(&head).to_lowercase()
}

fn write_reply(stream: &mut TcpStream, reply: &Reply) -> std::io::Result<()> {
    write!(
        stream,
        "HTTP/1.1 {} Status\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        reply.status,
        reply.body.len()
    )?;
    stream.flush()?;
    for piece in reply.body.chunks(reply.chunk) {
        thread::sleep(reply.delay);
        stream.write_all(piece)?;
        stream.flush()?;
    }
    Ok(())
}
