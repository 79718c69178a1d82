// crates/cargowhale-client/tests/common/mod.rs
// ============================================================================
// Module: Common Test Utilities
// Description: Shared helpers for cargowhale-client integration tests.
// Purpose: Provide a recording transport, a recording metrics sink, and a
//          canned tiny_http server.
// Dependencies: cargowhale-client, tiny_http
// ============================================================================

//! ## Overview
//! Helpers shared by the gateway client integration tests.

#![allow(
    dead_code,
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::missing_panics_doc,
    reason = "Shared helpers are not used by every test binary."
)]

use std::collections::BTreeMap;
use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::Mutex;
use std::thread;
use std::thread::JoinHandle;

use cargowhale_client::GatewayMetricEvent;
use cargowhale_client::GatewayMetrics;
use cargowhale_client::HttpTransport;
use cargowhale_client::TransportError;
use tiny_http::Header;
use tiny_http::Response;
use tiny_http::Server;

// ============================================================================
// SECTION: Recording Transport
// ============================================================================

/// Transport that records requested URLs and replays queued replies.
#[derive(Default)]
pub struct RecordingTransport {
    /// URLs requested, in order.
    urls: Mutex<Vec<String>>,
    /// Replies handed out in order.
    replies: Mutex<VecDeque<Result<String, TransportError>>>,
}

impl RecordingTransport {
    /// Creates a transport with no queued replies.
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Queues a successful body.
    pub fn reply(&self, body: &str) {
        self.replies.lock().unwrap().push_back(Ok(body.to_string()));
    }

    /// Queues a transport failure.
    pub fn fail(&self, err: TransportError) {
        self.replies.lock().unwrap().push_back(Err(err));
    }

    /// Returns the URLs requested so far.
    pub fn urls(&self) -> Vec<String> {
        self.urls.lock().unwrap().clone()
    }
}

impl HttpTransport for RecordingTransport {
    fn get(&self, url: &str) -> Result<String, TransportError> {
        self.urls.lock().unwrap().push(url.to_string());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::Request("no queued reply".to_string())))
    }
}

// ============================================================================
// SECTION: Recording Metrics
// ============================================================================

/// Metrics sink that keeps every event.
#[derive(Default)]
pub struct RecordingMetrics {
    /// Recorded events.
    events: Mutex<Vec<GatewayMetricEvent>>,
}

impl RecordingMetrics {
    /// Returns the recorded events.
    pub fn events(&self) -> Vec<GatewayMetricEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl GatewayMetrics for RecordingMetrics {
    fn record_request(&self, event: &GatewayMetricEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}

// ============================================================================
// SECTION: Canned Server
// ============================================================================

/// Canned reply served by [`spawn_server`].
#[derive(Clone)]
pub struct CannedReply {
    /// Status code.
    pub status: u16,
    /// Content type header.
    pub content_type: &'static str,
    /// Response body.
    pub body: String,
}

impl CannedReply {
    /// JSON reply with status 200.
    pub fn json(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            content_type: "application/json",
            body: body.into(),
        }
    }

    /// Plain text reply with status 200.
    pub fn text(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            content_type: "text/plain",
            body: body.into(),
        }
    }
}

/// Running canned server.
pub struct CannedServer {
    /// Base URL (`http://127.0.0.1:port`).
    pub base: String,
    /// Raw request URLs (path and query) seen by the server.
    pub seen: Arc<Mutex<Vec<String>>>,
    /// Server thread.
    handle: JoinHandle<()>,
}

impl CannedServer {
    /// Waits for the server thread to finish and returns the seen URLs.
    pub fn finish(self) -> Vec<String> {
        self.handle.join().expect("server thread");
        self.seen.lock().unwrap().clone()
    }
}

/// Serves `requests` requests, answering by URL path (query ignored). Paths
/// without a reply get a 404.
pub fn spawn_server(routes: BTreeMap<String, CannedReply>, requests: usize) -> CannedServer {
    let server = Server::http("127.0.0.1:0").expect("http server");
    let base = format!("http://{}", server.server_addr());
    let seen = Arc::new(Mutex::new(Vec::new()));
    let seen_by_server = Arc::clone(&seen);
    let handle = thread::spawn(move || {
        for _ in 0 .. requests {
            let Ok(request) = server.recv() else {
                return;
            };
            let url = request.url().to_string();
            seen_by_server.lock().unwrap().push(url.clone());
            let path = url.split('?').next().unwrap_or_default().to_string();
            let reply = routes.get(&path).cloned().unwrap_or(CannedReply {
                status: 404,
                content_type: "application/json",
                body: r#"{"message":"not found"}"#.to_string(),
            });
            let response = Response::from_string(reply.body)
                .with_status_code(reply.status)
                .with_header(Header::from_bytes("Content-Type", reply.content_type).unwrap());
            // Clients may hang up early on rejected bodies.
            let _ = request.respond(response);
        }
    });
    CannedServer {
        base,
        seen,
        handle,
    }
}
