// MotionWatch: Export Server
//
// Single-connection HTTP responder. One client is accepted, read once,
// answered and closed before the next is accepted:
//
//   Listening -> AcceptedConnection -> RequestRead -> ResponseSent
//             -> ConnectionClosed -> Listening
//
// A request mentioning `GET /data` receives the current reading as JSON.
// Everything else, malformed or oversized requests included, receives the
// static status page with a 200.

use std::io::{self, Read, Write};
use std::net::{TcpListener, TcpStream, ToSocketAddrs};
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use crate::classifier::Classifier;
use crate::config::{ServeConfig, DATA_REQUEST_MARKER};
use crate::error::Error;
use crate::sample::ExportPayload;
use crate::sensor::{MotionBus, SensorSource};

pub const STATUS_PAGE: &str = include_str!("../assets/index.html");

const CONTENT_TYPE_JSON: &str = "application/json";
const CONTENT_TYPE_HTML: &str = "text/html";

// ---------------------------------------------------------------------------
// Transport
// ---------------------------------------------------------------------------

/// Source of client connections.
pub trait Listener {
    type Stream: Read + Write;

    /// Accept a pending client, or `Ok(None)` when nobody is waiting.
    /// Reads and writes on the returned stream give up after `io_timeout`.
    fn poll_accept(&mut self, io_timeout: Duration) -> io::Result<Option<(Self::Stream, String)>>;
}

impl Listener for TcpListener {
    type Stream = TcpStream;

    fn poll_accept(&mut self, io_timeout: Duration) -> io::Result<Option<(TcpStream, String)>> {
        match self.accept() {
            Ok((stream, peer)) => {
                // A zero timeout is rejected by the socket layer.
                let timeout = Some(io_timeout.max(Duration::from_millis(1)));
                stream.set_nonblocking(false)?;
                stream.set_read_timeout(timeout)?;
                stream.set_write_timeout(timeout)?;
                Ok(Some((stream, peer.to_string())))
            }
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => Ok(None),
            Err(e) => Err(e),
        }
    }
}

/// Bind a non-blocking listener so the serve loop can observe shutdown.
pub fn bind<A: ToSocketAddrs>(addr: A) -> Result<TcpListener, Error> {
    let listener = TcpListener::bind(addr).map_err(Error::Transport)?;
    listener.set_nonblocking(true).map_err(Error::Transport)?;
    Ok(listener)
}

// ---------------------------------------------------------------------------
// Routing
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Data,
    Page,
}

impl Route {
    pub fn of(request: &[u8]) -> Self {
        let marker = DATA_REQUEST_MARKER.as_bytes();
        if request.windows(marker.len()).any(|w| w == marker) {
            Self::Data
        } else {
            Self::Page
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub route: Route,
    pub content_type: &'static str,
    pub body: String,
}

impl Response {
    pub fn to_bytes(&self) -> Vec<u8> {
        format!(
            "HTTP/1.1 200 OK\r\nContent-Type: {}\r\n\r\n{}",
            self.content_type, self.body
        )
        .into_bytes()
    }
}

// ---------------------------------------------------------------------------
// Connection state machine
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerState {
    Listening,
    AcceptedConnection,
    RequestRead,
    ResponseSent,
    ConnectionClosed,
}

impl ServerState {
    /// Successor in the nominal cycle.
    pub fn next(self) -> Self {
        match self {
            Self::Listening => Self::AcceptedConnection,
            Self::AcceptedConnection => Self::RequestRead,
            Self::RequestRead => Self::ResponseSent,
            Self::ResponseSent => Self::ConnectionClosed,
            Self::ConnectionClosed => Self::Listening,
        }
    }
}

pub struct ExportServer<B, L> {
    source: SensorSource<B>,
    classifier: Classifier,
    listener: L,
    config: ServeConfig,
    state: ServerState,
    started: Instant,
    served: u64,
}

impl<B: MotionBus, L: Listener> ExportServer<B, L> {
    pub fn new(source: SensorSource<B>, listener: L, config: ServeConfig) -> Self {
        Self {
            source,
            classifier: Classifier::default(),
            listener,
            config,
            state: ServerState::Listening,
            started: Instant::now(),
            served: 0,
        }
    }

    pub fn with_classifier(mut self, classifier: Classifier) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn state(&self) -> ServerState {
        self.state
    }

    /// Responses written in full so far. Clients dropped before the
    /// response went out are not counted.
    pub fn served(&self) -> u64 {
        self.served
    }

    /// Build the response for one request. A `/data` request performs one
    /// sensor read; a failed read is fatal.
    pub fn respond(&mut self, request: &[u8]) -> Result<Response, Error> {
        match Route::of(request) {
            Route::Data => {
                let timestamp = self.started.elapsed().as_millis() as u64;
                let sample = self.source.read(timestamp)?;
                let activity = self.classifier.classify(&sample);
                let payload = ExportPayload::new(&sample, activity);
                let body = serde_json::to_string(&payload)
                    .map_err(|e| Error::Transport(e.into()))?;
                Ok(Response {
                    route: Route::Data,
                    content_type: CONTENT_TYPE_JSON,
                    body,
                })
            }
            Route::Page => Ok(Response {
                route: Route::Page,
                content_type: CONTENT_TYPE_HTML,
                body: STATUS_PAGE.to_owned(),
            }),
        }
    }

    /// Handle one pending client, if any. Returns whether a client was
    /// accepted, whether or not it got a response.
    pub fn poll(&mut self) -> Result<bool, Error> {
        let accepted = match self.listener.poll_accept(self.config.request_timeout) {
            Ok(accepted) => accepted,
            Err(e) if is_transient(&e) => {
                log::warn!("Accept failed: {}", e);
                None
            }
            Err(e) => return Err(Error::Transport(e)),
        };

        let Some((stream, peer)) = accepted else {
            return Ok(false);
        };

        self.advance(ServerState::AcceptedConnection);
        log::info!("Client connected from {}", peer);
        let result = self.handle(stream);
        self.advance(ServerState::ConnectionClosed);
        self.advance(ServerState::Listening);
        if result? {
            self.served += 1;
        }
        Ok(true)
    }

    /// Serve until `shutdown` is raised. Checked between accept polls.
    pub fn run(&mut self, shutdown: &AtomicBool) -> Result<(), Error> {
        log::info!("Export server listening");
        while !shutdown.load(Ordering::Relaxed) {
            if !self.poll()? {
                thread::sleep(self.config.accept_poll_interval);
            }
        }
        log::info!("Export server stopped after {} responses", self.served);
        Ok(())
    }

    /// Read, answer and drop one client. `Ok(false)` when the client was
    /// dropped before the response was written.
    fn handle(&mut self, mut stream: L::Stream) -> Result<bool, Error> {
        let mut buf = vec![0u8; self.config.request_buffer_size];
        let len = match stream.read(&mut buf) {
            Ok(len) => len,
            Err(e) if is_timeout(&e) => {
                log::warn!("Client sent nothing within {:?}, dropping", self.config.request_timeout);
                return Ok(false);
            }
            Err(e) => {
                log::warn!("Request read failed: {}", e);
                return Ok(false);
            }
        };
        self.advance(ServerState::RequestRead);

        let request = &buf[..len];
        log::info!("Request: {}", request_line(request));

        let response = self.respond(request)?;
        if let Err(e) = stream
            .write_all(&response.to_bytes())
            .and_then(|()| stream.flush())
        {
            log::warn!("Response write failed: {}", e);
            return Ok(false);
        }
        self.advance(ServerState::ResponseSent);
        Ok(true)
    }

    fn advance(&mut self, next: ServerState) {
        log::trace!("{:?} -> {:?}", self.state, next);
        self.state = next;
    }
}

fn is_transient(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::Interrupted | io::ErrorKind::ConnectionAborted | io::ErrorKind::ConnectionReset
    )
}

fn is_timeout(e: &io::Error) -> bool {
    matches!(e.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut)
}

fn request_line(request: &[u8]) -> String {
    let line = request.split(|&b| b == b'\n').next().unwrap_or_default();
    String::from_utf8_lossy(line).trim_end().to_owned()
}
