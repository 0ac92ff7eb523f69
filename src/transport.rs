//! WebSocket transports.
//!
//! A transport is fire-and-forget from the caller's side: `open`, `send` and
//! `close` never block, and everything the socket does comes back later as a
//! [`TransportEvent`] drained by `poll_event` from the owning event loop.
//! The socket I/O itself lives on one worker thread per transport.

use std::fmt;
use std::io::{self, ErrorKind};
use std::net::{TcpStream, ToSocketAddrs};
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread;
use std::time::Duration;

use tracing::{debug, info, warn};
use tungstenite::stream::MaybeTlsStream;
use tungstenite::{Error as WsError, Message, WebSocket};

type Socket = WebSocket<MaybeTlsStream<TcpStream>>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    Opened,
    Message(String),
    Closed(Option<String>),
    Error(String),
}

pub trait Transport {
    /// Queues a text frame. Best effort; the outcome is never reported back.
    fn send(&mut self, frame: String);

    /// Next pending event, if any. Returns `None` forever after `close`.
    fn poll_event(&mut self) -> Option<TransportEvent>;

    /// Stops event delivery immediately and asks the socket to close.
    fn close(&mut self);
}

pub trait Connector {
    fn open(&mut self, endpoint: &Endpoint) -> Box<dyn Transport>;
}

/// A `ws://` or `wss://` address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub secure: bool,
    pub host: String,
    pub port: u16,
    pub path: String,
}

impl Endpoint {
    pub fn new(secure: bool, host: impl Into<String>, port: u16, path: impl Into<String>) -> Self {
        Self {
            secure,
            host: host.into(),
            port,
            path: path.into(),
        }
    }

    pub fn scheme(&self) -> &'static str {
        if self.secure {
            "wss"
        } else {
            "ws"
        }
    }

    pub fn url(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path = if self.path.starts_with('/') {
            self.path.clone()
        } else {
            format!("/{}", self.path)
        };
        write!(f, "{}://{}:{}{}", self.scheme(), self.host, self.port, path)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("could not resolve `{host}:{port}`")]
    Unresolved { host: String, port: u16 },
    #[error("failed to connect to {url}: {source}")]
    Connect {
        url: String,
        #[source]
        source: io::Error,
    },
    #[error("websocket handshake with {url} failed: {reason}")]
    Handshake { url: String, reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WsOptions {
    pub connect_timeout: Duration,
    pub idle_sleep: Duration,
}

impl Default for WsOptions {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(5),
            idle_sleep: Duration::from_millis(5),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct WsConnector {
    options: WsOptions,
}

impl WsConnector {
    pub fn new(options: WsOptions) -> Self {
        Self { options }
    }
}

impl Connector for WsConnector {
    fn open(&mut self, endpoint: &Endpoint) -> Box<dyn Transport> {
        Box::new(WsTransport::spawn(endpoint.clone(), self.options))
    }
}

enum Outbound {
    Text(String),
    Close,
}

pub struct WsTransport {
    url: String,
    outbound: Option<Sender<Outbound>>,
    events: Option<Receiver<TransportEvent>>,
}

impl WsTransport {
    pub fn spawn(endpoint: Endpoint, options: WsOptions) -> Self {
        let (events_tx, events_rx) = mpsc::channel::<TransportEvent>();
        let (outbound_tx, outbound_rx) = mpsc::channel::<Outbound>();
        let url = endpoint.url();
        debug!(url = %url, "opening websocket transport");
        thread::spawn(move || run_worker(endpoint, options, events_tx, outbound_rx));
        Self {
            url,
            outbound: Some(outbound_tx),
            events: Some(events_rx),
        }
    }
}

impl Transport for WsTransport {
    fn send(&mut self, frame: String) {
        if let Some(outbound) = self.outbound.as_ref() {
            let _ = outbound.send(Outbound::Text(frame));
        }
    }

    fn poll_event(&mut self) -> Option<TransportEvent> {
        let events = self.events.as_ref()?;
        match events.try_recv() {
            Ok(event) => Some(event),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                self.events = None;
                None
            }
        }
    }

    fn close(&mut self) {
        if let Some(outbound) = self.outbound.take() {
            let _ = outbound.send(Outbound::Close);
            debug!(url = %self.url, "closing websocket transport");
        }
        self.events = None;
    }
}

impl Drop for WsTransport {
    fn drop(&mut self) {
        self.close();
    }
}

fn run_worker(
    endpoint: Endpoint,
    options: WsOptions,
    events: Sender<TransportEvent>,
    outbound: Receiver<Outbound>,
) {
    let url = endpoint.url();
    let mut socket = match open_socket(&endpoint, options) {
        Ok(socket) => socket,
        Err(error) => {
            warn!(url = %url, %error, "websocket open failed");
            let _ = events.send(TransportEvent::Error(error.to_string()));
            return;
        }
    };
    info!(url = %url, "websocket connected");
    if events.send(TransportEvent::Opened).is_err() {
        shut_down(&mut socket);
        return;
    }

    loop {
        let mut progressed = false;

        loop {
            match socket.read() {
                Ok(Message::Text(text)) => {
                    progressed = true;
                    if events
                        .send(TransportEvent::Message(text.as_str().to_owned()))
                        .is_err()
                    {
                        shut_down(&mut socket);
                        return;
                    }
                }
                Ok(Message::Binary(bytes)) => {
                    progressed = true;
                    let text = String::from_utf8_lossy(&bytes).into_owned();
                    if events.send(TransportEvent::Message(text)).is_err() {
                        shut_down(&mut socket);
                        return;
                    }
                }
                Ok(Message::Close(frame)) => {
                    let reason = frame
                        .map(|frame| frame.reason.as_str().to_owned())
                        .filter(|reason| !reason.is_empty());
                    info!(url = %url, reason = ?reason, "websocket closed by peer");
                    let _ = socket.flush();
                    let _ = events.send(TransportEvent::Closed(reason));
                    return;
                }
                Ok(Message::Ping(_) | Message::Pong(_) | Message::Frame(_)) => {
                    progressed = true;
                }
                Err(WsError::Io(error)) if error.kind() == ErrorKind::WouldBlock => break,
                Err(WsError::ConnectionClosed | WsError::AlreadyClosed) => {
                    let _ = events.send(TransportEvent::Closed(None));
                    return;
                }
                Err(error) => {
                    warn!(url = %url, %error, "websocket read failed");
                    let _ = events.send(TransportEvent::Error(error.to_string()));
                    return;
                }
            }
        }

        loop {
            match outbound.try_recv() {
                Ok(Outbound::Text(frame)) => {
                    progressed = true;
                    if let Err(error) = queue_frame(&mut socket, frame) {
                        warn!(url = %url, %error, "websocket send failed");
                        let _ = events.send(TransportEvent::Error(error.to_string()));
                        return;
                    }
                }
                Ok(Outbound::Close) | Err(TryRecvError::Disconnected) => {
                    shut_down(&mut socket);
                    return;
                }
                Err(TryRecvError::Empty) => break,
            }
        }

        if let Err(error) = flush_pending(&mut socket) {
            let _ = events.send(TransportEvent::Error(error.to_string()));
            return;
        }

        if !progressed {
            thread::sleep(options.idle_sleep);
        }
    }
}

fn open_socket(endpoint: &Endpoint, options: WsOptions) -> Result<Socket, TransportError> {
    let url = endpoint.url();
    let addr = (endpoint.host.as_str(), endpoint.port)
        .to_socket_addrs()
        .map_err(|source| TransportError::Connect {
            url: url.clone(),
            source,
        })?
        .next()
        .ok_or_else(|| TransportError::Unresolved {
            host: endpoint.host.clone(),
            port: endpoint.port,
        })?;
    let stream = TcpStream::connect_timeout(&addr, options.connect_timeout).map_err(|source| {
        TransportError::Connect {
            url: url.clone(),
            source,
        }
    })?;
    let configure = |stream: &TcpStream| -> io::Result<()> {
        stream.set_nodelay(true)?;
        stream.set_read_timeout(Some(options.connect_timeout))
    };
    configure(&stream).map_err(|source| TransportError::Connect {
        url: url.clone(),
        source,
    })?;

    // `wss` endpoints get a rustls session here; `ws` stays plain.
    let (socket, _response) =
        tungstenite::client_tls(url.as_str(), stream).map_err(|error| {
            TransportError::Handshake {
                url: url.clone(),
                reason: error.to_string(),
            }
        })?;
    if let Some(tcp) = tcp_stream(&socket) {
        tcp.set_nonblocking(true)
            .map_err(|source| TransportError::Connect { url, source })?;
    }
    Ok(socket)
}

fn tcp_stream(socket: &Socket) -> Option<&TcpStream> {
    match socket.get_ref() {
        MaybeTlsStream::Plain(stream) => Some(stream),
        MaybeTlsStream::Rustls(stream) => Some(stream.get_ref()),
        _ => None,
    }
}

fn queue_frame(socket: &mut Socket, frame: String) -> Result<(), WsError> {
    // On WouldBlock the frame is already buffered and goes out with the next flush.
    match socket.write(Message::text(frame)) {
        Ok(()) => Ok(()),
        Err(WsError::Io(error)) if error.kind() == ErrorKind::WouldBlock => Ok(()),
        Err(error) => Err(error),
    }
}

fn flush_pending(socket: &mut Socket) -> Result<(), WsError> {
    match socket.flush() {
        Ok(()) => Ok(()),
        Err(WsError::Io(error)) if error.kind() == ErrorKind::WouldBlock => Ok(()),
        Err(error) => Err(error),
    }
}

fn shut_down(socket: &mut Socket) {
    let _ = socket.close(None);
    let _ = socket.flush();
}
