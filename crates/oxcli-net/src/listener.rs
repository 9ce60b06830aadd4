//! Single-client session listener.
//!
//! Accepts one TCP client at a time and splits its input into lines.
//! While a client is connected, further connections receive a notice
//! naming the active client and are closed. Designed for non-blocking
//! polling from the main loop.

use oxcli_types::backend::{NetworkBackend, NetworkStream};
use oxcli_types::error::{CliError, Result};

/// Maximum bytes buffered for a single input line.
const MAX_LINE_LEN: usize = 4096;

/// Unsent output allowed to pile up before the client is dropped.
const MAX_PENDING_OUTPUT: usize = 64 * 1024;

/// Something that happened on the session since the last poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// A client connected; carries its `ip:port`.
    Connected(String),
    /// One complete input line, end-of-line stripped.
    Line(String),
    /// The client sent a line longer than the limit. The line is dropped
    /// up to its end.
    Overlong,
    /// The client went away.
    Disconnected,
}

struct ActiveClient {
    stream: Box<dyn NetworkStream>,
    addr: String,
    /// Accumulates partial line data between polls.
    read_buf: Vec<u8>,
    /// Dropping input until the next line end.
    discarding: bool,
    /// The last byte seen was `\r`, so a leading `\n` belongs to it.
    pending_cr: bool,
    /// Output the socket has not taken yet.
    write_buf: Vec<u8>,
}

impl ActiveClient {
    fn new(stream: Box<dyn NetworkStream>, addr: String) -> Self {
        Self {
            stream,
            addr,
            read_buf: Vec::with_capacity(256),
            discarding: false,
            pending_cr: false,
            write_buf: Vec::new(),
        }
    }

    /// Split freshly read bytes into events. Any run of `\r` and `\n`
    /// ends a line, including a `\r\n` pair split across reads.
    fn ingest(&mut self, data: &[u8], events: &mut Vec<SessionEvent>) {
        let mut in_eol = std::mem::take(&mut self.pending_cr);
        for &b in data {
            if b == b'\r' || b == b'\n' {
                if in_eol {
                    continue;
                }
                in_eol = true;
                if self.discarding {
                    self.discarding = false;
                } else {
                    let line = String::from_utf8_lossy(&self.read_buf).into_owned();
                    self.read_buf.clear();
                    events.push(SessionEvent::Line(line));
                }
                continue;
            }
            in_eol = false;
            if self.discarding {
                continue;
            }
            if self.read_buf.len() >= MAX_LINE_LEN {
                log::warn!("client {} sent an overlong line, discarding", self.addr);
                self.read_buf.clear();
                self.discarding = true;
                events.push(SessionEvent::Overlong);
                continue;
            }
            self.read_buf.push(b);
        }
        self.pending_cr = in_eol && data.last() == Some(&b'\r');
    }

    /// Hand as much queued output to the socket as it takes without
    /// blocking.
    fn flush(&mut self) -> Result<()> {
        while !self.write_buf.is_empty() {
            match self.stream.write(&self.write_buf) {
                Ok(0) => return Err(CliError::Io(std::io::ErrorKind::WriteZero.into())),
                Ok(n) => {
                    self.write_buf.drain(..n);
                },
                Err(CliError::Io(ref e)) if e.kind() == std::io::ErrorKind::WouldBlock => break,
                Err(e) => return Err(e),
            }
        }
        if self.write_buf.len() > MAX_PENDING_OUTPUT {
            return Err(CliError::Io(std::io::Error::other(format!(
                "client {} is not reading output",
                self.addr
            ))));
        }
        Ok(())
    }

    fn close(mut self) {
        if let Err(e) = self.flush() {
            log::debug!("client {}: unsent output dropped: {e}", self.addr);
        }
        let _ = self.stream.close();
    }
}

/// Listener that owns at most one client connection.
pub struct SessionListener {
    port: u16,
    client: Option<ActiveClient>,
    listening: bool,
}

impl SessionListener {
    pub fn new(port: u16) -> Self {
        Self {
            port,
            client: None,
            listening: false,
        }
    }

    /// Start listening on the configured port.
    pub fn start(&mut self, backend: &mut dyn NetworkBackend) -> Result<()> {
        backend.listen(self.port)?;
        self.listening = true;
        Ok(())
    }

    pub fn is_listening(&self) -> bool {
        self.listening
    }

    pub fn has_client(&self) -> bool {
        self.client.is_some()
    }

    /// `ip:port` of the connected client.
    pub fn client_addr(&self) -> Option<&str> {
        self.client.as_ref().map(|c| c.addr.as_str())
    }

    /// Accept pending connections and read available input.
    pub fn poll(&mut self, backend: &mut dyn NetworkBackend) -> Vec<SessionEvent> {
        let mut events = Vec::new();
        if !self.listening {
            return events;
        }

        loop {
            match backend.accept() {
                Ok(Some(stream)) => self.admit(stream, &mut events),
                Ok(None) => break,
                Err(e) => {
                    log::warn!("accept error: {e}");
                    break;
                },
            }
        }

        let Some(client) = self.client.as_mut() else {
            return events;
        };

        let mut closed = false;
        if let Err(e) = client.flush() {
            log::debug!("client {} write error: {e}", client.addr);
            closed = true;
        }
        while !closed {
            let mut buf = [0u8; 512];
            match client.stream.read(&mut buf) {
                Ok(0) => closed = true,
                Ok(n) => client.ingest(&buf[..n], &mut events),
                Err(CliError::Io(ref e)) if e.kind() == std::io::ErrorKind::WouldBlock => break,
                Err(e) => {
                    log::debug!("client {} read error: {e}", client.addr);
                    closed = true;
                },
            }
        }

        if closed {
            if let Some(mut gone) = self.client.take() {
                log::info!("client {} disconnected", gone.addr);
                let _ = gone.stream.close();
            }
            events.push(SessionEvent::Disconnected);
        }
        events
    }

    fn admit(&mut self, mut stream: Box<dyn NetworkStream>, events: &mut Vec<SessionEvent>) {
        let addr = stream
            .peer_addr()
            .map_or_else(|| "unknown".to_string(), |a| a.to_string());
        if let Some(active) = &self.client {
            log::info!("rejecting {addr}: session active from {}", active.addr);
            let notice = format!("Another session is active from {}\r\n", active.addr);
            let _ = stream.write(notice.as_bytes());
            let _ = stream.close();
            return;
        }
        log::info!("client {addr} connected");
        self.client = Some(ActiveClient::new(stream, addr.clone()));
        events.push(SessionEvent::Connected(addr));
    }

    /// Queue text for the connected client and write what the socket
    /// accepts now; the rest goes out on later polls. Without a client
    /// this is a no-op.
    pub fn send(&mut self, text: &str) -> Result<()> {
        if let Some(client) = self.client.as_mut() {
            client.write_buf.extend_from_slice(text.as_bytes());
            client.flush()?;
        }
        Ok(())
    }

    /// Drop the client connection, if any, after a last attempt to
    /// deliver queued output.
    pub fn disconnect(&mut self) {
        if let Some(client) = self.client.take() {
            client.close();
        }
    }

    /// Close the client and stop listening.
    pub fn stop(&mut self, backend: &mut dyn NetworkBackend) {
        self.disconnect();
        backend.shutdown();
        self.listening = false;
    }
}
