//! `std::net` implementation of the network backend traits.

use std::io::{Read, Write};
use std::net::{Ipv4Addr, SocketAddr, TcpListener, TcpStream};

use oxcli_types::backend::{NetworkBackend, NetworkStream};
use oxcli_types::error::{CliError, Result};

/// Non-blocking TCP backend bound to the loopback interface.
#[derive(Default)]
pub struct StdNetworkBackend {
    listener: Option<TcpListener>,
}

impl StdNetworkBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl NetworkBackend for StdNetworkBackend {
    fn listen(&mut self, port: u16) -> Result<()> {
        let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, port))
            .map_err(|e| CliError::Startup(format!("listen on port {port}: {e}")))?;
        listener.set_nonblocking(true)?;
        log::info!("listening on {}", listener.local_addr()?);
        self.listener = Some(listener);
        Ok(())
    }

    fn accept(&mut self) -> Result<Option<Box<dyn NetworkStream>>> {
        let listener = self
            .listener
            .as_ref()
            .ok_or_else(|| CliError::Startup("backend is not listening".to_string()))?;
        match listener.accept() {
            Ok((stream, peer)) => {
                stream.set_nonblocking(true)?;
                Ok(Some(Box::new(StdNetworkStream {
                    stream,
                    peer: Some(peer),
                })))
            },
            Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn local_addr(&self) -> Option<SocketAddr> {
        self.listener.as_ref().and_then(|l| l.local_addr().ok())
    }

    fn shutdown(&mut self) {
        self.listener = None;
    }
}

/// A connected TCP client.
pub struct StdNetworkStream {
    stream: TcpStream,
    peer: Option<SocketAddr>,
}

impl NetworkStream for StdNetworkStream {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        Ok(self.stream.read(buf)?)
    }

    /// Non-blocking: a full socket buffer surfaces as `WouldBlock`, and
    /// the count may be short.
    fn write(&mut self, data: &[u8]) -> Result<usize> {
        Ok(self.stream.write(data)?)
    }

    fn close(&mut self) -> Result<()> {
        match self.stream.shutdown(std::net::Shutdown::Both) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotConnected => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn peer_addr(&self) -> Option<SocketAddr> {
        self.peer
    }
}
