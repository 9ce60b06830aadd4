//! Network backend traits.
//!
//! The remote session runs on top of these so the listener can be driven
//! by a real socket backend or by an in-memory one in tests.

use std::net::SocketAddr;

use crate::error::Result;

/// Listening side of a TCP transport.
pub trait NetworkBackend {
    /// Start listening for incoming connections on the given port.
    fn listen(&mut self, port: u16) -> Result<()>;

    /// Accept a pending connection. Returns `None` if no connection waiting.
    fn accept(&mut self) -> Result<Option<Box<dyn NetworkStream>>>;

    /// Local address of the listening socket, once listening.
    fn local_addr(&self) -> Option<SocketAddr>;

    /// Stop listening and release the socket.
    fn shutdown(&mut self);
}

/// A bidirectional byte stream (TCP connection).
pub trait NetworkStream: Send {
    /// Non-blocking read. `WouldBlock` surfaces as an `Io` error.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize>;
    /// Non-blocking write. May take fewer bytes than offered; a full
    /// send buffer surfaces as a `WouldBlock` `Io` error.
    fn write(&mut self, data: &[u8]) -> Result<usize>;
    fn close(&mut self) -> Result<()>;
    /// Address of the remote peer.
    fn peer_addr(&self) -> Option<SocketAddr>;
}
