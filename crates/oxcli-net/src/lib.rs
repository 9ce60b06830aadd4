//! Networking for oxcli: a `std::net` backend and the single-client
//! session listener used by remote mode.

mod listener;
mod std_backend;

/// Single-client listener and its poll events.
pub use listener::{SessionEvent, SessionListener};
/// `std::net` backend and stream.
pub use std_backend::{StdNetworkBackend, StdNetworkStream};

#[cfg(test)]
mod tests;
