//! Session loops.
//!
//! Local mode reads from a [`LineEditor`] and writes to a stream. Remote
//! mode serves a single TCP client through a [`RemoteServer`], polled from
//! the main loop until the running flag is cleared.

use std::io::Write;
use std::time::Duration;

use oxcli_net::{SessionEvent, SessionListener};
use oxcli_types::backend::NetworkBackend;
use oxcli_types::error::{CliError, Result};

use crate::editor::{LineEditor, ReadResult};
use crate::interpreter::Cli;

/// Pause between polls of the remote listener.
const POLL_INTERVAL: Duration = Duration::from_millis(10);

impl<S> Cli<S> {
    /// `"<banner> v<version>"`, or `None` without a banner.
    pub fn banner_line(&self) -> Option<String> {
        self.config
            .banner
            .as_ref()
            .map(|b| format!("{b} v{}", self.config.version))
    }

    /// Interactive loop until `quit`, end of input, or the running flag
    /// is cleared from outside.
    pub fn run_local(&mut self, editor: &mut dyn LineEditor, out: &mut dyn Write) -> Result<()> {
        if let Some(banner) = self.banner_line() {
            writeln!(out, "{banner}")?;
        }
        writeln!(out, "Type 'help' for commands, TAB for completion.")?;
        out.flush()?;

        while self.is_running() {
            editor.set_completion(self.grammar(), self.session.context.full_command(""));
            let prompt = self.prompt().to_string();
            let line = match editor.read_line(&prompt)? {
                ReadResult::Line(line) => line,
                ReadResult::Interrupted => continue,
                ReadResult::Eof => break,
            };
            if !line.trim().is_empty() {
                editor.add_history(&line);
            }
            let text = self.process_line(&line);
            if !text.is_empty() {
                out.write_all(text.as_bytes())?;
                out.flush()?;
            }
        }
        log::info!("local session ended");
        Ok(())
    }

    /// Serve remote clients on the configured port until the running flag
    /// is cleared.
    pub fn run_remote(&mut self, backend: &mut dyn NetworkBackend) -> Result<()> {
        let port = self
            .config
            .tcp_port
            .ok_or_else(|| CliError::Config("remote mode needs tcp_port".into()))?;
        let mut server = RemoteServer::start(port, backend)?;
        log::info!("listening on port {port}");
        while self.is_running() {
            server.poll(self, backend);
            std::thread::sleep(POLL_INTERVAL);
        }
        // Deliver whatever the last command produced before closing.
        server.poll(self, backend);
        server.stop(backend);
        log::info!("remote server stopped");
        Ok(())
    }

    /// Clear the running flag and reset the context stack.
    pub fn shutdown(&mut self) {
        self.request_exit();
        self.exit_all();
    }
}

/// Remote session front end: one client, lines in, output and prompt out.
pub struct RemoteServer {
    listener: SessionListener,
}

impl RemoteServer {
    pub fn start(port: u16, backend: &mut dyn NetworkBackend) -> Result<Self> {
        let mut listener = SessionListener::new(port);
        listener
            .start(backend)
            .map_err(|e| CliError::Startup(format!("listen on port {port}: {e}")))?;
        Ok(Self { listener })
    }

    pub fn has_client(&self) -> bool {
        self.listener.has_client()
    }

    pub fn client_addr(&self) -> Option<&str> {
        self.listener.client_addr()
    }

    /// Accept connections, run every complete line, and send the replies.
    pub fn poll<S>(&mut self, cli: &mut Cli<S>, backend: &mut dyn NetworkBackend) {
        for event in self.listener.poll(backend) {
            let reply = match event {
                SessionEvent::Connected(addr) => {
                    log::info!("remote session opened from {addr}");
                    cli.exit_all();
                    let mut greeting = String::new();
                    if let Some(banner) = cli.banner_line() {
                        greeting.push_str(&banner);
                        greeting.push_str("\r\n");
                    }
                    greeting.push_str(cli.prompt());
                    greeting
                },
                SessionEvent::Line(line) => {
                    log::debug!("remote> {line}");
                    let mut reply = crlf(&cli.process_line(&line));
                    if cli.is_running() {
                        reply.push_str(cli.prompt());
                    }
                    reply
                },
                SessionEvent::Overlong => format!("Error: line too long\r\n{}", cli.prompt()),
                SessionEvent::Disconnected => {
                    cli.exit_all();
                    continue;
                },
            };
            if let Err(e) = self.listener.send(&reply) {
                log::warn!("send to remote client failed: {e}");
                self.listener.disconnect();
                cli.exit_all();
                break;
            }
        }
    }

    pub fn stop(&mut self, backend: &mut dyn NetworkBackend) {
        self.listener.stop(backend);
    }
}

/// Line ends for a network terminal.
fn crlf(text: &str) -> String {
    if !text.contains('\n') {
        return text.to_string();
    }
    let mut out = String::with_capacity(text.len() + 8);
    for (i, line) in text.split('\n').enumerate() {
        if i > 0 {
            out.push_str("\r\n");
        }
        out.push_str(line.strip_suffix('\r').unwrap_or(line));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crlf_converts_bare_newlines() {
        assert_eq!(crlf("a\nb\n"), "a\r\nb\r\n");
    }

    #[test]
    fn crlf_keeps_existing_pairs() {
        assert_eq!(crlf("a\r\nb"), "a\r\nb");
    }

    #[test]
    fn crlf_without_newline_is_unchanged() {
        assert_eq!(crlf(""), "");
        assert_eq!(crlf("no newline"), "no newline");
    }
}
