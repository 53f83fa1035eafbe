//! Transport connection management.
//!
//! [`TransportConnection`] owns one socket (plain TCP or TLS) and exchanges
//! CRLF-terminated lines with a server over it, blocking the caller for each
//! operation. Protocol grammars (SMTP, POP3, IMAP) live above this layer.

mod options;
mod stream;

pub use options::{DEFAULT_TIMEOUT, TransportOptions, TransportOptionsBuilder};
pub use stream::TransportStream;

use std::io::{self, Read, Write};

use crate::error::{Error, FailureCause, Result};

/// The line terminator sent after every line and required to complete a read.
pub const CRLF: &str = "\r\n";

/// Upper bound on a single read from the socket while assembling a line.
const READ_CHUNK: usize = 512;

/// A blocking, line-oriented connection to a mail server.
///
/// The connection is opened by [`connect`](Self::connect) and is live until
/// [`close`](Self::close) is called or a read/write fails. A failed read or
/// write releases the socket permanently; the object stays around only so the
/// caller can observe [`is_connected`](Self::is_connected) returning false,
/// and a fresh connection must be made to talk to the server again.
///
/// One connection serves one caller at a time; operations block and must be
/// issued sequentially. The connection is not internally synchronized.
/// Dropping the connection releases the socket, but callers that care about
/// orderly teardown should call [`close`](Self::close) explicitly.
#[derive(Debug)]
pub struct TransportConnection {
    /// The open stream, or `None` when the connection is closed or dead.
    stream: Option<TransportStream>,
    /// Bytes received beyond the line most recently returned.
    read_buf: Vec<u8>,
    options: TransportOptions,
}

impl TransportConnection {
    /// Opens a connection to `server:port`.
    ///
    /// The connect attempt, and with `options.tls()` the TLS handshake, are
    /// bounded by `options.timeout()`; the same timeout then bounds each
    /// read and write for the lifetime of the connection. Construction is
    /// atomic: on any failure no connection object is returned.
    ///
    /// # Errors
    ///
    /// - [`Error::Configuration`] if `server` is empty or `port` is zero.
    /// - [`Error::CapabilityUnavailable`] if TLS was requested but the crate
    ///   was built without the `tls` feature.
    /// - [`Error::ConnectionFailed`] if resolution, the connect attempt, or
    ///   the TLS handshake fails.
    pub fn connect(server: &str, port: u16, options: TransportOptions) -> Result<Self> {
        if server.is_empty() {
            return Err(Error::Configuration("server host must not be empty".into()));
        }
        if port == 0 {
            return Err(Error::Configuration("port must be greater than zero".into()));
        }

        let stream = if options.tls() {
            connect_secure(server, port, &options)?
        } else {
            stream::connect_plain(server, port, options.timeout())?
        };

        tracing::debug!(host = server, port, tls = stream.is_tls(), "connected");

        Ok(Self {
            stream: Some(stream),
            read_buf: Vec::new(),
            options,
        })
    }

    /// Sends `data` to the server with one CRLF appended, as a single write.
    ///
    /// The content of `data` is not inspected; escaping and framing beyond
    /// the trailing terminator are the protocol layer's responsibility.
    ///
    /// # Errors
    ///
    /// Returns [`Error::WriteFailed`] if the connection is not open or the
    /// write does not complete. A failed write releases the socket; the
    /// connection is dead afterwards and is never retried internally.
    pub fn send_line(&mut self, data: &str) -> Result<()> {
        let Some(mut stream) = self.stream.take() else {
            return Err(Error::WriteFailed {
                cause: FailureCause::NotConnected,
            });
        };

        let mut line = Vec::with_capacity(data.len() + CRLF.len());
        line.extend_from_slice(data.as_bytes());
        line.extend_from_slice(CRLF.as_bytes());

        match stream.write_all(&line).and_then(|()| stream.flush()) {
            Ok(()) => {
                tracing::trace!(bytes = line.len(), "sent line");
                self.stream = Some(stream);
                Ok(())
            }
            Err(e) => {
                let cause = FailureCause::from_io(e);
                tracing::warn!(error = %cause, "write failed, releasing socket");
                Err(Error::WriteFailed { cause })
            }
        }
    }

    /// Reads one line from the server.
    ///
    /// Bytes are accumulated in chunks of at most 512 bytes until the buffer
    /// contains CRLF; responses are not assumed to arrive terminator-aligned,
    /// so one call may span several underlying reads. Anything received
    /// beyond the first terminator is retained for the next call.
    ///
    /// With `trim` set, all trailing CR and LF characters are stripped from
    /// the returned line; otherwise the line includes its terminator.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ReadFailed`] if the connection is not open, the peer
    /// closes the stream before a terminator arrives, the configured timeout
    /// elapses on a read, or the socket reports any other error. All of
    /// these release the socket so that callers cannot loop against a stream
    /// the host has already terminated.
    pub fn read_line(&mut self, trim: bool) -> Result<String> {
        let Some(mut stream) = self.stream.take() else {
            return Err(Error::ReadFailed {
                cause: FailureCause::NotConnected,
            });
        };

        let mut chunk = [0_u8; READ_CHUNK];
        loop {
            if let Some(pos) = find_crlf(&self.read_buf) {
                let rest = self.read_buf.split_off(pos + CRLF.len());
                let line = std::mem::replace(&mut self.read_buf, rest);
                self.stream = Some(stream);

                tracing::trace!(bytes = line.len(), "read line");
                let line = String::from_utf8_lossy(&line).into_owned();
                return Ok(if trim {
                    line.trim_end_matches(['\r', '\n']).to_string()
                } else {
                    line
                });
            }

            match stream.read(&mut chunk) {
                Ok(0) => {
                    tracing::warn!("stream terminated by the host, releasing socket");
                    return Err(Error::ReadFailed {
                        cause: FailureCause::ClosedByPeer,
                    });
                }
                Ok(n) => self.read_buf.extend_from_slice(&chunk[..n]),
                // Interrupted reads are resumed; this is line assembly, not
                // error recovery.
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => {
                    let cause = FailureCause::from_io(e);
                    tracing::warn!(error = %cause, "read failed, releasing socket");
                    return Err(Error::ReadFailed { cause });
                }
            }
        }
    }

    /// Returns true if the connection holds a live socket.
    #[must_use]
    pub const fn is_connected(&self) -> bool {
        self.stream.is_some()
    }

    /// Returns true if the connection is TLS-encrypted.
    #[must_use]
    pub const fn is_tls(&self) -> bool {
        match &self.stream {
            Some(stream) => stream.is_tls(),
            None => false,
        }
    }

    /// Closes the connection if it is open.
    ///
    /// Idempotent: closing an already-closed connection is a no-op.
    pub fn close(&mut self) {
        self.read_buf.clear();
        if let Some(stream) = self.stream.take() {
            drop(stream);
            tracing::debug!("connection closed");
        }
    }

    /// The options this connection was opened with.
    #[must_use]
    pub const fn options(&self) -> &TransportOptions {
        &self.options
    }

    /// Replaces the options wholesale.
    ///
    /// The new timeout is applied to the live socket immediately; the TLS
    /// flag is only consulted when a connection is opened and has no effect
    /// on an existing one.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if the timeout cannot be installed
    /// on the socket. The previous options remain in effect in that case.
    pub fn set_options(&mut self, options: TransportOptions) -> Result<()> {
        if let Some(stream) = &self.stream {
            stream
                .apply_timeout(options.timeout())
                .map_err(|e| Error::Configuration(format!("cannot apply timeout: {e}")))?;
        }
        self.options = options;
        Ok(())
    }
}

#[cfg(feature = "tls")]
fn connect_secure(server: &str, port: u16, options: &TransportOptions) -> Result<TransportStream> {
    stream::connect_tls(server, port, options.timeout())
}

#[cfg(not(feature = "tls"))]
fn connect_secure(
    _server: &str,
    _port: u16,
    _options: &TransportOptions,
) -> Result<TransportStream> {
    Err(Error::CapabilityUnavailable(
        "mailwire was built without the `tls` feature",
    ))
}

/// Finds the start of the first CRLF in `buf`.
fn find_crlf(buf: &[u8]) -> Option<usize> {
    buf.windows(2).position(|w| w == CRLF.as_bytes())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_find_crlf() {
        assert_eq!(find_crlf(b"220 ready\r\n"), Some(9));
        assert_eq!(find_crlf(b"\r\n"), Some(0));
        assert_eq!(find_crlf(b"no terminator"), None);
        assert_eq!(find_crlf(b"bare\rcr\nlf"), None);
        assert_eq!(find_crlf(b""), None);
    }

    #[test]
    fn test_find_crlf_first_of_many() {
        assert_eq!(find_crlf(b"+OK\r\n+OK\r\n"), Some(3));
    }

    #[test]
    fn test_connect_rejects_empty_host() {
        let result = TransportConnection::connect("", 25, TransportOptions::default());
        assert!(matches!(result, Err(Error::Configuration(_))));
    }

    #[test]
    fn test_connect_rejects_zero_port() {
        let result = TransportConnection::connect("localhost", 0, TransportOptions::default());
        assert!(matches!(result, Err(Error::Configuration(_))));
    }
}
