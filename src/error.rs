//! Error types for transport operations.

use std::io;

use thiserror::Error;

/// Result type alias for transport operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Underlying cause of a failed read or write.
///
/// End-of-stream and timeout are deliberately kept apart: a peer that has
/// torn the connection down and a peer that is merely slow call for
/// different handling in the protocol layer above.
#[derive(Debug, Error)]
pub enum FailureCause {
    /// The connection has no live socket (never opened, closed, or dead).
    #[error("connection is not open")]
    NotConnected,

    /// The peer closed the stream before a full line was received.
    #[error("stream terminated by the host")]
    ClosedByPeer,

    /// The configured timeout elapsed before the operation completed.
    #[error("operation timed out")]
    TimedOut,

    /// Any other I/O error reported by the socket.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl FailureCause {
    /// Classifies an I/O error, folding the platform-specific timeout
    /// kinds (`WouldBlock` on Unix, `TimedOut` on Windows) into
    /// [`FailureCause::TimedOut`].
    #[must_use]
    pub fn from_io(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut => Self::TimedOut,
            io::ErrorKind::UnexpectedEof => Self::ClosedByPeer,
            _ => Self::Io(err),
        }
    }
}

/// Errors that can occur on a transport connection.
#[derive(Debug, Error)]
pub enum Error {
    /// TLS was requested but the crate was built without TLS support.
    #[error("TLS support is not available: {0}")]
    CapabilityUnavailable(&'static str),

    /// The connection to the server could not be established.
    #[error("failed to connect to {addr}: {source}")]
    ConnectionFailed {
        /// The `host:port` target of the attempt.
        addr: String,
        /// The underlying resolution, connect, or handshake error.
        source: io::Error,
    },

    /// A line could not be written; the connection is dead afterwards.
    #[error("could not write to the stream: {cause}")]
    WriteFailed {
        /// Why the write failed.
        cause: FailureCause,
    },

    /// A line could not be read; the connection is dead afterwards.
    #[error("could not read from the stream: {cause}")]
    ReadFailed {
        /// Why the read failed.
        cause: FailureCause,
    },

    /// An invalid configuration value or construction input.
    #[error("invalid configuration: {0}")]
    Configuration(String),
}

impl Error {
    /// Returns true if the error is a read or write timeout.
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(
            self,
            Self::WriteFailed {
                cause: FailureCause::TimedOut
            } | Self::ReadFailed {
                cause: FailureCause::TimedOut
            }
        )
    }

    /// Returns true if the peer terminated the stream.
    #[must_use]
    pub const fn is_closed_by_peer(&self) -> bool {
        matches!(
            self,
            Self::WriteFailed {
                cause: FailureCause::ClosedByPeer
            } | Self::ReadFailed {
                cause: FailureCause::ClosedByPeer
            }
        )
    }
}
