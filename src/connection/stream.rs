//! Stream types for transport connections.

use std::fmt;
use std::io::{self, Read, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

#[cfg(feature = "tls")]
use std::sync::Arc;

#[cfg(feature = "tls")]
use rustls::pki_types::ServerName;
#[cfg(feature = "tls")]
use rustls::{ClientConfig, ClientConnection, RootCertStore, StreamOwned};

use crate::error::{Error, Result};

/// A blocking stream that can be either plaintext or TLS.
pub enum TransportStream {
    /// Plaintext TCP stream.
    Plain(TcpStream),
    /// TLS-encrypted stream (boxed to reduce enum size).
    #[cfg(feature = "tls")]
    Tls(Box<StreamOwned<ClientConnection, TcpStream>>),
}

impl TransportStream {
    /// Returns true if the stream is TLS-encrypted.
    #[must_use]
    pub const fn is_tls(&self) -> bool {
        #[cfg(feature = "tls")]
        {
            matches!(self, Self::Tls(_))
        }
        #[cfg(not(feature = "tls"))]
        {
            false
        }
    }

    /// The underlying TCP socket.
    #[must_use]
    pub fn tcp_ref(&self) -> &TcpStream {
        match self {
            Self::Plain(tcp) => tcp,
            #[cfg(feature = "tls")]
            Self::Tls(tls) => tls.get_ref(),
        }
    }

    /// Applies `timeout` as the deadline for each subsequent read and write.
    pub(crate) fn apply_timeout(&self, timeout: Duration) -> io::Result<()> {
        let tcp = self.tcp_ref();
        tcp.set_read_timeout(Some(timeout))?;
        tcp.set_write_timeout(Some(timeout))
    }
}

impl fmt::Debug for TransportStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Plain(tcp) => f.debug_tuple("Plain").field(tcp).finish(),
            #[cfg(feature = "tls")]
            Self::Tls(tls) => f.debug_tuple("Tls").field(tls.get_ref()).finish(),
        }
    }
}

impl Read for TransportStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            Self::Plain(tcp) => tcp.read(buf),
            #[cfg(feature = "tls")]
            Self::Tls(tls) => tls.read(buf),
        }
    }
}

impl Write for TransportStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Self::Plain(tcp) => tcp.write(buf),
            #[cfg(feature = "tls")]
            Self::Tls(tls) => tls.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Self::Plain(tcp) => tcp.flush(),
            #[cfg(feature = "tls")]
            Self::Tls(tls) => tls.flush(),
        }
    }
}

/// Connects to a server over plain TCP.
///
/// # Errors
///
/// Returns [`Error::ConnectionFailed`] if resolution or the connect attempt
/// fails within `timeout`.
pub fn connect_plain(host: &str, port: u16, timeout: Duration) -> Result<TransportStream> {
    let tcp = connect_tcp(host, port, timeout)?;
    Ok(TransportStream::Plain(tcp))
}

/// Connects to a server with TLS from the start.
///
/// The handshake is driven to completion before the stream is returned, so a
/// server that cannot negotiate TLS fails here rather than on first use.
///
/// # Errors
///
/// Returns [`Error::ConnectionFailed`] if resolution, the connect attempt, or
/// the TLS handshake fails within `timeout`.
#[cfg(feature = "tls")]
pub fn connect_tls(host: &str, port: u16, timeout: Duration) -> Result<TransportStream> {
    let addr = format!("{host}:{port}");
    let mut tcp = connect_tcp(host, port, timeout)?;

    let server_name = ServerName::try_from(host.to_string()).map_err(|e| {
        Error::ConnectionFailed {
            addr: addr.clone(),
            source: io::Error::new(io::ErrorKind::InvalidInput, e),
        }
    })?;

    let mut conn =
        ClientConnection::new(create_tls_config(), server_name).map_err(|e| {
            Error::ConnectionFailed {
                addr: addr.clone(),
                source: io::Error::other(e),
            }
        })?;

    // The socket timeouts set by connect_tcp also bound the handshake.
    while conn.is_handshaking() {
        conn.complete_io(&mut tcp)
            .map_err(|source| Error::ConnectionFailed {
                addr: addr.clone(),
                source,
            })?;
    }

    Ok(TransportStream::Tls(Box::new(StreamOwned::new(conn, tcp))))
}

/// Creates a TLS client configuration with the bundled root certificates.
#[cfg(feature = "tls")]
fn create_tls_config() -> Arc<ClientConfig> {
    let root_store = RootCertStore {
        roots: webpki_roots::TLS_SERVER_ROOTS.to_vec(),
    };

    let config = ClientConfig::builder()
        .with_root_certificates(root_store)
        .with_no_client_auth();

    Arc::new(config)
}

/// Resolves `host:port` and connects to the first reachable address, bounded
/// by `timeout` per attempt. The same timeout is installed as the read and
/// write deadline on the resulting socket.
fn connect_tcp(host: &str, port: u16, timeout: Duration) -> Result<TcpStream> {
    let addr = format!("{host}:{port}");

    match try_connect_tcp(host, port, timeout) {
        Ok(tcp) => Ok(tcp),
        Err(source) => Err(Error::ConnectionFailed { addr, source }),
    }
}

fn try_connect_tcp(host: &str, port: u16, timeout: Duration) -> io::Result<TcpStream> {
    let mut last_err = None;
    for resolved in (host, port).to_socket_addrs()? {
        match TcpStream::connect_timeout(&resolved, timeout) {
            Ok(tcp) => {
                tcp.set_read_timeout(Some(timeout))?;
                tcp.set_write_timeout(Some(timeout))?;
                return Ok(tcp);
            }
            Err(e) => last_err = Some(e),
        }
    }

    Err(last_err.unwrap_or_else(|| {
        io::Error::new(io::ErrorKind::NotFound, "host resolved to no addresses")
    }))
}
