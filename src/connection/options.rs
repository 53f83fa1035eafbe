//! Transport connection options.

use std::time::Duration;

use crate::error::{Error, Result};

/// Default timeout applied to connect, read, and write operations.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Options for a transport connection.
///
/// Fields are validated at construction; an instance always holds a usable
/// combination. Options are immutable once handed to a connection and can
/// only be replaced wholesale with
/// [`TransportConnection::set_options`](crate::TransportConnection::set_options).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportOptions {
    tls: bool,
    timeout: Duration,
}

impl TransportOptions {
    /// Creates options with the defaults: plain TCP, 5 second timeout.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            tls: false,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Creates an options builder.
    #[must_use]
    pub const fn builder() -> TransportOptionsBuilder {
        TransportOptionsBuilder::new()
    }

    /// Whether TLS is negotiated during connect.
    #[must_use]
    pub const fn tls(&self) -> bool {
        self.tls
    }

    /// The timeout bounding connect and each individual read and write.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl Default for TransportOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for [`TransportOptions`].
#[derive(Debug, Clone)]
pub struct TransportOptionsBuilder {
    tls: bool,
    timeout: Duration,
}

impl TransportOptionsBuilder {
    /// Creates a builder with the default options.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            tls: false,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Sets whether TLS is negotiated during connect.
    #[must_use]
    pub const fn tls(mut self, tls: bool) -> Self {
        self.tls = tls;
        self
    }

    /// Sets the connect/read/write timeout.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Builds the options.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if the timeout is zero.
    pub fn build(self) -> Result<TransportOptions> {
        if self.timeout.is_zero() {
            return Err(Error::Configuration(
                "timeout must be greater than zero".into(),
            ));
        }
        Ok(TransportOptions {
            tls: self.tls,
            timeout: self.timeout,
        })
    }
}

impl Default for TransportOptionsBuilder {
    fn default() -> Self {
        Self::new()
    }
}
