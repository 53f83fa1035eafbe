//! # mailwire
//!
//! A blocking, line-oriented transport connection for text-based mail
//! protocols (SMTP, POP3, IMAP).
//!
//! ## Features
//!
//! - **Plain TCP or TLS**: implicit TLS via `rustls` behind the default-on
//!   `tls` cargo feature
//! - **CRLF line framing**: lines are sent with the terminator appended and
//!   read until the terminator is observed, spanning as many underlying
//!   reads as the server needs
//! - **Uniform timeout**: one configured duration bounds the connect, the
//!   TLS handshake, and every individual read and write
//! - **Fail-fast dead connections**: any read or write failure releases the
//!   socket, so a torn-down stream is never retried
//!
//! ## Quick Start
//!
//! ```no_run
//! use mailwire::{TransportConnection, TransportOptions};
//!
//! fn main() -> mailwire::Result<()> {
//!     let options = TransportOptions::builder()
//!         .tls(true)
//!         .timeout(std::time::Duration::from_secs(10))
//!         .build()?;
//!
//!     let mut conn = TransportConnection::connect("mail.example.com", 995, options)?;
//!
//!     let greeting = conn.read_line(true)?;
//!     println!("server says: {greeting}");
//!
//!     conn.send_line("QUIT")?;
//!     let goodbye = conn.read_line(true)?;
//!     println!("server says: {goodbye}");
//!
//!     conn.close();
//!     Ok(())
//! }
//! ```
//!
//! ## Scope
//!
//! This crate stops at the transport: it neither parses responses nor knows
//! any protocol grammar. A protocol state machine above it alternates
//! [`TransportConnection::send_line`] and [`TransportConnection::read_line`]
//! according to its own rules, and builds reconnect or retry policy on top
//! of fresh connections — a connection that has failed is dead for good.
//!
//! ## Modules
//!
//! - [`connection`]: the transport connection, its options, and streams
//! - [`types`]: plain data types shared with the protocol layers

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod connection;
mod error;
pub mod types;

pub use connection::{
    CRLF, DEFAULT_TIMEOUT, TransportConnection, TransportOptions, TransportOptionsBuilder,
    TransportStream,
};
pub use error::{Error, FailureCause, Result};
pub use types::{ContentDispositionHeader, Disposition, ParameterMetadata};
