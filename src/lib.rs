//! # remoting
//!
//! Connection core of a remoting client that talks to a message broker.
//!
//! `remoting` dials a broker endpoint (`host:port`, IPv4, hostname, or IPv6
//! with or without brackets) over plain TCP or TLS and hands back a
//! [`TcpConnWrapper`](socket::TcpConnWrapper): a shared, thread-safe handle
//! with raw reads, writes serialized by a writer lock, `destroy`, and a
//! classifier that tells errors caused by our own close apart from real
//! network failures.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use remoting::base::cancel::CancellationToken;
//! use remoting::config::ClientConfig;
//! use remoting::socket::dial;
//! use std::time::Duration;
//!
//! # async fn run() -> Result<(), remoting::base::neterror::NetError> {
//! let config = ClientConfig::new().connect_timeout(Duration::from_secs(3));
//! let conn = dial(&CancellationToken::new(), "22da:d3:0:2f3a::2000:10911", &config).await?;
//!
//! {
//!     let mut writer = conn.lock_writer().await;
//!     writer.write_all(b"header").await?;
//!     writer.write_all(b"body").await?;
//! }
//!
//! let mut buf = [0u8; 4];
//! if let Err(e) = conn.read_exact(&mut buf).await {
//!     if !conn.is_closed_error(&e) {
//!         eprintln!("broker connection failed: {e}");
//!     }
//! }
//! conn.destroy()?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`base`] - Errors, error context, cancellation
//! - [`config`] - Client configuration
//! - [`dns`] - Pluggable name resolution
//! - [`socket`] - Address normalization, dialing, TLS, connection wrapper
//!
//! ## Security
//!
//! TLS connections do not verify the broker's certificate or hostname.

pub mod base;
pub mod config;
pub mod dns;
pub mod socket;
