//! Error context for the dial path.
//!
//! A broker endpoint can resolve to several addresses and the establisher
//! tries them in order, so a connect failure records both the host the
//! caller asked for and the concrete address that failed. Lookup and TLS
//! handshake failures carry the host they were for.

use crate::base::neterror::NetError;
use crate::dns::Name;
use std::fmt;
use std::io;
use std::net::SocketAddr;

/// Context for I/O results produced while dialing a broker.
pub trait IoResultExt<T> {
    /// Tag a failed connect attempt with the endpoint host and the address tried.
    ///
    /// ```ignore
    /// let stream = TcpStream::connect(addr).await.connect_context("broker-a", addr)?;
    /// // Error: "Connection to broker-a (10.0.0.7:10911) failed: connection refused"
    /// ```
    fn connect_context(self, host: &str, addr: SocketAddr) -> Result<T, NetError>;

    /// Tag a failed lookup with the name being resolved.
    fn resolve_context(self, name: &Name) -> Result<T, NetError>;
}

impl<T> IoResultExt<T> for Result<T, io::Error> {
    fn connect_context(self, host: &str, addr: SocketAddr) -> Result<T, NetError> {
        self.map_err(|e| NetError::connection_failed_to(host, addr, e))
    }

    fn resolve_context(self, name: &Name) -> Result<T, NetError> {
        self.map_err(|e| NetError::dns_failed(name.as_str(), e))
    }
}

/// Context for a TLS handshake over an established TCP stream.
pub trait HandshakeResultExt<T> {
    fn handshake_context(self, host: &str) -> Result<T, NetError>;
}

impl<T, S: fmt::Debug> HandshakeResultExt<T> for Result<T, tokio_boring::HandshakeError<S>> {
    fn handshake_context(self, host: &str) -> Result<T, NetError> {
        self.map_err(|e| {
            tracing::debug!(host = %host, error = %e, "TLS handshake failed");
            NetError::SslHandshakeFailed {
                host: host.to_string(),
                reason: e.to_string(),
            }
        })
    }
}
