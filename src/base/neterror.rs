use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error, Clone)]
pub enum NetError {
    // Dial Errors
    #[error("Operation aborted")]
    Aborted,
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("Address invalid: {0}")]
    AddressInvalid(String),
    #[error("Name not resolved")]
    NameNotResolved,
    #[error("Name not resolved for {domain}: {source}")]
    NameNotResolvedFor {
        domain: String,
        #[source]
        source: Arc<io::Error>,
    },
    #[error("Connection to {host} ({addr}) failed: {source}")]
    ConnectionFailedTo {
        host: String,
        addr: SocketAddr,
        #[source]
        source: Arc<io::Error>,
    },
    #[error("Connection timed out")]
    ConnectionTimedOut,

    // TLS Errors
    #[error("SSL protocol error: {0}")]
    SslProtocolError(#[from] boring::error::ErrorStack),
    #[error("SSL handshake with {host} failed: {reason}")]
    SslHandshakeFailed { host: String, reason: String },

    #[error("I/O error: {0}")]
    Io(Arc<io::Error>),
}

impl NetError {
    pub fn connection_failed_to(host: &str, addr: SocketAddr, source: io::Error) -> Self {
        NetError::ConnectionFailedTo {
            host: host.to_string(),
            addr,
            source: Arc::new(source),
        }
    }

    pub fn dns_failed(domain: &str, source: io::Error) -> Self {
        NetError::NameNotResolvedFor {
            domain: domain.to_string(),
            source: Arc::new(source),
        }
    }

    /// Chromium `net_error_list.h` code for this error.
    pub fn as_i32(&self) -> i32 {
        match self {
            NetError::Aborted => -3,
            NetError::InvalidArgument(_) => -4,
            NetError::AddressInvalid(_) => -108,
            NetError::NameNotResolved | NetError::NameNotResolvedFor { .. } => -105,
            NetError::ConnectionFailedTo { .. } => -104,
            NetError::ConnectionTimedOut => -118,
            NetError::SslProtocolError(_) | NetError::SslHandshakeFailed { .. } => -107,
            NetError::Io(_) => -2,
        }
    }

    /// The I/O error underneath a connect, DNS, or raw I/O failure.
    pub fn io_error(&self) -> Option<&io::Error> {
        match self {
            NetError::NameNotResolvedFor { source, .. }
            | NetError::ConnectionFailedTo { source, .. }
            | NetError::Io(source) => Some(source),
            _ => None,
        }
    }

    pub fn is_timeout(&self) -> bool {
        match self {
            NetError::ConnectionTimedOut => true,
            other => other
                .io_error()
                .is_some_and(|e| e.kind() == io::ErrorKind::TimedOut),
        }
    }
}

impl From<io::Error> for NetError {
    fn from(e: io::Error) -> Self {
        NetError::Io(Arc::new(e))
    }
}
