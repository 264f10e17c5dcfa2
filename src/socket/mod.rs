//! Broker sockets, from endpoint string to connection wrapper:
//! - [`address`]: IPv6 bracket normalization and host/port splitting
//! - [`connectjob`]: DNS → TCP → TLS connection flow under one deadline
//! - [`tls`]: the fixed, verification-disabled TLS profile (BoringSSL)
//! - [`client`]: plain/TLS socket enum
//! - [`conn`]: the connection wrapper (closed flag, writer lock, classifier)

pub mod address;
pub mod client;
pub mod conn;
pub mod connectjob;
pub mod tls;

pub use conn::{closed_connection_error, ConnWriter, TcpConnWrapper, CLOSED_CONNECTION_TEXT};
pub use connectjob::{dial, ConnectJob};
