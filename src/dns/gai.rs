//! System resolver (`getaddrinfo` on the blocking pool).

use super::{Addrs, Name, Resolve, Resolving};
use crate::base::context::IoResultExt;
use crate::base::neterror::NetError;
use std::io;
use std::net::{IpAddr, SocketAddr, ToSocketAddrs};

/// Resolves through the operating system, honoring `/etc/hosts` and
/// `resolv.conf`. Each lookup runs in `tokio::task::spawn_blocking`.
#[derive(Clone, Debug, Default)]
pub struct GaiResolver;

impl GaiResolver {
    pub fn new() -> Self {
        Self
    }
}

impl Resolve for GaiResolver {
    fn resolve(&self, name: Name) -> Resolving {
        Box::pin(async move {
            let host = name.as_str().to_string();

            let joined = tokio::task::spawn_blocking(move || {
                tracing::debug!(host = %host, "resolving via getaddrinfo");
                (host.as_str(), 0u16)
                    .to_socket_addrs()
                    .map(|iter| iter.collect::<Vec<_>>())
            })
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "DNS resolution task failed");
                NetError::NameNotResolved
            })?;

            let addrs = joined.resolve_context(&name)?;
            if addrs.is_empty() {
                return Err(NetError::dns_failed(
                    name.as_str(),
                    io::Error::new(io::ErrorKind::NotFound, "no addresses returned"),
                ));
            }

            tracing::debug!(domain = %name, count = addrs.len(), "DNS resolution complete");
            Ok(Box::new(addrs.into_iter()) as Addrs)
        })
    }
}

/// Literal-IP fast path: hosts that already are addresses skip DNS.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SocketAddrs {
    addrs: Vec<SocketAddr>,
}

impl SocketAddrs {
    pub fn new(addrs: Vec<SocketAddr>) -> Self {
        Self { addrs }
    }

    /// `Some` when `host` parses as an IPv4 or IPv6 literal (unbracketed).
    pub fn try_parse(host: &str, port: u16) -> Option<Self> {
        host.parse::<IpAddr>().ok().map(|ip| Self {
            addrs: vec![SocketAddr::new(ip, port)],
        })
    }

    pub fn len(&self) -> usize {
        self.addrs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.addrs.is_empty()
    }

    /// Stamp `port` onto every address, as resolvers return port 0.
    pub fn with_port(addrs: Addrs, port: u16) -> Self {
        Self {
            addrs: addrs.map(|a| SocketAddr::new(a.ip(), port)).collect(),
        }
    }
}

impl IntoIterator for SocketAddrs {
    type Item = SocketAddr;
    type IntoIter = std::vec::IntoIter<SocketAddr>;

    fn into_iter(self) -> Self::IntoIter {
        self.addrs.into_iter()
    }
}
