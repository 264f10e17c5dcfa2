use crate::base::cancel::CancellationToken;
use crate::base::context::{HandshakeResultExt, IoResultExt};
use crate::base::neterror::NetError;
use crate::config::ClientConfig;
use crate::dns::{GaiResolver, Name, Resolve, SocketAddrs};
use crate::socket::address::{normalize, split_host_port};
use crate::socket::client::SocketType;
use crate::socket::conn::TcpConnWrapper;
use crate::socket::tls::TlsConfig;
use socket2::{SockRef, TcpKeepalive};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::Instant;

/// Manages the connection process: normalize -> DNS -> TCP -> TLS.
///
/// The whole attempt runs under one absolute deadline,
/// `min(now + connect_timeout, token deadline)`. A timeout too large to
/// represent as an instant leaves the attempt unbounded. The cancellation token is
/// observed on both the plain and the TLS path, up to the moment the
/// wrapper is returned; cancelling afterwards has no effect on the
/// connection.
pub struct ConnectJob {
    resolver: Arc<dyn Resolve>,
    tls: TlsConfig,
}

impl Default for ConnectJob {
    fn default() -> Self {
        Self::with_resolver(Arc::new(GaiResolver::new()))
    }
}

impl ConnectJob {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_resolver(resolver: Arc<dyn Resolve>) -> Self {
        Self {
            resolver,
            tls: TlsConfig::insecure(),
        }
    }

    /// Dial `addr` (`host:port`, IPv6 hosts bracketed or not).
    ///
    /// Errors are returned as produced by the failing step; no partial
    /// connection is exposed and nothing is retried.
    pub async fn connect(
        &self,
        cancel: &CancellationToken,
        addr: &str,
        config: &ClientConfig,
    ) -> Result<TcpConnWrapper, NetError> {
        let endpoint = normalize(addr);
        let (host, port) = split_host_port(&endpoint)?;

        let deadline = [Instant::now().checked_add(config.connect_timeout), cancel.deadline()]
            .into_iter()
            .flatten()
            .min();

        tracing::debug!(endpoint = %endpoint, tls = config.use_tls, "dialing");
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::debug!(endpoint = %endpoint, "dial cancelled");
                Err(NetError::Aborted)
            }
            res = until(deadline, self.dial(&endpoint, &host, port, config)) => {
                res.unwrap_or_else(|| {
                    tracing::debug!(endpoint = %endpoint, "dial deadline exceeded");
                    Err(NetError::ConnectionTimedOut)
                })
            }
        }
    }

    async fn dial(
        &self,
        endpoint: &str,
        host: &str,
        port: u16,
        config: &ClientConfig,
    ) -> Result<TcpConnWrapper, NetError> {
        let addrs = match SocketAddrs::try_parse(host, port) {
            Some(addrs) => addrs,
            None => SocketAddrs::with_port(self.resolver.resolve(Name::new(host)).await?, port),
        };

        let stream = Self::connect_any(addrs, host).await?;
        configure_socket(&stream, config.keep_alive);

        let socket = if config.use_tls {
            let tls_config = self.tls.configure(host)?;
            let tls_stream = tokio_boring::connect(tls_config, host, stream)
                .await
                .handshake_context(host)?;
            SocketType::Ssl(tls_stream)
        } else {
            SocketType::Tcp(stream)
        };

        let conn = TcpConnWrapper::new(socket, endpoint, config)?;
        tracing::debug!(
            endpoint = %endpoint,
            peer = %conn.peer_addr(),
            local = %conn.local_addr(),
            "connection established"
        );
        Ok(conn)
    }

    /// Try each address in order; the last failure is returned.
    async fn connect_any(addrs: SocketAddrs, host: &str) -> Result<TcpStream, NetError> {
        let mut last_err = None;
        for addr in addrs {
            tracing::debug!(addr = %addr, "connecting");
            match TcpStream::connect(addr).await.connect_context(host, addr) {
                Ok(stream) => return Ok(stream),
                Err(e) => {
                    tracing::debug!(addr = %addr, error = %e, "connect attempt failed");
                    last_err = Some(e);
                }
            }
        }
        Err(last_err.unwrap_or(NetError::NameNotResolved))
    }
}

/// Run `fut` until `deadline`; `None` means the deadline passed first.
async fn until<T>(deadline: Option<Instant>, fut: impl Future<Output = T>) -> Option<T> {
    match deadline {
        Some(deadline) => tokio::time::timeout_at(deadline, fut).await.ok(),
        None => Some(fut.await),
    }
}

/// Dial `addr` with the system resolver.
pub async fn dial(
    cancel: &CancellationToken,
    addr: &str,
    config: &ClientConfig,
) -> Result<TcpConnWrapper, NetError> {
    ConnectJob::new().connect(cancel, addr, config).await
}

/// Keepalive and no-delay. Failures here do not fail the dial.
fn configure_socket(stream: &TcpStream, keep_alive: Option<Duration>) {
    if let Err(e) = stream.set_nodelay(true) {
        tracing::warn!(error = %e, "failed to set TCP_NODELAY");
    }

    let Some(period) = keep_alive else {
        return;
    };
    let keepalive = TcpKeepalive::new().with_time(period);
    #[cfg(any(target_os = "linux", target_os = "macos", windows))]
    let keepalive = keepalive.with_interval(period);

    if let Err(e) = SockRef::from(stream).set_tcp_keepalive(&keepalive) {
        tracing::warn!(error = %e, period = ?period, "failed to enable TCP keepalive");
    }
}
