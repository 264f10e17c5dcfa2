//! Connection wrapper handed to the remoting client.
//!
//! [`TcpConnWrapper`] owns one live broker socket and tracks whether *we*
//! closed it. Once [`destroy`](TcpConnWrapper::destroy) runs, reads and
//! writes (pending or new) fail with [`closed_connection_error`], and
//! [`is_closed_error`](TcpConnWrapper::is_closed_error) lets callers tell
//! that shutdown noise apart from a real network fault. Both gates must
//! pass: the local closed flag AND the error text. A peer-initiated close
//! never sets the flag, so it is never reported as ours.
//!
//! Writes go through the writer lock ([`lock_writer`](TcpConnWrapper::lock_writer)).
//! Higher layers frame one message across several writes, so they hold the
//! guard for the whole frame. Reads use a separate lock and never contend
//! with writers. Concurrent readers are serialized by that lock; callers
//! normally run a single read loop per connection.

use crate::base::cancel::CancellationToken;
use crate::config::ClientConfig;
use crate::socket::client::SocketType;
use socket2::{SockRef, Socket};
use std::fmt;
use std::future::Future;
use std::io;
use std::net::{Shutdown, SocketAddr};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use thiserror::Error;
use tokio::io::{AsyncReadExt, AsyncWriteExt, ReadHalf, WriteHalf};
use tokio::sync::{Mutex, MutexGuard};

/// Text carried by errors caused by our own close.
pub const CLOSED_CONNECTION_TEXT: &str = "use of closed network connection";

#[derive(Debug, Error)]
#[error("use of closed network connection")]
pub struct ClosedConnection;

/// The error reads and writes return after [`TcpConnWrapper::destroy`].
pub fn closed_connection_error() -> io::Error {
    io::Error::new(io::ErrorKind::NotConnected, ClosedConnection)
}

pub struct TcpConnWrapper {
    endpoint: String,
    peer_addr: SocketAddr,
    local_addr: SocketAddr,
    tls: bool,
    reader: Mutex<ReadHalf<SocketType>>,
    writer: Mutex<WriteHalf<SocketType>>,
    // Duplicate handle so destroy can shut the socket down while the
    // halves are locked by in-flight I/O.
    socket: Socket,
    closed: AtomicBool,
    close_signal: CancellationToken,
    read_timeout: Option<Duration>,
    write_timeout: Option<Duration>,
}

impl TcpConnWrapper {
    /// Wrap an established socket. The closed flag starts false.
    pub fn new(
        socket: SocketType,
        endpoint: impl Into<String>,
        config: &ClientConfig,
    ) -> io::Result<Self> {
        let peer_addr = socket.peer_addr()?;
        let local_addr = socket.local_addr()?;
        let handle = SockRef::from(socket.tcp()).try_clone()?;
        let tls = socket.is_tls();
        let (reader, writer) = tokio::io::split(socket);

        Ok(Self {
            endpoint: endpoint.into(),
            peer_addr,
            local_addr,
            tls,
            reader: Mutex::new(reader),
            writer: Mutex::new(writer),
            socket: handle,
            closed: AtomicBool::new(false),
            close_signal: CancellationToken::new(),
            read_timeout: config.read_timeout,
            write_timeout: config.write_timeout,
        })
    }

    /// The normalized endpoint this connection was dialed with.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn peer_addr(&self) -> SocketAddr {
        self.peer_addr
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn is_tls(&self) -> bool {
        self.tls
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Read into `buf`. `Ok(0)` means the peer closed its side.
    pub async fn read(&self, buf: &mut [u8]) -> io::Result<usize> {
        let mut reader = self.reader.lock().await;
        self.guarded(self.read_timeout, reader.read(buf)).await
    }

    /// Fill `buf` completely; a peer close surfaces as `UnexpectedEof`.
    pub async fn read_exact(&self, buf: &mut [u8]) -> io::Result<()> {
        let mut reader = self.reader.lock().await;
        self.guarded(self.read_timeout, async {
            reader.read_exact(buf).await.map(|_| ())
        })
        .await
    }

    /// Acquire the writer lock. Writes made through the returned guard are
    /// not interleaved with any other writer's; dropping it releases the lock.
    ///
    /// Do not call [`destroy`](Self::destroy) and then wait on this lock from
    /// the task that already holds it.
    pub async fn lock_writer(&self) -> ConnWriter<'_> {
        ConnWriter {
            conn: self,
            half: self.writer.lock().await,
        }
    }

    /// Write one whole buffer under the writer lock.
    pub async fn write_all(&self, buf: &[u8]) -> io::Result<()> {
        let mut writer = self.lock_writer().await;
        writer.write_all(buf).await?;
        writer.flush().await
    }

    /// Mark the connection closed and shut the socket down.
    ///
    /// Pending reads and writes wake up with [`closed_connection_error`].
    /// The first call returns the result of the socket shutdown; a socket the
    /// peer already tore down (`NotConnected`) counts as shut down. Every
    /// later call returns [`closed_connection_error`], which
    /// [`is_closed_error`](Self::is_closed_error) classifies as ours.
    pub fn destroy(&self) -> io::Result<()> {
        if self.closed.swap(true, Ordering::AcqRel) {
            tracing::debug!(endpoint = %self.endpoint, "connection already destroyed");
            return Err(closed_connection_error());
        }
        self.close_signal.cancel();
        tracing::debug!(endpoint = %self.endpoint, peer = %self.peer_addr, "destroying connection");
        match self.socket.shutdown(Shutdown::Both) {
            Err(e) if e.kind() == io::ErrorKind::NotConnected => {
                tracing::debug!(endpoint = %self.endpoint, "socket already disconnected by peer");
                Ok(())
            }
            res => res,
        }
    }

    /// True iff this wrapper was destroyed AND `err` is an I/O error whose
    /// cause reads `use of closed network connection`.
    pub fn is_closed_error(&self, err: &(dyn std::error::Error + 'static)) -> bool {
        if !self.is_closed() {
            return false;
        }
        err.downcast_ref::<io::Error>()
            .and_then(|e| e.get_ref())
            .is_some_and(|cause| cause.to_string() == CLOSED_CONNECTION_TEXT)
    }

    #[cfg(test)]
    pub(crate) fn raw_socket(&self) -> &Socket {
        &self.socket
    }

    async fn guarded<T>(
        &self,
        timeout: Option<Duration>,
        op: impl Future<Output = io::Result<T>>,
    ) -> io::Result<T> {
        if self.is_closed() {
            return Err(closed_connection_error());
        }
        let op = async {
            match timeout {
                Some(limit) => tokio::time::timeout(limit, op).await.unwrap_or_else(|_| {
                    Err(io::Error::new(io::ErrorKind::TimedOut, "i/o timeout"))
                }),
                None => op.await,
            }
        };
        tokio::select! {
            biased;
            _ = self.close_signal.cancelled() => Err(closed_connection_error()),
            res = op => res,
        }
    }
}

impl fmt::Debug for TcpConnWrapper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TcpConnWrapper")
            .field("endpoint", &self.endpoint)
            .field("peer_addr", &self.peer_addr)
            .field("local_addr", &self.local_addr)
            .field("tls", &self.tls)
            .field("closed", &self.is_closed())
            .finish_non_exhaustive()
    }
}

/// Exclusive access to the write side of a [`TcpConnWrapper`].
pub struct ConnWriter<'a> {
    conn: &'a TcpConnWrapper,
    half: MutexGuard<'a, WriteHalf<SocketType>>,
}

impl ConnWriter<'_> {
    pub async fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let conn = self.conn;
        conn.guarded(conn.write_timeout, self.half.write(buf)).await
    }

    pub async fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        let conn = self.conn;
        conn.guarded(conn.write_timeout, self.half.write_all(buf)).await
    }

    pub async fn flush(&mut self) -> io::Result<()> {
        let conn = self.conn;
        conn.guarded(conn.write_timeout, self.half.flush()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tokio::net::{TcpListener, TcpStream};

    async fn pair(config: &ClientConfig) -> (TcpConnWrapper, TcpStream) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (client, server) = tokio::join!(TcpStream::connect(addr), listener.accept());
        let conn = TcpConnWrapper::new(SocketType::Tcp(client.unwrap()), addr.to_string(), config)
            .unwrap();
        (conn, server.unwrap().0)
    }

    #[tokio::test]
    async fn test_new_wrapper_is_open() {
        let (conn, server) = pair(&ClientConfig::default()).await;
        assert!(!conn.is_closed());
        assert!(!conn.is_tls());
        assert_eq!(conn.peer_addr(), server.local_addr().unwrap());
        assert_eq!(conn.endpoint(), server.local_addr().unwrap().to_string());
    }

    #[tokio::test]
    async fn test_destroy_sets_flag_and_second_call_errors() {
        let (conn, _server) = pair(&ClientConfig::default()).await;

        assert!(conn.destroy().is_ok());
        assert!(conn.is_closed());

        let second = conn.destroy().unwrap_err();
        assert!(conn.is_closed_error(&second));
    }

    #[tokio::test]
    async fn test_classifier_needs_flag() {
        let (conn, _server) = pair(&ClientConfig::default()).await;
        assert!(!conn.is_closed_error(&closed_connection_error()));

        conn.destroy().unwrap();
        assert!(conn.is_closed_error(&closed_connection_error()));
    }

    #[tokio::test]
    async fn test_classifier_needs_text() {
        let (conn, _server) = pair(&ClientConfig::default()).await;
        conn.destroy().unwrap();

        let reset = io::Error::new(io::ErrorKind::ConnectionReset, "connection reset by peer");
        assert!(!conn.is_closed_error(&reset));
        // bare kinds carry no cause text
        assert!(!conn.is_closed_error(&io::Error::from(io::ErrorKind::NotConnected)));
        // a string cause with the exact text matches
        let synthesized = io::Error::new(io::ErrorKind::Other, CLOSED_CONNECTION_TEXT);
        assert!(conn.is_closed_error(&synthesized));
        // not an I/O error at all
        assert!(!conn.is_closed_error(&ClosedConnection));
    }

    #[tokio::test]
    async fn test_destroy_wakes_pending_read() {
        let (conn, _server) = pair(&ClientConfig::default()).await;
        let conn = Arc::new(conn);

        let reader = conn.clone();
        let pending = tokio::spawn(async move {
            let mut buf = [0u8; 16];
            reader.read(&mut buf).await
        });

        tokio::time::sleep(Duration::from_millis(20)).await;
        conn.destroy().unwrap();

        let err = tokio::time::timeout(Duration::from_secs(2), pending)
            .await
            .expect("read should wake")
            .unwrap()
            .unwrap_err();
        assert!(conn.is_closed_error(&err));
    }

    #[tokio::test]
    async fn test_io_after_destroy() {
        let (conn, _server) = pair(&ClientConfig::default()).await;
        conn.destroy().unwrap();

        let write_err = conn.write_all(b"ping").await.unwrap_err();
        assert!(conn.is_closed_error(&write_err));

        let mut buf = [0u8; 4];
        let read_err = conn.read_exact(&mut buf).await.unwrap_err();
        assert!(conn.is_closed_error(&read_err));
    }

    #[tokio::test]
    async fn test_read_and_write() {
        let (conn, mut server) = pair(&ClientConfig::default()).await;

        conn.write_all(b"hello").await.unwrap();
        let mut buf = [0u8; 5];
        server.read_exact(&mut buf).await.unwrap();
        assert_eq!(&buf, b"hello");

        server.write_all(b"world").await.unwrap();
        conn.read_exact(&mut buf).await.unwrap();
        assert_eq!(&buf, b"world");
    }

    #[tokio::test]
    async fn test_read_timeout_is_not_a_closed_error() {
        let config = ClientConfig::default().read_timeout(Duration::from_millis(30));
        let (conn, _server) = pair(&config).await;

        let mut buf = [0u8; 1];
        let err = conn.read(&mut buf).await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::TimedOut);
        assert!(!conn.is_closed_error(&err));
    }

    #[tokio::test]
    async fn test_destroy_after_peer_reset() {
        let (conn, server) = pair(&ClientConfig::default()).await;
        // linger 0 turns the close into a RST
        SockRef::from(&server).set_linger(Some(Duration::ZERO)).unwrap();
        drop(server);

        let mut buf = [0u8; 1];
        let err = conn.read_exact(&mut buf).await.unwrap_err();
        assert!(!conn.is_closed_error(&err));

        assert!(conn.destroy().is_ok());
        assert!(conn.is_closed());
    }

    #[tokio::test]
    async fn test_peer_close_is_not_ours() {
        let (conn, server) = pair(&ClientConfig::default()).await;
        drop(server);

        let mut buf = [0u8; 4];
        let err = conn.read_exact(&mut buf).await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
        assert!(!conn.is_closed_error(&err));
    }
}
