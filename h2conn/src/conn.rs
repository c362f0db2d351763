use std::fmt;
use std::io;

use tokio::io::AsyncRead;
use tokio::io::AsyncReadExt;
use tokio::io::AsyncWrite;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tokio_util::sync::WaitForCancellationFuture;

use crate::assert_types::*;
use crate::AnySocketAddr;

type ConnRead = Box<dyn AsyncRead + Send + Unpin>;
type ConnWrite = Box<dyn AsyncWrite + Send + Unpin>;

/// Client/server symmetric duplex connection.
///
/// Reads consume the body sent by the other side, writes go to the body
/// sent to the other side. Reads and writes are serialized by separate locks,
/// so a blocked writer does not stall a reader.
///
/// Operations take `&self`, share the connection with `Arc` to use it from several tasks.
pub struct Conn {
    remote_addr: Option<AnySocketAddr>,
    local_addr: Option<AnySocketAddr>,
    reader: Mutex<ConnRead>,
    writer: Mutex<ConnWrite>,
    lifetime: CancellationToken,
}

fn _assert_types() {
    assert_send::<Conn>();
    assert_sync::<Conn>();
}

impl fmt::Debug for Conn {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Conn")
            .field("remote_addr", &self.remote_addr)
            .field("local_addr", &self.local_addr)
            .field("closed", &self.lifetime.is_cancelled())
            .finish()
    }
}

impl Conn {
    /// Create a connection over already established read and write halves.
    ///
    /// Returned token is a child of `parent`; it is cancelled when the connection
    /// is closed, and background work serving the connection should stop then.
    pub fn new<R, W>(
        parent: &CancellationToken,
        remote_addr: Option<AnySocketAddr>,
        local_addr: Option<AnySocketAddr>,
        reader: R,
        writer: W,
    ) -> (Conn, CancellationToken)
    where
        R: AsyncRead + Send + Unpin + 'static,
        W: AsyncWrite + Send + Unpin + 'static,
    {
        let lifetime = parent.child_token();
        let conn = Conn {
            remote_addr,
            local_addr,
            reader: Mutex::new(Box::new(reader)),
            writer: Mutex::new(Box::new(writer)),
            lifetime: lifetime.clone(),
        };
        (conn, lifetime)
    }

    /// Write all of `data` to the connection.
    ///
    /// Waits until the transport accepts the data. Concurrent writes are not interleaved.
    ///
    /// A write pending when the connection is closed fails with `ConnectionAborted`.
    /// Part of its data may already be sent then, and `close` follows it with end of
    /// stream, so the peer sees that last write truncated.
    pub async fn write(&self, data: &[u8]) -> io::Result<usize> {
        let mut writer = self.writer.lock().await;
        tokio::select! {
            biased;
            _ = self.lifetime.cancelled() => Err(closed_error()),
            r = writer.write_all(data) => r.map(|()| data.len()),
        }
    }

    /// Read data from the connection.
    ///
    /// `Ok(0)` means the other side finished writing.
    pub async fn read(&self, buf: &mut [u8]) -> io::Result<usize> {
        let mut reader = self.reader.lock().await;
        reader.read(buf).await
    }

    /// The local network address, or [`AnySocketAddr::empty`] if unknown.
    pub fn local_addr(&self) -> AnySocketAddr {
        self.local_addr
            .clone()
            .unwrap_or_else(AnySocketAddr::empty)
    }

    /// The remote network address, or [`AnySocketAddr::empty`] if unknown.
    pub fn remote_addr(&self) -> AnySocketAddr {
        self.remote_addr
            .clone()
            .unwrap_or_else(AnySocketAddr::empty)
    }

    /// Close the connection.
    ///
    /// Cancels the connection lifetime, then closes the write side, which
    /// signals end of stream to the other side. Can be called more than once.
    pub async fn close(&self) -> io::Result<()> {
        self.lifetime.cancel();
        let mut writer = self.writer.lock().await;
        writer.shutdown().await
    }

    /// True after [`close`](Conn::close) or after the parent lifetime was cancelled.
    pub fn is_closed(&self) -> bool {
        self.lifetime.is_cancelled()
    }

    /// Future which resolves when the connection lifetime is cancelled.
    pub fn closed(&self) -> WaitForCancellationFuture<'_> {
        self.lifetime.cancelled()
    }
}

/// Dropping a connection without [`close`](Conn::close) cancels its lifetime.
///
/// End of stream is not sent; the stream is reset when both halves are released,
/// so the peer gets an error instead of waiting forever.
impl Drop for Conn {
    fn drop(&mut self) {
        self.lifetime.cancel();
    }
}

fn closed_error() -> io::Error {
    io::Error::new(io::ErrorKind::ConnectionAborted, "connection closed")
}

#[cfg(test)]
mod test {
    use std::sync::atomic::AtomicUsize;
    use std::sync::atomic::Ordering;
    use std::sync::Arc;
    use std::time::Duration;

    use tokio::io::DuplexStream;
    use tokio::runtime::Runtime;

    use super::*;

    /// Two connections wired to each other through in-memory pipes.
    fn pair(parent: &CancellationToken) -> ((Conn, CancellationToken), (Conn, CancellationToken)) {
        let (a_to_b_w, a_to_b_r) = tokio::io::duplex(64 * 1024);
        let (b_to_a_w, b_to_a_r) = tokio::io::duplex(64 * 1024);
        let a = Conn::new(parent, None, None, b_to_a_r, a_to_b_w);
        let b = Conn::new(parent, None, None, a_to_b_r, b_to_a_w);
        (a, b)
    }

    #[test]
    fn ping_pong() {
        Runtime::new().unwrap().block_on(async {
            let parent = CancellationToken::new();
            let ((a, _), (b, _)) = pair(&parent);

            assert_eq!(4, a.write(b"ping").await.unwrap());
            let mut buf = [0u8; 4096];
            let n = b.read(&mut buf).await.unwrap();
            assert_eq!(b"ping", &buf[..n]);

            b.write(b"pong").await.unwrap();
            let n = a.read(&mut buf).await.unwrap();
            assert_eq!(b"pong", &buf[..n]);
        });
    }

    #[test]
    fn empty_addrs() {
        let parent = CancellationToken::new();
        let ((a, _), _) = pair(&parent);
        assert_eq!("0.0.0.0:0", a.local_addr().to_string());
        assert_eq!("0.0.0.0:0", a.remote_addr().to_string());
    }

    #[test]
    fn given_addrs() {
        let parent = CancellationToken::new();
        let (r, w) = tokio::io::duplex(16);
        let remote: AnySocketAddr = "10.0.0.1:443".parse::<std::net::SocketAddr>().unwrap().into();
        let (conn, _) = Conn::new(&parent, Some(remote.clone()), None, r, w);
        assert_eq!(remote, conn.remote_addr());
        assert_eq!(AnySocketAddr::empty(), conn.local_addr());
    }

    #[test]
    fn close_sends_eof_and_cancels_once() {
        Runtime::new().unwrap().block_on(async {
            let parent = CancellationToken::new();
            let ((a, a_lifetime), (b, b_lifetime)) = pair(&parent);

            let fired = Arc::new(AtomicUsize::new(0));
            let fired_copy = fired.clone();
            let watcher = tokio::spawn(async move {
                a_lifetime.cancelled().await;
                fired_copy.fetch_add(1, Ordering::SeqCst);
            });

            a.close().await.unwrap();
            a.close().await.unwrap();
            a.close().await.unwrap();
            watcher.await.unwrap();

            assert_eq!(1, fired.load(Ordering::SeqCst));
            assert!(a.is_closed());
            assert!(!b.is_closed());
            assert!(!b_lifetime.is_cancelled());

            let mut buf = [0u8; 16];
            assert_eq!(0, b.read(&mut buf).await.unwrap());
        });
    }

    #[test]
    fn write_after_close_fails() {
        Runtime::new().unwrap().block_on(async {
            let parent = CancellationToken::new();
            let ((a, _), _b) = pair(&parent);
            a.close().await.unwrap();
            let e = a.write(b"late").await.unwrap_err();
            assert_eq!(io::ErrorKind::ConnectionAborted, e.kind());
        });
    }

    #[test]
    fn parent_cancel_closes() {
        Runtime::new().unwrap().block_on(async {
            let parent = CancellationToken::new();
            let ((a, a_lifetime), (b, b_lifetime)) = pair(&parent);
            parent.cancel();
            a.closed().await;
            assert!(a_lifetime.is_cancelled());
            assert!(b_lifetime.is_cancelled());
            assert!(b.is_closed());
        });
    }

    #[test]
    fn drop_cancels_lifetime() {
        let parent = CancellationToken::new();
        let ((a, a_lifetime), (_b, b_lifetime)) = pair(&parent);
        drop(a);
        assert!(a_lifetime.is_cancelled());
        assert!(!b_lifetime.is_cancelled());
        assert!(!parent.is_cancelled());
    }

    #[test]
    fn blocked_read_does_not_block_write() {
        Runtime::new().unwrap().block_on(async {
            let parent = CancellationToken::new();
            let ((a, _), (b, _)) = pair(&parent);
            let a = Arc::new(a);

            let a_copy = a.clone();
            let reader = tokio::spawn(async move {
                let mut buf = [0u8; 16];
                let n = a_copy.read(&mut buf).await.unwrap();
                buf[..n].to_vec()
            });

            // reader is now parked holding the read lock
            tokio::time::sleep(Duration::from_millis(20)).await;

            let write = tokio::time::timeout(Duration::from_secs(5), a.write(b"x"));
            assert_eq!(1, write.await.expect("write blocked by reader").unwrap());

            let mut buf = [0u8; 16];
            let n = b.read(&mut buf).await.unwrap();
            assert_eq!(b"x", &buf[..n]);

            b.write(b"y").await.unwrap();
            assert_eq!(b"y".to_vec(), reader.await.unwrap());
        });
    }

    #[test]
    fn close_unblocks_stalled_writer() {
        Runtime::new().unwrap().block_on(async {
            let parent = CancellationToken::new();
            // tiny pipe nobody reads from
            let (w, _keep): (DuplexStream, DuplexStream) = tokio::io::duplex(4);
            let (r, _keep_r) = tokio::io::duplex(4);
            let (conn, _) = Conn::new(&parent, None, None, r, w);
            let conn = Arc::new(conn);

            let conn_copy = conn.clone();
            let writer = tokio::spawn(async move { conn_copy.write(&[0u8; 1024]).await });

            tokio::time::sleep(Duration::from_millis(20)).await;
            // shutdown of the pipe itself succeeds regardless of unread data
            conn.close().await.unwrap();

            let e = writer.await.unwrap().unwrap_err();
            assert_eq!(io::ErrorKind::ConnectionAborted, e.kind());
        });
    }
}
