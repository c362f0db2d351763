use std::fmt;
use std::io;

use tokio::io::AsyncRead;
use tokio::io::AsyncWrite;

use crate::AnySocketAddr;

/// TCP stream or socket stream; basically any async stream useable in http2
pub trait SocketStream: AsyncRead + AsyncWrite + fmt::Debug + Send + Sync + Unpin + 'static {
    /// True iff this socket is TCP socket.
    fn is_tcp(&self) -> bool;

    /// Set no delay for TCP socket, return error for non-TCP socket.
    fn set_tcp_nodelay(&self, no_delay: bool) -> io::Result<()>;

    fn peer_addr(&self) -> io::Result<AnySocketAddr>;

    fn local_addr(&self) -> io::Result<AnySocketAddr>;
}

impl SocketStream for Box<dyn SocketStream> {
    fn is_tcp(&self) -> bool {
        (**self).is_tcp()
    }

    fn set_tcp_nodelay(&self, no_delay: bool) -> io::Result<()> {
        (**self).set_tcp_nodelay(no_delay)
    }

    fn peer_addr(&self) -> io::Result<AnySocketAddr> {
        (**self).peer_addr()
    }

    fn local_addr(&self) -> io::Result<AnySocketAddr> {
        (**self).local_addr()
    }
}

#[cfg(unix)]
impl SocketStream for tokio::net::UnixStream {
    fn is_tcp(&self) -> bool {
        false
    }

    fn set_tcp_nodelay(&self, _no_delay: bool) -> io::Result<()> {
        Err(io::Error::new(
            io::ErrorKind::Other,
            "Cannot set nodelay on unix domain socket",
        ))
    }

    fn peer_addr(&self) -> io::Result<AnySocketAddr> {
        Ok(AnySocketAddr::Unix(
            tokio::net::UnixStream::peer_addr(self)?.into(),
        ))
    }

    fn local_addr(&self) -> io::Result<AnySocketAddr> {
        Ok(AnySocketAddr::Unix(
            tokio::net::UnixStream::local_addr(self)?.into(),
        ))
    }
}
