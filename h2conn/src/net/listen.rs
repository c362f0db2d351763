use std::io;

use tokio::net::TcpListener;
#[cfg(unix)]
use tokio::net::UnixListener;

use crate::net::addr::AnySocketAddr;
use crate::net::socket::SocketStream;
use crate::net::tcp;
use crate::ServerConf;

/// Bound TCP or Unix listener.
pub(crate) enum SocketListener {
    Tcp(TcpListener),
    #[cfg(unix)]
    Unix(UnixListener),
}

impl SocketListener {
    pub fn bind(addr: &AnySocketAddr, conf: &ServerConf) -> io::Result<SocketListener> {
        match addr {
            AnySocketAddr::Inet(inet_addr) => Ok(SocketListener::Tcp(tcp::listen(inet_addr, conf)?)),
            #[cfg(unix)]
            AnySocketAddr::Unix(unix_addr) => {
                debug!("binding socket to {}", unix_addr);
                Ok(SocketListener::Unix(UnixListener::bind(unix_addr.path())?))
            }
            #[cfg(not(unix))]
            AnySocketAddr::Unix(_) => Err(io::Error::new(
                io::ErrorKind::Other,
                "cannot use unix sockets on non-unix",
            )),
        }
    }

    pub fn local_addr(&self) -> io::Result<AnySocketAddr> {
        match self {
            SocketListener::Tcp(l) => Ok(AnySocketAddr::Inet(l.local_addr()?)),
            #[cfg(unix)]
            SocketListener::Unix(l) => Ok(AnySocketAddr::Unix(l.local_addr()?.into())),
        }
    }

    pub async fn accept(&self) -> io::Result<(Box<dyn SocketStream>, AnySocketAddr)> {
        match self {
            SocketListener::Tcp(l) => {
                let (socket, peer_addr) = l.accept().await?;
                Ok((Box::new(socket), AnySocketAddr::Inet(peer_addr)))
            }
            #[cfg(unix)]
            SocketListener::Unix(l) => {
                let (socket, peer_addr) = l.accept().await?;
                Ok((Box::new(socket), AnySocketAddr::Unix(peer_addr.into())))
            }
        }
    }
}
