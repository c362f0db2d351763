use std::io;
use std::net::SocketAddr;

use tokio::net::TcpListener;
use tokio::net::TcpSocket;
use tokio::net::TcpStream;

use crate::net::addr::AnySocketAddr;
use crate::net::socket::SocketStream;
use crate::ServerConf;

impl SocketStream for TcpStream {
    fn is_tcp(&self) -> bool {
        true
    }

    fn set_tcp_nodelay(&self, no_delay: bool) -> io::Result<()> {
        self.set_nodelay(no_delay)
    }

    fn peer_addr(&self) -> io::Result<AnySocketAddr> {
        Ok(AnySocketAddr::Inet(TcpStream::peer_addr(self)?))
    }

    fn local_addr(&self) -> io::Result<AnySocketAddr> {
        Ok(AnySocketAddr::Inet(TcpStream::local_addr(self)?))
    }
}

pub(crate) async fn connect(addr: &SocketAddr) -> io::Result<TcpStream> {
    debug!("connecting to {}", addr);
    TcpStream::connect(addr).await
}

pub(crate) fn listen(addr: &SocketAddr, conf: &ServerConf) -> io::Result<TcpListener> {
    let socket = match *addr {
        SocketAddr::V4(_) => TcpSocket::new_v4()?,
        SocketAddr::V6(_) => TcpSocket::new_v6()?,
    };
    socket.set_reuseaddr(true)?;
    debug!("binding socket to {}", addr);
    socket.bind(*addr)?;
    let backlog = conf.backlog.unwrap_or(1024);
    socket.listen(backlog)
}
