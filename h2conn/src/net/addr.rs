use std::fmt;
use std::io;
use std::net::Ipv4Addr;
use std::net::SocketAddr;

use crate::net::unix::SocketAddrUnix;

/// Any socket address: TCP or Unix.
#[derive(Clone, Debug, PartialEq)]
pub enum AnySocketAddr {
    Inet(SocketAddr),
    Unix(SocketAddrUnix),
}

impl fmt::Display for AnySocketAddr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            AnySocketAddr::Inet(ref inet_addr) => fmt::Display::fmt(inet_addr, f),
            AnySocketAddr::Unix(ref unix_addr) => fmt::Display::fmt(unix_addr, f),
        }
    }
}

impl From<SocketAddr> for AnySocketAddr {
    fn from(addr: SocketAddr) -> Self {
        AnySocketAddr::Inet(addr)
    }
}

impl From<SocketAddrUnix> for AnySocketAddr {
    fn from(addr: SocketAddrUnix) -> Self {
        AnySocketAddr::Unix(addr)
    }
}

impl AnySocketAddr {
    /// Address reported for a connection endpoint which is not known:
    /// unspecified IPv4 address with port zero.
    ///
    /// It formats and parses like any other address, but does not point anywhere.
    pub fn empty() -> AnySocketAddr {
        AnySocketAddr::Inet(SocketAddr::from((Ipv4Addr::UNSPECIFIED, 0)))
    }

    /// Is this an [`empty`](AnySocketAddr::empty) address?
    pub fn is_empty(&self) -> bool {
        match self {
            AnySocketAddr::Inet(addr) => addr.ip().is_unspecified() && addr.port() == 0,
            AnySocketAddr::Unix(_) => false,
        }
    }

    /// Get port number of TCP socket, or error from Unix socket.
    pub fn port(&self) -> io::Result<u16> {
        match self {
            &AnySocketAddr::Inet(ref inet_addr) => Ok(inet_addr.port()),
            &AnySocketAddr::Unix(_) => Err(io::Error::new(
                io::ErrorKind::Other,
                "Cannot get port from unix domain socket",
            )),
        }
    }
}
