use std::time::Duration;

use tokio::time;

use crate::net::addr::AnySocketAddr;
use crate::net::socket::SocketStream;
use crate::net::tcp;

async fn connect_no_timeout(addr: &AnySocketAddr) -> crate::Result<Box<dyn SocketStream>> {
    match addr {
        AnySocketAddr::Inet(inet_addr) => Ok(Box::new(tcp::connect(inet_addr).await?)),
        #[cfg(unix)]
        AnySocketAddr::Unix(unix_addr) => {
            debug!("connecting to {}", unix_addr);
            Ok(Box::new(
                tokio::net::UnixStream::connect(unix_addr.path()).await?,
            ))
        }
        #[cfg(not(unix))]
        AnySocketAddr::Unix(_) => Err(crate::Error::IoError(std::io::Error::new(
            std::io::ErrorKind::Other,
            "cannot use unix sockets on non-unix",
        ))),
    }
}

/// Connect to the address, giving up after `timeout` if it is specified.
pub(crate) async fn connect_with_timeout(
    addr: &AnySocketAddr,
    timeout: Option<Duration>,
) -> crate::Result<Box<dyn SocketStream>> {
    match timeout {
        Some(timeout) => match time::timeout(timeout, connect_no_timeout(addr)).await {
            Ok(r) => r,
            Err(_) => Err(crate::Error::ConnectionTimeout),
        },
        None => connect_no_timeout(addr).await,
    }
}
