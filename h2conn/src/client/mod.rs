use std::fmt;
use std::net::ToSocketAddrs;

use bytes::Bytes;
use h2::client::SendRequest;
use http::response;
use http::Request;
use tokio_util::sync::CancellationToken;

use crate::assert_types::*;
use crate::body::recv::body_reader;
use crate::body::send::BodyWriter;
use crate::client::conf::ClientConf;
use crate::log_ndc_future::spawn_with_ndc;
use crate::net::addr::AnySocketAddr;
use crate::net::connect::connect_with_timeout;
use crate::net::socket::SocketStream;
use crate::net::unix::SocketAddrUnix;
use crate::Conn;
use crate::Error;

pub(crate) mod conf;

/// Builder for HTTP/2 client.
///
/// Client parameters can be specified only during construction,
/// and later client cannot be reconfigured.
pub struct ClientBuilder {
    /// Server address. This is mandatory.
    ///
    /// Can be configured with [`set_addr`](ClientBuilder::set_addr) operation.
    pub addr: Option<AnySocketAddr>,
    /// Client configuration.
    pub conf: ClientConf,
}

impl ClientBuilder {
    /// New client builder with default configuration.
    pub fn new() -> ClientBuilder {
        ClientBuilder {
            addr: None,
            conf: ClientConf::new(),
        }
    }

    /// Set the addr client connects to.
    pub fn set_addr<S: ToSocketAddrs>(&mut self, addr: S) -> crate::Result<()> {
        let mut addrs: Vec<_> = addr.to_socket_addrs()?.collect();
        if addrs.len() > 1 {
            return Err(Error::AddrResolvedToMoreThanOneAddr(addrs));
        }
        match addrs.pop() {
            Some(addr) => {
                self.addr = Some(AnySocketAddr::Inet(addr));
                Ok(())
            }
            None => Err(Error::AddrResolvedToEmptyList),
        }
    }

    /// Set the Unix socket addr client connects to.
    pub fn set_unix_addr<A: Into<SocketAddrUnix>>(&mut self, addr: A) -> crate::Result<()> {
        self.addr = Some(AnySocketAddr::Unix(addr.into()));
        Ok(())
    }

    /// Connect the socket and perform HTTP/2 handshake.
    pub async fn build(self) -> crate::Result<Client> {
        let addr = match self.addr {
            Some(addr) => addr,
            None => return Err(Error::AddrNotSpecified),
        };
        let socket = connect_with_timeout(&addr, self.conf.connect_timeout).await?;
        Client::handshake(socket, self.conf).await
    }
}

/// HTTP/2 client which opens duplex connections.
///
/// Each [`connect`](Client::connect) call starts a new HTTP/2 stream on the same
/// TCP (or Unix socket) connection.
pub struct Client {
    send_request: SendRequest<Bytes>,
    conf: ClientConf,
    authority: String,
    local_addr: Option<AnySocketAddr>,
    peer_addr: Option<AnySocketAddr>,
    shutdown: CancellationToken,
}

fn _assert_types() {
    assert_send::<Client>();
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Client")
            .field("peer_addr", &self.peer_addr)
            .field("authority", &self.authority)
            .finish()
    }
}

impl Client {
    /// Create a new client connected to the specified host and port without using TLS.
    pub async fn new_plain(host: &str, port: u16, conf: ClientConf) -> crate::Result<Client> {
        let mut client = ClientBuilder::new();
        client.conf = conf;
        client.set_addr((host, port))?;
        client.build().await
    }

    /// Create a new client connected to the specified Unix socket.
    #[cfg(unix)]
    pub async fn new_plain_unix(addr: &str, conf: ClientConf) -> crate::Result<Client> {
        let mut client = ClientBuilder::new();
        client.conf = conf;
        client.set_unix_addr(addr)?;
        client.build().await
    }

    /// Perform HTTP/2 handshake over an already connected socket.
    ///
    /// HTTP/2 connection is driven by a spawned task, so this must be called
    /// within tokio runtime.
    pub async fn handshake<S: SocketStream>(socket: S, conf: ClientConf) -> crate::Result<Client> {
        let peer_addr = socket.peer_addr().ok();
        let local_addr = socket.local_addr().ok();

        if socket.is_tcp() {
            if let Some(no_delay) = conf.no_delay {
                socket.set_tcp_nodelay(no_delay)?;
            }
        }

        let authority = match (&conf.authority, &peer_addr) {
            (Some(authority), _) => authority.clone(),
            (None, Some(AnySocketAddr::Inet(addr))) => addr.to_string(),
            (None, _) => "localhost".to_owned(),
        };

        let mut builder = h2::client::Builder::new();
        conf.common.configure_client(&mut builder);
        let (send_request, connection) = builder.handshake::<_, Bytes>(socket).await?;

        let ndc = match &peer_addr {
            Some(addr) => format!("client {}", addr),
            None => "client".to_owned(),
        };
        debug!("connected to {}", authority);

        let shutdown = CancellationToken::new();
        let shutdown_copy = shutdown.clone();
        spawn_with_ndc(ndc, async move {
            tokio::select! {
                r = connection => match r {
                    Ok(()) => debug!("connection finished"),
                    Err(e) => warn!("connection failed: {}", e),
                },
                _ = shutdown_copy.cancelled() => debug!("client shutdown"),
            }
        });

        Ok(Client {
            send_request,
            conf,
            authority,
            local_addr,
            peer_addr,
            shutdown,
        })
    }

    /// Start a duplex connection.
    ///
    /// Sends request headers, and waits for response headers.
    /// Response status other than 2xx is an error.
    ///
    /// The connection lifetime is derived from `parent`: cancelling `parent`
    /// closes the connection, and abandons the attempt if headers are not received yet.
    pub async fn connect(
        &self,
        parent: &CancellationToken,
    ) -> crate::Result<(Conn, response::Parts)> {
        let uri = format!("http://{}{}", self.authority, self.conf.path());
        let request = Request::builder()
            .method(self.conf.method())
            .uri(uri)
            .body(())?;

        let mut send_request = self.send_request.clone().ready().await?;
        let (response, send) = send_request.send_request(request, false)?;

        let response = tokio::select! {
            biased;
            _ = parent.cancelled() => return Err(Error::Shutdown),
            r = response => r?,
        };

        let (parts, body) = response.into_parts();
        if !parts.status.is_success() {
            debug!("server rejected duplex connection: {}", parts.status);
            return Err(Error::UnexpectedStatus(parts.status));
        }

        let (reader, pump) = body_reader(body);
        let (conn, lifetime) = Conn::new(
            parent,
            self.peer_addr.clone(),
            self.local_addr.clone(),
            reader,
            BodyWriter::new(send),
        );
        pump.spawn(format!("client {} body", self.authority), lifetime);
        Ok((conn, parts))
    }

    /// Remote address of the HTTP/2 connection.
    pub fn peer_addr(&self) -> AnySocketAddr {
        self.peer_addr.clone().unwrap_or_else(AnySocketAddr::empty)
    }

    /// Local address of the HTTP/2 connection.
    pub fn local_addr(&self) -> AnySocketAddr {
        self.local_addr.clone().unwrap_or_else(AnySocketAddr::empty)
    }

    /// Stop the HTTP/2 connection, failing all connections opened by this client.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }
}

/// Connect to `addr` and open a single duplex connection.
///
/// The HTTP/2 connection lives as long as the returned `Conn`.
pub async fn connect<A: Into<AnySocketAddr>>(
    parent: &CancellationToken,
    addr: A,
    conf: ClientConf,
) -> crate::Result<(Conn, response::Parts)> {
    let mut builder = ClientBuilder::new();
    builder.addr = Some(addr.into());
    builder.conf = conf;
    let client = builder.build().await?;
    client.connect(parent).await
}
