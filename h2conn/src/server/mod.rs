use std::fmt;
use std::net::ToSocketAddrs;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use h2::server::SendResponse;
use h2::Reason;
use h2::RecvStream;
use http::Request;
use tokio::time;
use tokio_util::sync::CancellationToken;

use crate::assert_types::assert_send_future;
use crate::log_ndc_future::spawn_with_ndc;
use crate::net::addr::AnySocketAddr;
use crate::net::listen::SocketListener;
use crate::net::socket::SocketStream;
use crate::net::unix::SocketAddrUnix;
use crate::server::accept::accept;
use crate::server::accept::ConnAddrs;
use crate::server::conf::ServerConf;
use crate::server::handler::ServerHandler;
use crate::Error;

pub mod accept;
pub mod conf;
pub mod handler;
pub mod req;

/// Pause after a failed `accept` call, e. g. when out of file descriptors.
const ACCEPT_ERROR_PAUSE: Duration = Duration::from_millis(100);

/// Builder for [`Server`].
pub struct ServerBuilder {
    /// Configuration.
    pub conf: ServerConf,
    /// Listen address. This is required.
    pub addr: Option<AnySocketAddr>,
    /// Callback receiving accepted connections. This is required.
    pub handler: Option<Arc<dyn ServerHandler>>,
}

impl ServerBuilder {
    /// New server builder with defaults.
    ///
    /// Address and handler must be set, other properties are optional.
    pub fn new() -> ServerBuilder {
        ServerBuilder {
            conf: ServerConf::new(),
            addr: None,
            handler: None,
        }
    }

    /// Set port server listens on.
    /// Can be zero to bind on any available port,
    /// which can be later obtained by `Server::local_addr`.
    pub fn set_port(&mut self, port: u16) -> crate::Result<()> {
        self.set_addr(("::", port))
    }

    /// Set address server listens on.
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

    /// Listen on Unix socket.
    pub fn set_unix_addr<S: Into<SocketAddrUnix>>(&mut self, addr: S) -> crate::Result<()> {
        self.addr = Some(AnySocketAddr::Unix(addr.into()));
        Ok(())
    }

    /// Set the callback which receives accepted connections.
    pub fn set_handler<H: ServerHandler>(&mut self, handler: H) {
        self.handler = Some(Arc::new(handler));
    }

    /// Bind the listener and start accepting connections.
    ///
    /// Must be called within tokio runtime.
    pub async fn build(self) -> crate::Result<Server> {
        let addr = match self.addr {
            Some(addr) => addr,
            None => return Err(Error::AddrNotSpecified),
        };
        let handler = match self.handler {
            Some(handler) => handler,
            None => return Err(Error::HandlerNotSpecified),
        };

        let listener = SocketListener::bind(&addr, &self.conf)?;
        let local_addr = listener.local_addr()?;
        info!("listening on {}", local_addr);

        let shutdown = CancellationToken::new();
        spawn_with_ndc(
            format!("server {}", local_addr),
            assert_send_future(run_listener(
                listener,
                shutdown.clone(),
                Arc::new(self.conf),
                handler,
            )),
        );

        Ok(Server {
            local_addr,
            shutdown,
        })
    }
}

/// HTTP/2 server which accepts duplex connections.
///
/// Can be created with [`ServerBuilder`]. Stops when dropped.
pub struct Server {
    local_addr: AnySocketAddr,
    shutdown: CancellationToken,
}

impl fmt::Debug for Server {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Server")
            .field("local_addr", &self.local_addr)
            .finish()
    }
}

impl Server {
    /// Actual address the server listens on.
    pub fn local_addr(&self) -> &AnySocketAddr {
        &self.local_addr
    }

    /// Token cancelled on shutdown; parent of every accepted connection lifetime.
    pub fn lifetime(&self) -> &CancellationToken {
        &self.shutdown
    }

    /// Stop accepting, and close all accepted connections.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }

    /// True after [`shutdown`](Server::shutdown).
    pub fn is_shutdown(&self) -> bool {
        self.shutdown.is_cancelled()
    }
}

impl Drop for Server {
    fn drop(&mut self) {
        self.shutdown();
        if let AnySocketAddr::Unix(ref unix_addr) = self.local_addr {
            unix_addr.cleanup();
        }
    }
}

async fn run_listener(
    listener: SocketListener,
    shutdown: CancellationToken,
    conf: Arc<ServerConf>,
    handler: Arc<dyn ServerHandler>,
) {
    loop {
        let accepted = tokio::select! {
            _ = shutdown.cancelled() => {
                debug!("server shutdown");
                return;
            }
            accepted = listener.accept() => accepted,
        };

        let (socket, peer_addr) = match accepted {
            Ok(accepted) => accepted,
            Err(e) => {
                warn!("accept failed: {}", e);
                time::sleep(ACCEPT_ERROR_PAUSE).await;
                continue;
            }
        };

        if socket.is_tcp() {
            if let Some(no_delay) = conf.no_delay {
                if let Err(e) = socket.set_tcp_nodelay(no_delay) {
                    warn!("failed to set TCP_NODELAY: {}", e);
                }
            }
        }

        let addrs = ConnAddrs {
            local_addr: socket.local_addr().ok(),
            remote_addr: Some(peer_addr.clone()),
        };

        debug!("accepted connection from {}", peer_addr);
        spawn_with_ndc(
            format!("server conn {}", peer_addr),
            run_conn(
                socket,
                addrs,
                shutdown.clone(),
                conf.clone(),
                handler.clone(),
            ),
        );
    }
}

async fn run_conn(
    socket: Box<dyn SocketStream>,
    addrs: ConnAddrs,
    shutdown: CancellationToken,
    conf: Arc<ServerConf>,
    handler: Arc<dyn ServerHandler>,
) {
    let mut builder = h2::server::Builder::new();
    conf.common.configure_server(&mut builder);
    let mut connection = match builder.handshake::<_, Bytes>(socket).await {
        Ok(connection) => connection,
        Err(e) => {
            warn!("HTTP/2 handshake failed: {}", e);
            return;
        }
    };

    loop {
        // `None` means shutdown
        let next = tokio::select! {
            _ = shutdown.cancelled() => None,
            next = connection.accept() => Some(next),
        };
        match next {
            None => break,
            Some(None) => {
                debug!("connection finished");
                return;
            }
            Some(Some(Err(e))) => {
                warn!("connection failed: {}", e);
                return;
            }
            Some(Some(Ok((req, respond)))) => {
                start_conn(&shutdown, req, respond, &addrs, &conf, &*handler);
            }
        }
    }

    debug!("closing connection on shutdown");
    connection.abrupt_shutdown(Reason::NO_ERROR);
    // keep polling until GOAWAY is written
    while let Some(next) = connection.accept().await {
        match next {
            Ok((_req, mut respond)) => respond.send_reset(Reason::REFUSED_STREAM),
            Err(e) => {
                debug!("connection failed during shutdown: {}", e);
                break;
            }
        }
    }
}

fn start_conn(
    shutdown: &CancellationToken,
    req: Request<RecvStream>,
    respond: SendResponse<Bytes>,
    addrs: &ConnAddrs,
    conf: &ServerConf,
    handler: &dyn ServerHandler,
) {
    let (conn, req) = match accept(shutdown, req, respond, addrs, &conf.accept) {
        Ok(accepted) => accepted,
        Err(e) => {
            warn!(
                "failed creating connection from {}: {}",
                addrs.remote_addr.clone().unwrap_or_else(AnySocketAddr::empty),
                e
            );
            return;
        }
    };
    debug!("{} {} joined", req.method(), req.uri());
    if let Err(e) = handler.start_conn(req, conn) {
        warn!("handler failed: {}", e);
    }
}
