use crate::server::req::ServerRequest;
use crate::Conn;

/// Server connection callback.
///
/// This trait can be implemented by handler provided by user.
pub trait ServerHandler: Send + Sync + 'static {
    /// Take over an accepted duplex connection.
    ///
    /// Called on the server connection task, so it should not block:
    /// spawn a task to serve `conn`. Response headers are already sent.
    fn start_conn(&self, req: ServerRequest, conn: Conn) -> crate::Result<()>;
}

impl<F> ServerHandler for F
where
    F: Fn(ServerRequest, Conn) -> crate::Result<()> + Send + Sync + 'static,
{
    fn start_conn(&self, req: ServerRequest, conn: Conn) -> crate::Result<()> {
        self(req, conn)
    }
}
