use http::request;
use http::HeaderMap;
use http::Method;
use http::Uri;
use tokio_util::sync::CancellationToken;

/// Inbound request which started a duplex connection.
#[derive(Debug)]
pub struct ServerRequest {
    /// Request headers.
    pub parts: request::Parts,
    /// Lifetime of the accepted connection; cancelled when the connection is closed
    /// or the server is shut down.
    pub lifetime: CancellationToken,
}

impl ServerRequest {
    pub fn method(&self) -> &Method {
        &self.parts.method
    }

    pub fn uri(&self) -> &Uri {
        &self.parts.uri
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.parts.headers
    }
}
