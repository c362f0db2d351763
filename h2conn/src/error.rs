use std::io;
use std::net::SocketAddr;

use http::StatusCode;

use crate::assert_types::*;

/// Errors which can happen while establishing a duplex connection.
///
/// Once a [`Conn`](crate::Conn) exists, its operations return plain `io::Error`.
#[derive(Debug, thiserror::Error)]
#[allow(missing_docs)]
pub enum Error {
    #[error("I/O error: {0}")]
    IoError(#[source] io::Error),
    #[error("HTTP/2 error: {0}")]
    H2Error(#[source] h2::Error),
    #[error("HTTP error: {0}")]
    HttpError(#[source] http::Error),
    /// Peer responded with a status other than 2xx, so no connection was established.
    #[error("Unexpected response status: {0}")]
    UnexpectedStatus(StatusCode),
    #[error("Request is not made using HTTP/2")]
    Http2NotSupported,
    #[error("Address resolved to empty list")]
    AddrResolvedToEmptyList,
    #[error("Address resolved to more than one address")]
    AddrResolvedToMoreThanOneAddr(Vec<SocketAddr>),
    #[error("Address is not specified")]
    AddrNotSpecified,
    #[error("Server handler is not specified")]
    HandlerNotSpecified,
    #[error("Connection timed out")]
    ConnectionTimeout,
    #[error("Shutdown of local client or server")]
    Shutdown,
    #[error("Handler error: {0}")]
    Handler(#[source] anyhow::Error),
}

fn _assert_error_sync_send() {
    assert_send::<Error>();
    assert_sync::<Error>();
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Error {
        Error::IoError(err)
    }
}

impl From<h2::Error> for Error {
    fn from(err: h2::Error) -> Error {
        // h2 wraps socket errors; keep them as I/O errors
        if err.is_io() {
            match err.into_io() {
                Some(e) => Error::IoError(e),
                None => Error::Shutdown,
            }
        } else {
            Error::H2Error(err)
        }
    }
}

impl From<http::Error> for Error {
    fn from(err: http::Error) -> Error {
        Error::HttpError(err)
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Error {
        Error::Handler(err)
    }
}

impl From<Error> for io::Error {
    fn from(err: Error) -> io::Error {
        match err {
            Error::IoError(e) => e,
            e => io::Error::new(io::ErrorKind::Other, e),
        }
    }
}

/// Convert an `h2` error into `io::Error` for the body adapters.
pub(crate) fn h2_to_io(err: h2::Error) -> io::Error {
    if err.is_io() {
        if let Some(e) = err.into_io() {
            return e;
        }
        return io::Error::new(io::ErrorKind::Other, "HTTP/2 connection I/O error");
    }
    io::Error::new(io::ErrorKind::Other, err)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn into_io_keeps_io_error() {
        let e = Error::from(io::Error::new(io::ErrorKind::BrokenPipe, "pipe"));
        let e: io::Error = e.into();
        assert_eq!(io::ErrorKind::BrokenPipe, e.kind());
    }

    #[test]
    fn into_io_wraps_other() {
        let e: io::Error = Error::UnexpectedStatus(StatusCode::NOT_FOUND).into();
        assert_eq!(io::ErrorKind::Other, e.kind());
        assert!(e.to_string().contains("404"));
    }
}
