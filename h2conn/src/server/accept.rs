use bytes::Bytes;
use h2::server::SendResponse;
use h2::RecvStream;
use http::Request;
use http::Response;
use http::StatusCode;
use http::Version;
use tokio_util::sync::CancellationToken;

use crate::body::flush_write::FlushWrite;
use crate::body::recv::body_reader;
use crate::body::send::BodyWriter;
use crate::server::conf::AcceptConf;
use crate::server::req::ServerRequest;
use crate::AnySocketAddr;
use crate::Conn;
use crate::Error;

/// Addresses of the socket an inbound request arrived on.
#[derive(Default, Debug, Clone)]
pub struct ConnAddrs {
    pub local_addr: Option<AnySocketAddr>,
    pub remote_addr: Option<AnySocketAddr>,
}

/// Turn an inbound HTTP/2 request into a duplex connection.
///
/// Response headers are sent before returning, so the peer waiting for them
/// gets its connection even if nothing is written yet.
/// Connection reads the request body and writes the response body.
///
/// Requests produced by `h2` are always HTTP/2. A request with another version,
/// e. g. one rewritten by a proxy layer in front of this function, is answered with
/// `505 HTTP Version Not Supported` and [`Error::Http2NotSupported`] is returned.
pub fn accept(
    parent: &CancellationToken,
    req: Request<RecvStream>,
    mut respond: SendResponse<Bytes>,
    addrs: &ConnAddrs,
    conf: &AcceptConf,
) -> crate::Result<(Conn, ServerRequest)> {
    if req.version() != Version::HTTP_2 {
        let response = Response::builder()
            .status(StatusCode::HTTP_VERSION_NOT_SUPPORTED)
            .body(())?;
        if let Err(e) = respond.send_response(response, true) {
            debug!("failed to reject request: {}", e);
        }
        return Err(Error::Http2NotSupported);
    }

    let response = Response::builder().status(conf.status()).body(())?;
    let send = respond.send_response(response, false)?;

    let (parts, body) = req.into_parts();
    let (reader, pump) = body_reader(body);
    let (conn, lifetime) = Conn::new(
        parent,
        addrs.remote_addr.clone(),
        addrs.local_addr.clone(),
        reader,
        FlushWrite::new(BodyWriter::new(send)),
    );
    pump.spawn(format!("server {} body", conn.remote_addr()), lifetime.clone());

    Ok((conn, ServerRequest { parts, lifetime }))
}
