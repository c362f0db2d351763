use std::cmp;
use std::io;
use std::pin::Pin;
use std::task::Context;
use std::task::Poll;

use bytes::Buf;
use bytes::Bytes;
use futures::ready;
use h2::FlowControl;
use h2::RecvStream;
use tokio::io::AsyncRead;
use tokio::io::ReadBuf;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::error::h2_to_io;
use crate::log_ndc_future::spawn_with_ndc;

/// Number of DATA frames buffered between the pump and the reader.
///
/// Received bytes are not acknowledged to the peer until the reader consumes them,
/// so the HTTP/2 window, not this constant, limits how much the peer can send.
const PUMP_QUEUE: usize = 16;

/// Message from the pump to the reader.
///
/// Empty data marks end of stream.
type PumpMessage = io::Result<Bytes>;

/// Create a reader over an incoming HTTP/2 body.
///
/// The returned pump must be started with the lifetime of the connection which owns
/// the reader; until then the reader sees no data.
pub(crate) fn body_reader(recv: RecvStream) -> (BodyReader, BodyPump) {
    let (tx, rx) = mpsc::channel(PUMP_QUEUE);
    let mut recv = recv;
    let flow = recv.flow_control().clone();
    (
        BodyReader {
            rx,
            chunk: Bytes::new(),
            flow,
            eof: false,
        },
        BodyPump { recv, tx },
    )
}

/// Background task moving DATA frames from the `h2` stream to [`BodyReader`].
pub(crate) struct BodyPump {
    recv: RecvStream,
    tx: mpsc::Sender<PumpMessage>,
}

impl BodyPump {
    /// Spawn the pump.
    ///
    /// The pump exits on end of stream or error, when `lifetime` is cancelled, or when
    /// the reader is dropped. Exiting drops the `RecvStream`, so a stream nobody reads
    /// any more is reset once its send half is gone too.
    pub fn spawn(self, ndc: String, lifetime: CancellationToken) {
        let tx = self.tx.clone();
        spawn_with_ndc(ndc, async move {
            tokio::select! {
                _ = lifetime.cancelled() => {
                    debug!("body pump cancelled");
                }
                _ = tx.closed() => {
                    debug!("body reader dropped");
                }
                _ = self.run() => {}
            }
        });
    }

    async fn run(mut self) {
        loop {
            let message = match self.recv.data().await {
                Some(Ok(data)) if data.is_empty() => continue,
                Some(Ok(data)) => Ok(data),
                Some(Err(e)) => {
                    debug!("body stream failed: {}", e);
                    Err(h2_to_io(e))
                }
                None => {
                    debug!("body stream finished");
                    Ok(Bytes::new())
                }
            };
            let last = match message {
                Ok(ref data) => data.is_empty(),
                Err(_) => true,
            };
            if self.tx.send(message).await.is_err() {
                debug!("body reader dropped");
                return;
            }
            if last {
                return;
            }
        }
    }
}

/// `AsyncRead` over the body of an HTTP/2 request or response.
///
/// Flow control capacity is released as bytes are read.
pub(crate) struct BodyReader {
    rx: mpsc::Receiver<PumpMessage>,
    chunk: Bytes,
    flow: FlowControl,
    eof: bool,
}

impl AsyncRead for BodyReader {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let me = self.get_mut();
        loop {
            if !me.chunk.is_empty() {
                let n = cmp::min(me.chunk.len(), buf.remaining());
                if let Err(e) = me.flow.release_capacity(n) {
                    // stream is already gone, the data is still valid
                    debug!("failed to release capacity: {}", e);
                }
                buf.put_slice(&me.chunk[..n]);
                me.chunk.advance(n);
                return Poll::Ready(Ok(()));
            }
            if me.eof {
                return Poll::Ready(Ok(()));
            }
            match ready!(me.rx.poll_recv(cx)) {
                Some(Ok(data)) if data.is_empty() => me.eof = true,
                Some(Ok(data)) => me.chunk = data,
                Some(Err(e)) => return Poll::Ready(Err(e)),
                // pump stopped without reaching end of stream
                None => {
                    return Poll::Ready(Err(io::Error::new(
                        io::ErrorKind::ConnectionAborted,
                        "connection closed",
                    )))
                }
            }
        }
    }
}
