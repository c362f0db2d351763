use std::cmp;
use std::io;
use std::pin::Pin;
use std::task::Context;
use std::task::Poll;

use bytes::Bytes;
use futures::ready;
use h2::SendStream;
use tokio::io::AsyncWrite;

use crate::error::h2_to_io;

/// `AsyncWrite` over the body of an HTTP/2 request or response.
///
/// A write waits until the peer grants stream capacity and may be short if less capacity
/// than requested is available. Shutdown sends `END_STREAM`.
pub(crate) struct BodyWriter {
    send: SendStream<Bytes>,
    closed: bool,
}

impl BodyWriter {
    pub fn new(send: SendStream<Bytes>) -> BodyWriter {
        BodyWriter {
            send,
            closed: false,
        }
    }

    fn poll_send_capacity(&mut self, cx: &mut Context<'_>, want: usize) -> Poll<io::Result<usize>> {
        loop {
            let capacity = self.send.capacity();
            if capacity > 0 {
                return Poll::Ready(Ok(capacity));
            }
            self.send.reserve_capacity(want);
            match ready!(self.send.poll_capacity(cx)) {
                Some(Ok(0)) => continue,
                Some(Ok(capacity)) => return Poll::Ready(Ok(capacity)),
                Some(Err(e)) => return Poll::Ready(Err(h2_to_io(e))),
                None => {
                    return Poll::Ready(Err(io::Error::new(
                        io::ErrorKind::BrokenPipe,
                        "stream closed before capacity became available",
                    )))
                }
            }
        }
    }
}

impl AsyncWrite for BodyWriter {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        let me = self.get_mut();
        if me.closed {
            return Poll::Ready(Err(io::Error::new(
                io::ErrorKind::BrokenPipe,
                "write after close",
            )));
        }
        if buf.is_empty() {
            return Poll::Ready(Ok(0));
        }
        let capacity = ready!(me.poll_send_capacity(cx, buf.len()))?;
        let n = cmp::min(capacity, buf.len());
        me.send
            .send_data(Bytes::copy_from_slice(&buf[..n]), false)
            .map_err(h2_to_io)?;
        Poll::Ready(Ok(n))
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        // frames are written to the socket by the connection task
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        let me = self.get_mut();
        if me.closed {
            return Poll::Ready(Ok(()));
        }
        me.closed = true;
        me.send
            .send_data(Bytes::new(), true)
            .map_err(h2_to_io)?;
        Poll::Ready(Ok(()))
    }
}
