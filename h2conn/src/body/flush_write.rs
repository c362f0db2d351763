use std::io;
use std::pin::Pin;
use std::task::Context;
use std::task::Poll;

use futures::ready;
use tokio::io::AsyncWrite;

/// Writer which flushes the underlying writer after every write,
/// so written data is not held back by buffering.
pub(crate) struct FlushWrite<W> {
    inner: W,
    // bytes accepted by `inner` but not yet reported, waiting for flush
    pending: Option<usize>,
}

impl<W: AsyncWrite + Unpin> FlushWrite<W> {
    pub fn new(inner: W) -> FlushWrite<W> {
        FlushWrite {
            inner,
            pending: None,
        }
    }
}

impl<W: AsyncWrite + Unpin> AsyncWrite for FlushWrite<W> {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        let me = self.get_mut();
        let n = match me.pending {
            Some(n) => n,
            None => {
                let n = ready!(Pin::new(&mut me.inner).poll_write(cx, buf))?;
                me.pending = Some(n);
                n
            }
        };
        let flushed = Pin::new(&mut me.inner).poll_flush(cx);
        if flushed.is_ready() {
            me.pending = None;
        }
        ready!(flushed)?;
        Poll::Ready(Ok(n))
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.get_mut().inner).poll_flush(cx)
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.get_mut().inner).poll_shutdown(cx)
    }
}
