use std::future::Future;
use std::pin::Pin;
use std::task::Context;
use std::task::Poll;

use log_ndc::Ndc;

pub(crate) fn log_ndc_future<N, F>(ndc: N, f: F) -> LogNdcFuture<N, F>
where
    N: Into<Ndc> + Clone,
    F: Future,
{
    LogNdcFuture { ndc, f }
}

/// Spawn a background task which logs with given context.
pub(crate) fn spawn_with_ndc<F>(ndc: String, f: F) -> tokio::task::JoinHandle<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    tokio::spawn(log_ndc_future(ndc, f))
}

pub(crate) struct LogNdcFuture<N, F>
where
    N: Into<Ndc>,
    F: Future,
{
    ndc: N,
    f: F,
}

impl<N, F> Future for LogNdcFuture<N, F>
where
    N: Into<Ndc> + Clone,
    F: Future,
{
    type Output = F::Output;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<F::Output> {
        let _guard = log_ndc::push(self.ndc.clone().into());
        unsafe { self.map_unchecked_mut(|s| &mut s.f) }.poll(cx)
    }
}
