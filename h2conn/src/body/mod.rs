//! Adapters between `h2` streams and tokio `AsyncRead`/`AsyncWrite`.

pub(crate) mod flush_write;
pub(crate) mod recv;
pub(crate) mod send;
