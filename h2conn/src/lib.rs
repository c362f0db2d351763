#![deny(rustdoc::broken_intra_doc_links)]

//! Full-duplex, socket-like connections over a single HTTP/2 request/response exchange.
//!
//! The side which starts the exchange ([`Client`]) writes into the request body and reads
//! the response body; the side which accepts it ([`accept`], [`Server`]) does the opposite.
//! Both sides get the same [`Conn`] type, which can be read and written concurrently
//! and is closed with [`Conn::close`].
//!
//! HTTP/2 framing and flow control are provided by the `h2` crate.

#[macro_use]
extern crate log;

pub use crate::client::conf::ClientConf;
pub use crate::client::connect;
pub use crate::client::Client;
pub use crate::client::ClientBuilder;
pub use crate::common::conf::CommonConf;
pub use crate::conn::Conn;
pub use crate::error::Error;
pub use crate::net::addr::AnySocketAddr;
pub use crate::net::unix::SocketAddrUnix;
pub use crate::result::Result;
pub use crate::server::accept::accept;
pub use crate::server::accept::ConnAddrs;
pub use crate::server::conf::AcceptConf;
pub use crate::server::conf::ServerConf;
pub use crate::server::handler::ServerHandler;
pub use crate::server::req::ServerRequest;
pub use crate::server::Server;
pub use crate::server::ServerBuilder;

pub use tokio_util::sync::CancellationToken;

mod error;
mod result;

mod conn;

mod body;
mod client;
mod common;
mod server;

mod assert_types;
mod log_ndc_future;

pub(crate) mod net;
