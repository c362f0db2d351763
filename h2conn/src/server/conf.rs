use http::StatusCode;

use crate::common::conf::CommonConf;

/// How inbound requests are turned into duplex connections.
#[derive(Default, Debug, Clone)]
pub struct AcceptConf {
    /// Response status sent before any response data, `200 OK` by default.
    pub status: Option<StatusCode>,
}

impl AcceptConf {
    pub fn new() -> AcceptConf {
        Default::default()
    }

    pub(crate) fn status(&self) -> StatusCode {
        self.status.unwrap_or(StatusCode::OK)
    }
}

/// Server configuration.
#[derive(Default, Debug, Clone)]
pub struct ServerConf {
    /// TCP_NODELAY
    pub no_delay: Option<bool>,

    /// Socket option.
    pub backlog: Option<u32>,

    /// Accept configuration.
    pub accept: AcceptConf,

    /// Common client and server configuration.
    pub common: CommonConf,
}

impl ServerConf {
    pub fn new() -> ServerConf {
        Default::default()
    }
}
