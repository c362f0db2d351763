use std::time::Duration;

use http::Method;

use crate::common::conf::CommonConf;

/// Client configuration.
#[derive(Default, Debug, Clone)]
pub struct ClientConf {
    /// TCP_NODELAY
    pub no_delay: Option<bool>,
    /// Connect timeout.
    pub connect_timeout: Option<Duration>,

    /// Request method, `POST` by default.
    pub method: Option<Method>,
    /// Request path, `/` by default.
    pub path: Option<String>,
    /// Request authority; server address is used when not specified.
    pub authority: Option<String>,

    /// Common client/server conf.
    pub common: CommonConf,
}

impl ClientConf {
    /// Default configuration.
    pub fn new() -> ClientConf {
        Default::default()
    }

    pub(crate) fn method(&self) -> Method {
        self.method.clone().unwrap_or(Method::POST)
    }

    pub(crate) fn path(&self) -> &str {
        self.path.as_deref().unwrap_or("/")
    }
}
