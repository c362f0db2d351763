use std::fmt;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

/// Unix socket address, which is filesystem path.
///
/// Note although this type is available on Windows, unix sockets don't work on Windows.
#[derive(Debug, Clone, PartialEq)]
pub struct SocketAddrUnix(pub(crate) PathBuf);

impl SocketAddrUnix {
    /// Socket file path.
    pub fn path(&self) -> &Path {
        &self.0
    }

    /// Remove socket file left by a listener.
    pub(crate) fn cleanup(&self) {
        if self.0.exists() {
            if let Err(e) = fs::remove_file(&self.0) {
                warn!("failed to remove socket file {}: {}", self, e);
            }
        }
    }
}

impl From<PathBuf> for SocketAddrUnix {
    fn from(p: PathBuf) -> Self {
        SocketAddrUnix(p)
    }
}

impl From<&Path> for SocketAddrUnix {
    fn from(p: &Path) -> Self {
        SocketAddrUnix(p.into())
    }
}

impl From<&str> for SocketAddrUnix {
    fn from(p: &str) -> Self {
        SocketAddrUnix(p.into())
    }
}

impl From<&String> for SocketAddrUnix {
    fn from(p: &String) -> Self {
        SocketAddrUnix(p.into())
    }
}

impl From<String> for SocketAddrUnix {
    fn from(p: String) -> Self {
        SocketAddrUnix(p.into())
    }
}

impl fmt::Display for SocketAddrUnix {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(&self.0.display(), f)
    }
}

#[cfg(unix)]
impl From<tokio::net::unix::SocketAddr> for SocketAddrUnix {
    fn from(s: tokio::net::unix::SocketAddr) -> Self {
        // can be unnamed
        SocketAddrUnix(s.as_pathname().unwrap_or(Path::new("")).to_owned())
    }
}
