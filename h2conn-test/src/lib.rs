#[macro_use]
extern crate log;

use std::sync::Once;

#[macro_use]
mod t;

pub use self::server_test::*;

// Bind on IPv4 because IPv6 is broken on travis
pub const BIND_HOST: &str = "127.0.0.1";

pub fn init_logger() {
    static ONCE: Once = Once::new();
    ONCE.call_once(|| {
        log_ndc_env_logger::init();
    });
}
