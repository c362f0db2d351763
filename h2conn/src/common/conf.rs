/// Client and server configuration shared by both sides.
///
/// Unset fields keep `h2` defaults.
#[derive(Default, Debug, Clone)]
pub struct CommonConf {
    /// Initial stream-level flow control window, in bytes.
    pub initial_window_size: Option<u32>,
    /// Initial connection-level flow control window, in bytes.
    pub initial_connection_window_size: Option<u32>,
    /// Largest DATA frame payload this side accepts.
    pub max_frame_size: Option<u32>,
}

impl CommonConf {
    pub(crate) fn configure_client(&self, builder: &mut h2::client::Builder) {
        if let Some(size) = self.initial_window_size {
            builder.initial_window_size(size);
        }
        if let Some(size) = self.initial_connection_window_size {
            builder.initial_connection_window_size(size);
        }
        if let Some(size) = self.max_frame_size {
            builder.max_frame_size(size);
        }
    }

    pub(crate) fn configure_server(&self, builder: &mut h2::server::Builder) {
        if let Some(size) = self.initial_window_size {
            builder.initial_window_size(size);
        }
        if let Some(size) = self.initial_connection_window_size {
            builder.initial_connection_window_size(size);
        }
        if let Some(size) = self.max_frame_size {
            builder.max_frame_size(size);
        }
    }
}
