use crate::error::Error;

/// A convenience `Result` type that has the crate [`Error`] type as the error
/// type and a generic Ok result type.
pub type Result<T> = std::result::Result<T, Error>;
