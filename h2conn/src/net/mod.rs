pub mod addr;
pub(crate) mod connect;
pub(crate) mod listen;
pub(crate) mod socket;
pub(crate) mod tcp;
pub mod unix;
