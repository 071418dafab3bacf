//! Connection handling.

pub mod connection;
pub mod pragmas;

pub use connection::SharedConnection;
