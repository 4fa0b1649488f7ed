//! Transport implementations for the vault server

mod stdio;

pub use stdio::StdioTransport;
