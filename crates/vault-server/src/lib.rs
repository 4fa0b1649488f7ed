//! # vault-server
//!
//! Request handling for Secure Vault. Typed requests are dispatched to a
//! [`vault_core::VaultSession`] by the [`RequestRouter`] and carried over a
//! line-delimited JSON stdio transport.

pub mod protocol;
pub mod transport;

pub use protocol::{ErrorBody, ErrorCode, Request, RequestRouter, Response};
pub use transport::StdioTransport;
