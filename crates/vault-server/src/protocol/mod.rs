//! Vault request protocol: typed requests, responses, and the router

mod router;
mod types;

pub use router::RequestRouter;
pub use types::*;
