//! Site credentials held in the vault

mod types;

pub use types::*;
