//! Chain assembly and validation (§3 Certificate chain, §4.10-4.11).

pub mod builder;
pub mod validator;

pub use builder::{build, build_with_max_length, Chain, ChainError};
pub use validator::validate;
