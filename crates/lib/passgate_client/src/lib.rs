//! # passgate_client
//!
//! Client-side token acquisition: an authority abstraction over the token
//! endpoint plus a refresh-ahead cache so callers never present a token
//! that is about to expire.

pub mod authority;
pub mod cache;
pub mod error;

pub use authority::{ClientCredentials, HttpTokenAuthority, TokenAuthority, TokenGrant};
pub use cache::CredentialCache;
pub use error::ClientError;
