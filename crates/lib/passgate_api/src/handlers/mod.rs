//! HTTP request handlers.

pub mod roles;
pub mod token;
