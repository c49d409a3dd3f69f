//! Domain-facing services called by the request handlers.

pub mod token;
