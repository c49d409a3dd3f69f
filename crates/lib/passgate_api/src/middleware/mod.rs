//! Request middleware and authorization guards.

pub mod auth;
pub mod permission;
