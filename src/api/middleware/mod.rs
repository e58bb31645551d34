//! API middleware. Caller resolution runs before every handler.

pub mod auth;
