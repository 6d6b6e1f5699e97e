//! Multiplayer Texas Hold'em TCP server.
//!
//! Thin library crate so the session layer can be exercised by
//! integration tests against a real listener.

pub mod config;
pub mod session;
