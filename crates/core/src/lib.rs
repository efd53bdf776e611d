//! Interio domain types and pure logic.
//!
//! Nothing in this crate talks to the network. The HTTP clients live in
//! `interio-providers`, the servers in `interio-api` and `interio-agent`.

pub mod assets;
pub mod error;
pub mod media;
pub mod skybox;
