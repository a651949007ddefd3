//! Shared types and pure logic for the estate admin: record model,
//! collection keys, upsert/remove primitives and export adapters.
//!
//! Everything here compiles for both the backend and the `wasm32` frontend.

pub mod domain;
pub mod shared;
