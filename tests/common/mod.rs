//! Integration test common infrastructure.
//!
//! Provides utilities for spawning in-process servers, creating test
//! clients, and asserting on real-time event flows.

pub mod client;
pub mod server;

#[allow(unused_imports)]
pub use client::TestClient;
#[allow(unused_imports)]
pub use server::TestServer;
