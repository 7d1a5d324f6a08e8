// ABOUTME: Library root for stackup - exposes public types for testing.
// ABOUTME: The main binary is in main.rs.

pub mod artifacts;
pub mod certs;
pub mod config;
pub mod error;
pub mod health;
pub mod image;
pub mod orchestrator;
pub mod process;
pub mod requirements;
pub mod types;
