//! Shared HTTP plumbing for Foodgram services.
//!
//! Error envelope, health checks, request-id middleware, env config loading and
//! tracing bootstrap.

pub mod config;
pub mod error;
pub mod health;
pub mod middleware;
pub mod serde;
pub mod tracing;
