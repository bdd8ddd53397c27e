//! Infrastructure layer for external integrations.
//!
//! This layer implements interfaces defined by the domain layer.
//!
//! # Modules
//!
//! - [`aliexpress`] - Signed client for the AliExpress affiliate API
//! - [`cache`] - Bundle and short-link caches with periodic eviction
//! - [`resolver`] - Short-link resolution over plain HTTP

pub mod aliexpress;
pub mod cache;
pub mod resolver;
