//! Client for the AliExpress affiliate open platform.
//!
//! - [`client`] - Signed HTTP client implementing [`crate::domain::UpstreamClient`]
//! - [`signing`] - HMAC-SHA256 request signatures
//! - [`response`] - Envelope and payload decoding

pub mod client;
pub mod response;
pub mod signing;

pub use client::{AliExpressClient, AliExpressSettings};
