//! Application layer services implementing business logic.
//!
//! This layer orchestrates domain operations: it builds bundles from the
//! upstream API and turns chat messages into deal replies.
//!
//! # Available Services
//!
//! - [`services::aggregator::BundleAggregator`] - Concurrent detail and link calls per product
//! - [`services::deal_service::DealService`] - Message parsing, short-link resolution and replies

pub mod services;
