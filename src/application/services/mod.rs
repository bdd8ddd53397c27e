//! Business logic services for the application layer.

pub mod aggregator;
pub mod deal_service;

pub use aggregator::BundleAggregator;
pub use deal_service::{DealService, MessageReport, ProductReply, ReplyStatus, ReplySummary};
