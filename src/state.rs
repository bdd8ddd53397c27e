//! Shared state injected into every handler.

use std::sync::Arc;

use crate::application::services::DealService;
use crate::infrastructure::cache::{BundleCache, ResolvedUrlCache};

/// Application state shared across all HTTP handlers.
///
/// Cloned per request; every field is a cheap handle to shared data.
#[derive(Clone)]
pub struct AppState {
    pub deal_service: Arc<DealService>,
    pub resolved_urls: Arc<ResolvedUrlCache>,
}

impl AppState {
    pub fn new(deal_service: Arc<DealService>, resolved_urls: Arc<ResolvedUrlCache>) -> Self {
        Self {
            deal_service,
            resolved_urls,
        }
    }

    pub fn cache(&self) -> &BundleCache {
        self.deal_service.cache()
    }
}
