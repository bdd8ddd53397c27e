//! Short-link resolution over HTTP.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::domain::{LinkResolver, ResolveError};
use crate::infrastructure::cache::ResolvedUrlCache;
use crate::utils::url_extractor::{
    extract_product_id, is_standard_aliexpress_url, normalize_us_domain, rewrite_ship_to,
};

pub const RESOLVE_TIMEOUT: Duration = Duration::from_secs(10);
const MAX_REDIRECTS: usize = 10;

/// Resolves affiliate short links by following their redirects.
///
/// Accepted resolutions are cached in a [`ResolvedUrlCache`]. When the
/// landing URL carries a `_randl_shipto` parameter it is rewritten to the
/// configured country and fetched once more, since AliExpress may redirect
/// to a region-specific page.
pub struct HttpShortLinkResolver {
    http: reqwest::Client,
    cache: Arc<ResolvedUrlCache>,
    query_country: String,
}

impl HttpShortLinkResolver {
    /// # Errors
    ///
    /// Returns [`ResolveError::Http`] if the HTTP client cannot be built.
    pub fn new(
        cache: Arc<ResolvedUrlCache>,
        query_country: impl Into<String>,
    ) -> Result<Self, ResolveError> {
        let http = reqwest::Client::builder()
            .timeout(RESOLVE_TIMEOUT)
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .build()
            .map_err(|e| ResolveError::Http(e.to_string()))?;

        Ok(Self {
            http,
            cache,
            query_country: query_country.into(),
        })
    }

    /// GETs `url` following redirects and returns where it landed.
    async fn landing_url(&self, url: &str) -> Result<String, ResolveError> {
        let response = self.http.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                ResolveError::Timeout
            } else {
                ResolveError::Http(e.to_string())
            }
        })?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            return Err(ResolveError::Status(status.as_u16()));
        }

        Ok(response.url().to_string())
    }

    async fn localize(&self, landing: String) -> String {
        let Some(rewritten) = rewrite_ship_to(&landing, &self.query_country) else {
            return landing;
        };

        debug!(url = %rewritten, "Re-fetching with ship-to country");
        match self.landing_url(&rewritten).await {
            Ok(refetched) => normalize_us_domain(&refetched),
            Err(e) => {
                warn!(url = %rewritten, error = %e, "Re-fetch with ship-to country failed");
                rewritten
            }
        }
    }
}

/// Accepts `url` only if it is a standard product page with an id.
pub fn accept_product_page(url: String) -> Result<String, ResolveError> {
    if is_standard_aliexpress_url(&url) && extract_product_id(&url).is_some() {
        Ok(url)
    } else {
        Err(ResolveError::NotAProductPage(url))
    }
}

#[async_trait]
impl LinkResolver for HttpShortLinkResolver {
    async fn resolve(&self, short_url: &str) -> Result<String, ResolveError> {
        if let Some(cached) = self.cache.get(short_url) {
            debug!(short_url, resolved = %cached, "Short link resolution cache hit");
            return Ok(cached);
        }

        let landing = normalize_us_domain(&self.landing_url(short_url).await?);
        let landing = self.localize(landing).await;
        let resolved = accept_product_page(landing)?;

        info!(short_url, resolved = %resolved, "Resolved short link");
        self.cache.insert(short_url, resolved.clone());
        Ok(resolved)
    }
}
