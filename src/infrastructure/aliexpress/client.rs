//! AliExpress affiliate API client.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::time::Duration;
use tokio_retry::RetryIf;
use tokio_retry::strategy::{ExponentialBackoff, jitter};
use tracing::{debug, warn};

use super::response::{decode_detail, decode_link};
use super::signing::{SIGN_METHOD, sign};
use crate::domain::entities::{LinkVariant, ProductDetail, ProductKey};
use crate::domain::{UpstreamClient, UpstreamError};

const DETAIL_METHOD: &str = "aliexpress.affiliate.productdetail.get";
const LINK_METHOD: &str = "aliexpress.affiliate.link.generate";
const MAX_BACKOFF: Duration = Duration::from_secs(2);
const DETAIL_FIELDS: &str =
    "product_main_image_url,target_sale_price,product_title,target_sale_price_currency";

/// Connection and query settings for [`AliExpressClient`].
#[derive(Debug, Clone)]
pub struct AliExpressSettings {
    pub api_url: String,
    pub app_key: String,
    pub app_secret: String,
    pub tracking_id: String,
    pub target_currency: String,
    pub target_language: String,
    pub query_country: String,
    /// Extra attempts after the first one for transient failures.
    pub max_retries: usize,
    /// Timeout of a single HTTP attempt.
    pub request_timeout: Duration,
}

/// Signed client for the `/sync` endpoint.
///
/// Each call is retried with exponential backoff (with jitter) while the
/// failure is transient. Authentication and retries stay inside this type;
/// callers only see the final [`UpstreamError`].
pub struct AliExpressClient {
    http: reqwest::Client,
    settings: AliExpressSettings,
}

impl AliExpressClient {
    /// Creates a client with its own connection pool.
    ///
    /// # Errors
    ///
    /// Returns [`UpstreamError::Http`] if the HTTP client cannot be built.
    pub fn new(settings: AliExpressSettings) -> Result<Self, UpstreamError> {
        let http = reqwest::Client::builder()
            .timeout(settings.request_timeout)
            .pool_idle_timeout(Some(Duration::from_secs(90)))
            .build()
            .map_err(|e| UpstreamError::Http(e.to_string()))?;

        Ok(Self { http, settings })
    }

    pub fn settings(&self) -> &AliExpressSettings {
        &self.settings
    }

    /// Builds the full signed parameter set for `method`.
    fn signed_params(
        &self,
        method: &str,
        business: Vec<(&str, String)>,
    ) -> BTreeMap<String, String> {
        let mut params: BTreeMap<String, String> = business
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect();

        params.insert("method".into(), method.to_string());
        params.insert("app_key".into(), self.settings.app_key.clone());
        params.insert("sign_method".into(), SIGN_METHOD.to_string());
        params.insert(
            "timestamp".into(),
            chrono::Utc::now().timestamp_millis().to_string(),
        );

        let signature = sign(&params, &self.settings.app_secret);
        params.insert("sign".into(), signature);
        params
    }

    /// One signed POST. Returns the raw body of a 2xx response.
    async fn execute(
        &self,
        method: &str,
        business: Vec<(&str, String)>,
    ) -> Result<String, UpstreamError> {
        let params = self.signed_params(method, business);

        let response = self
            .http
            .post(&self.settings.api_url)
            .form(&params)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(UpstreamError::Status(status.as_u16()));
        }

        response.text().await.map_err(|e| self.transport_error(e))
    }

    /// Runs `execute` under the retry policy.
    async fn call(
        &self,
        method: &str,
        business: Vec<(&str, String)>,
    ) -> Result<String, UpstreamError> {
        // 100ms, 200ms, 400ms, ... before jitter
        let strategy = ExponentialBackoff::from_millis(2)
            .factor(50)
            .max_delay(MAX_BACKOFF)
            .map(jitter)
            .take(self.settings.max_retries);

        RetryIf::start(
            strategy,
            || self.execute(method, business.clone()),
            |e: &UpstreamError| {
                let retry = e.is_transient();
                if retry {
                    debug!(method, error = %e, "Transient upstream failure, retrying");
                }
                retry
            },
        )
        .await
    }

    fn transport_error(&self, e: reqwest::Error) -> UpstreamError {
        if e.is_timeout() {
            UpstreamError::Timeout(self.settings.request_timeout)
        } else {
            UpstreamError::Http(e.to_string())
        }
    }
}

#[async_trait]
impl UpstreamClient for AliExpressClient {
    async fn fetch_detail(&self, product_id: &ProductKey) -> Result<ProductDetail, UpstreamError> {
        debug!(product_id = %product_id, "Fetching product details");

        let body = self
            .call(
                DETAIL_METHOD,
                vec![
                    ("fields", DETAIL_FIELDS.to_string()),
                    ("product_ids", product_id.to_string()),
                    ("target_currency", self.settings.target_currency.clone()),
                    ("target_language", self.settings.target_language.clone()),
                    ("tracking_id", self.settings.tracking_id.clone()),
                    ("country", self.settings.query_country.clone()),
                ],
            )
            .await?;

        decode_detail(&body, product_id, &self.settings.target_currency).inspect_err(|e| {
            warn!(product_id = %product_id, error = %e, "Product detail response rejected");
        })
    }

    async fn generate_link(
        &self,
        product_id: &ProductKey,
        variant: LinkVariant,
    ) -> Result<String, UpstreamError> {
        let source_url = variant.source_url(product_id);
        debug!(product_id = %product_id, variant = %variant, "Generating affiliate link");

        let body = self
            .call(
                LINK_METHOD,
                vec![
                    ("promotion_link_type", "0".to_string()),
                    ("source_values", source_url.clone()),
                    ("tracking_id", self.settings.tracking_id.clone()),
                ],
            )
            .await?;

        decode_link(&body, &source_url)
    }
}
