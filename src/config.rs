//! Application configuration loaded from environment variables.
//!
//! Configuration is loaded once at startup and validated before the server starts.
//!
//! ## Required Variables
//!
//! - `ALIEXPRESS_APP_KEY` - Affiliate API app key
//! - `ALIEXPRESS_APP_SECRET` - Affiliate API signing secret
//!
//! ## Optional Variables
//!
//! - `LISTEN` - Bind address (default: `0.0.0.0:5000`); `PORT` alone binds `0.0.0.0:$PORT`
//! - `RUST_LOG` - Log level (default: `info`)
//! - `LOG_FORMAT` - Log format: `text` or `json` (default: `text`)
//! - `ALIEXPRESS_TRACKING_ID` - Affiliate tracking id (default: `bot`)
//! - `ALIEXPRESS_API_URL` - API gateway (default: `https://api-sg.aliexpress.com/sync`)
//! - `TARGET_CURRENCY` / `TARGET_LANGUAGE` / `QUERY_COUNTRY` - Query locale
//!   (default: `USD` / `en` / `IL`)
//! - `CACHE_TTL_SECONDS` - Bundle TTL (default: 86400); `CACHE_EXPIRY_DAYS` is
//!   accepted as a fallback
//! - `EVICTION_INTERVAL_SECONDS` - Evictor period (default: 86400)
//! - `UPSTREAM_TIMEOUT_SECONDS` - Per-call timeout (default: 10)
//! - `UPSTREAM_MAX_RETRIES` - Retries of transient failures (default: 2)
//! - `LINK_VARIANTS` - Default offer variants (default: `coin,super,bundles,bundle_deals`)

use anyhow::{Context, Result};
use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::domain::entities::{LinkVariant, VariantSet};
use crate::infrastructure::aliexpress::AliExpressSettings;

const DEFAULT_API_URL: &str = "https://api-sg.aliexpress.com/sync";
const DEFAULT_VARIANTS: &str = "coin,super,bundles,bundle_deals";
const SECONDS_PER_DAY: u64 = 86_400;

/// Service configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub listen_addr: String,
    pub log_level: String,
    pub log_format: String,

    // ── AliExpress API ──────────────────────────────────────────────────────
    pub app_key: String,
    pub app_secret: String,
    pub tracking_id: String,
    pub api_url: String,
    pub target_currency: String,
    pub target_language: String,
    /// Ship-to country for detail queries and `_randl_shipto` rewrites.
    pub query_country: String,

    // ── Cache ───────────────────────────────────────────────────────────────
    pub cache_ttl_seconds: u64,
    pub eviction_interval_seconds: u64,

    // ── Upstream calls ──────────────────────────────────────────────────────
    /// Bound on each detail or link call, retries included.
    pub upstream_timeout_seconds: u64,
    pub upstream_max_retries: usize,
    /// Raw `LINK_VARIANTS` value, parsed by [`Config::link_variants`].
    pub link_variants: String,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if the API credentials are missing.
    pub fn from_env() -> Result<Self> {
        let listen_addr = Self::load_listen_addr();
        let log_level = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
        let log_format = env::var("LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

        let app_key = env::var("ALIEXPRESS_APP_KEY").context("ALIEXPRESS_APP_KEY must be set")?;
        let app_secret =
            env::var("ALIEXPRESS_APP_SECRET").context("ALIEXPRESS_APP_SECRET must be set")?;

        let tracking_id = env::var("ALIEXPRESS_TRACKING_ID").unwrap_or_else(|_| "bot".to_string());
        let api_url =
            env::var("ALIEXPRESS_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        let target_currency = env::var("TARGET_CURRENCY").unwrap_or_else(|_| "USD".to_string());
        let target_language = env::var("TARGET_LANGUAGE").unwrap_or_else(|_| "en".to_string());
        let query_country = env::var("QUERY_COUNTRY").unwrap_or_else(|_| "IL".to_string());

        let cache_ttl_seconds = Self::load_cache_ttl();

        let eviction_interval_seconds =
            parse_env("EVICTION_INTERVAL_SECONDS").unwrap_or(SECONDS_PER_DAY);
        let upstream_timeout_seconds = parse_env("UPSTREAM_TIMEOUT_SECONDS").unwrap_or(10);
        let upstream_max_retries = parse_env("UPSTREAM_MAX_RETRIES").unwrap_or(2);

        let link_variants =
            env::var("LINK_VARIANTS").unwrap_or_else(|_| DEFAULT_VARIANTS.to_string());

        Ok(Self {
            listen_addr,
            log_level,
            log_format,
            app_key,
            app_secret,
            tracking_id,
            api_url,
            target_currency,
            target_language,
            query_country,
            cache_ttl_seconds,
            eviction_interval_seconds,
            upstream_timeout_seconds,
            upstream_max_retries,
            link_variants,
        })
    }

    /// Loads the bind address.
    ///
    /// Priority:
    /// 1. `LISTEN`
    /// 2. `0.0.0.0:$PORT`
    /// 3. `0.0.0.0:5000`
    fn load_listen_addr() -> String {
        if let Ok(listen) = env::var("LISTEN") {
            return listen;
        }
        match env::var("PORT") {
            Ok(port) => format!("0.0.0.0:{}", port),
            Err(_) => "0.0.0.0:5000".to_string(),
        }
    }

    /// Loads the cache TTL in seconds.
    ///
    /// Priority:
    /// 1. `CACHE_TTL_SECONDS`
    /// 2. `CACHE_EXPIRY_DAYS` × 86400
    /// 3. One day
    fn load_cache_ttl() -> u64 {
        if let Some(seconds) = parse_env("CACHE_TTL_SECONDS") {
            return seconds;
        }
        parse_env::<u64>("CACHE_EXPIRY_DAYS")
            .map(|days| days.saturating_mul(SECONDS_PER_DAY))
            .unwrap_or(SECONDS_PER_DAY)
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `log_format` is not `text` or `json`
    /// - `listen_addr` is invalid
    /// - API credentials are empty
    /// - any duration is zero
    /// - `LINK_VARIANTS` is empty or names an unknown variant
    pub fn validate(&self) -> Result<()> {
        if self.log_format != "text" && self.log_format != "json" {
            anyhow::bail!(
                "LOG_FORMAT must be 'text' or 'json', got '{}'",
                self.log_format
            );
        }

        if !self.listen_addr.contains(':') {
            anyhow::bail!(
                "LISTEN must be in format 'host:port', got '{}'",
                self.listen_addr
            );
        }

        if self.app_key.trim().is_empty() {
            anyhow::bail!("ALIEXPRESS_APP_KEY must not be empty");
        }
        if self.app_secret.trim().is_empty() {
            anyhow::bail!("ALIEXPRESS_APP_SECRET must not be empty");
        }

        if !self.api_url.starts_with("http://") && !self.api_url.starts_with("https://") {
            anyhow::bail!(
                "ALIEXPRESS_API_URL must start with 'http://' or 'https://', got '{}'",
                self.api_url
            );
        }

        if self.cache_ttl_seconds == 0 {
            anyhow::bail!("CACHE_TTL_SECONDS must be greater than 0");
        }
        if self.eviction_interval_seconds == 0 {
            anyhow::bail!("EVICTION_INTERVAL_SECONDS must be greater than 0");
        }
        if self.upstream_timeout_seconds == 0 {
            anyhow::bail!("UPSTREAM_TIMEOUT_SECONDS must be greater than 0");
        }

        if self.upstream_max_retries > 10 {
            anyhow::bail!(
                "UPSTREAM_MAX_RETRIES is too large (max: 10), got {}",
                self.upstream_max_retries
            );
        }

        self.link_variants()?;

        Ok(())
    }

    /// Parsed `LINK_VARIANTS`.
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown name or an empty list.
    pub fn link_variants(&self) -> Result<VariantSet> {
        let variants = LinkVariant::parse_list(&self.link_variants)
            .with_context(|| format!("Invalid LINK_VARIANTS '{}'", self.link_variants))?;
        if variants.is_empty() {
            anyhow::bail!("LINK_VARIANTS must name at least one variant");
        }
        Ok(variants)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_seconds)
    }

    pub fn eviction_interval(&self) -> Duration {
        Duration::from_secs(self.eviction_interval_seconds)
    }

    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream_timeout_seconds)
    }

    /// Settings for the affiliate API client.
    ///
    /// A single HTTP attempt gets the whole per-call budget; the aggregator
    /// timeout still bounds the call with its retries.
    pub fn aliexpress_settings(&self) -> AliExpressSettings {
        AliExpressSettings {
            api_url: self.api_url.clone(),
            app_key: self.app_key.clone(),
            app_secret: self.app_secret.clone(),
            tracking_id: self.tracking_id.clone(),
            target_currency: self.target_currency.clone(),
            target_language: self.target_language.clone(),
            query_country: self.query_country.clone(),
            max_retries: self.upstream_max_retries,
            request_timeout: self.upstream_timeout(),
        }
    }

    /// Prints configuration summary (without sensitive data).
    pub fn print_summary(&self) {
        tracing::info!("Configuration loaded:");
        tracing::info!("  Listen address: {}", self.listen_addr);
        tracing::info!("  API: {}", self.api_url);
        tracing::info!("  App key: {}", mask_secret(&self.app_key));
        tracing::info!("  App secret: {}", mask_secret(&self.app_secret));
        tracing::info!("  Tracking id: {}", self.tracking_id);
        tracing::info!(
            "  Locale: {} / {} / {}",
            self.target_currency,
            self.target_language,
            self.query_country
        );
        tracing::info!("  Cache TTL: {}s", self.cache_ttl_seconds);
        tracing::info!("  Eviction interval: {}s", self.eviction_interval_seconds);
        tracing::info!(
            "  Upstream timeout: {}s, retries: {}",
            self.upstream_timeout_seconds,
            self.upstream_max_retries
        );
        tracing::info!("  Link variants: {}", self.link_variants);
        tracing::info!("  Log level: {}", self.log_level);
        tracing::info!("  Log format: {}", self.log_format);
    }
}

fn parse_env<T: FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.trim().parse().ok())
}

/// Masks a secret for logging, keeping at most the first four characters.
///
/// - `"abcdef123"` → `"abcd***"`
/// - `"abc"` → `"***"`
pub fn mask_secret(secret: &str) -> String {
    if secret.chars().count() <= 4 {
        return "***".to_string();
    }
    let visible: String = secret.chars().take(4).collect();
    format!("{}***", visible)
}

/// Loads and validates configuration from environment variables.
///
/// # Errors
///
/// Returns an error if required variables are missing or validation fails.
///
/// # Note
///
/// This function expects environment variables to be already loaded
/// (e.g., via `dotenvy::dotenv()` in `main.rs`).
pub fn load_from_env() -> Result<Config> {
    let config = Config::from_env()?;
    config.validate()?;
    Ok(config)
}
