//! Affiliate link variants and per-variant link outcomes.

use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use super::product::ProductKey;

const STAR_SHARE_PREFIX: &str = "https://star.aliexpress.com/share/share.htm?&redirectUrl=";

/// One flavor of affiliate link.
///
/// The set is closed and the declaration order is the canonical display
/// order: `Ord` is derived, so a `BTreeSet<LinkVariant>` iterates in the
/// order replies list offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum LinkVariant {
    #[serde(rename = "coin")]
    CoinOffer,
    #[serde(rename = "super")]
    SuperDeal,
    #[serde(rename = "bundles")]
    BundleOffer,
    #[serde(rename = "bundle_deals")]
    BundleDeals,
    #[serde(rename = "bigsave")]
    BigSave,
    #[serde(rename = "limited")]
    LimitedOffer,
}

/// Ordered, deduplicated set of variants requested for one product.
pub type VariantSet = BTreeSet<LinkVariant>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown link variant '{0}'")]
pub struct UnknownVariant(pub String);

impl LinkVariant {
    pub const ALL: [LinkVariant; 6] = [
        LinkVariant::CoinOffer,
        LinkVariant::SuperDeal,
        LinkVariant::BundleOffer,
        LinkVariant::BundleDeals,
        LinkVariant::BigSave,
        LinkVariant::LimitedOffer,
    ];

    /// Stable machine name used in configuration and query strings.
    pub fn key(self) -> &'static str {
        match self {
            Self::CoinOffer => "coin",
            Self::SuperDeal => "super",
            Self::BundleOffer => "bundles",
            Self::BundleDeals => "bundle_deals",
            Self::BigSave => "bigsave",
            Self::LimitedOffer => "limited",
        }
    }

    /// Human-readable label shown next to the link in replies.
    pub fn label(self) -> &'static str {
        match self {
            Self::CoinOffer => "🪙 Coin offer",
            Self::SuperDeal => "🔥 Super deals",
            Self::BundleOffer => "🎁 Bundle offer",
            Self::BundleDeals => "💰 Bundle deals",
            Self::BigSave => "💰 Big Save",
            Self::LimitedOffer => "⏳ Limited offers",
        }
    }

    /// Builds the promotion source URL handed to the link generator.
    pub fn source_url(self, product: &ProductKey) -> String {
        match self {
            Self::CoinOffer => format!(
                "https://m.aliexpress.com/p/coin-index/index.html?_immersiveMode=true&from=syicon&productIds={}",
                product
            ),
            Self::BundleDeals => star_share(&format!(
                "https://www.aliexpress.com/ssr/300000512/BundleDeals2?disableNav=YES&pha_manifest=ssr&_immersiveMode=true&productIds={}",
                product
            )),
            Self::SuperDeal => channel_offer(product, "562", "sd"),
            Self::BundleOffer => channel_offer(product, "570", "bundles"),
            Self::BigSave => channel_offer(product, "680", "bigSave"),
            Self::LimitedOffer => channel_offer(product, "561", "limitedoffers"),
        }
    }

    /// Parses a comma-separated list such as `"coin, super,bundles"`.
    ///
    /// Blank items are ignored; duplicates collapse into one entry.
    pub fn parse_list(raw: &str) -> Result<VariantSet, UnknownVariant> {
        raw.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::parse)
            .collect()
    }
}

fn star_share(url: &str) -> String {
    format!("{}{}", STAR_SHARE_PREFIX, url)
}

fn channel_offer(product: &ProductKey, source_type: &str, channel: &str) -> String {
    star_share(&format!(
        "{}?sourceType={}&channel={}&afSmartRedirect=y",
        product.item_url(),
        source_type,
        channel
    ))
}

impl FromStr for LinkVariant {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|v| v.key() == normalized)
            .ok_or_else(|| UnknownVariant(s.to_string()))
    }
}

impl fmt::Display for LinkVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Outcome of generating one variant's link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LinkOutcome {
    Resolved { url: String },
    Failed { cause: String },
}

/// Link outcome for one requested variant.
///
/// Every requested variant produces exactly one `LinkResult`, failed or not.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkResult {
    pub variant: LinkVariant,
    #[serde(flatten)]
    pub outcome: LinkOutcome,
}

impl LinkResult {
    pub fn resolved(variant: LinkVariant, url: impl Into<String>) -> Self {
        Self {
            variant,
            outcome: LinkOutcome::Resolved { url: url.into() },
        }
    }

    pub fn failed(variant: LinkVariant, cause: impl Into<String>) -> Self {
        Self {
            variant,
            outcome: LinkOutcome::Failed {
                cause: cause.into(),
            },
        }
    }

    pub fn url(&self) -> Option<&str> {
        match &self.outcome {
            LinkOutcome::Resolved { url } => Some(url),
            LinkOutcome::Failed { .. } => None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self.outcome, LinkOutcome::Resolved { .. })
    }
}
