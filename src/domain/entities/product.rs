//! Product identity and metadata entities.

use serde::Serialize;
use std::fmt;

/// Identifier of a product on the upstream platform.
///
/// Always a non-empty string of ASCII digits. Construct through
/// [`ProductKey::parse`] so every key in the cache has the same shape.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ProductKey(String);

impl ProductKey {
    /// Parses a product id, rejecting anything that is not purely numeric.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if !trimmed.is_empty() && trimmed.bytes().all(|b| b.is_ascii_digit()) {
            Some(Self(trimmed.to_string()))
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Canonical product page URL used as the base for offer links.
    pub fn item_url(&self) -> String {
        format!("https://www.aliexpress.com/item/{}.html", self.0)
    }
}

impl fmt::Display for ProductKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ProductKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Sale price as returned by the upstream API.
///
/// `amount` keeps the decimal text verbatim (e.g. `"12.90"`) so no
/// precision is lost between the API and the rendered reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Price {
    pub amount: String,
    pub currency: String,
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.amount, self.currency)
    }
}

/// Product metadata fetched once per cache fill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductDetail {
    pub title: String,
    pub image_url: Option<String>,
    pub price: Option<Price>,
}

impl ProductDetail {
    pub fn new(title: impl Into<String>, image_url: Option<String>, price: Option<Price>) -> Self {
        Self {
            title: title.into(),
            image_url,
            price,
        }
    }
}
