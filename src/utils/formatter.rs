//! HTML reply rendering for product bundles.
//!
//! Replies are askama templates under `templates/`; askama's HTML escaper
//! handles titles and URLs.

use askama::Template;
use std::borrow::Cow;

use crate::domain::entities::{LinkResult, Price, ProductBundle, ProductDetail, ProductKey};

/// Longest product title shown in a caption, in characters.
pub const TITLE_MAX_CHARS: usize = 250;

/// Cuts `raw` to at most `max` characters without splitting a code point.
pub fn truncate_chars(raw: &str, max: usize) -> &str {
    match raw.char_indices().nth(max) {
        Some((idx, _)) => &raw[..idx],
        None => raw,
    }
}

fn title_of<'a>(product_id: &ProductKey, detail: Option<&'a ProductDetail>) -> Cow<'a, str> {
    match detail {
        Some(detail) => Cow::Borrowed(truncate_chars(&detail.title, TITLE_MAX_CHARS)),
        None => Cow::Owned(format!("Product {}", product_id)),
    }
}

/// Title, price line, then one line per requested variant.
#[derive(Template)]
#[template(path = "caption.html")]
pub struct CaptionTemplate<'a> {
    pub product_id: &'a ProductKey,
    pub detail: Option<&'a ProductDetail>,
    pub price: Option<&'a Price>,
    pub links: &'a [LinkResult],
}

impl<'a> CaptionTemplate<'a> {
    pub fn new(bundle: &'a ProductBundle) -> Self {
        let detail = bundle.detail.as_ref();
        Self {
            product_id: &bundle.product_id,
            detail,
            price: detail.and_then(|d| d.price.as_ref()),
            links: &bundle.links,
        }
    }

    fn title(&self) -> Cow<'a, str> {
        title_of(self.product_id, self.detail)
    }
}

#[derive(Template)]
#[template(path = "no_offers.html")]
pub struct NoOffersTemplate<'a> {
    pub product_id: &'a ProductKey,
    pub detail: Option<&'a ProductDetail>,
}

impl<'a> NoOffersTemplate<'a> {
    fn title(&self) -> Cow<'a, str> {
        title_of(self.product_id, self.detail)
    }
}

#[derive(Template)]
#[template(path = "unavailable.html")]
pub struct UnavailableTemplate<'a> {
    pub product_id: &'a ProductKey,
}

/// Full caption for a bundle with at least one offer.
pub fn render_caption(bundle: &ProductBundle) -> askama::Result<String> {
    CaptionTemplate::new(bundle).render()
}

/// Reply for a bundle in which no link could be generated.
pub fn render_no_offers(bundle: &ProductBundle) -> askama::Result<String> {
    NoOffersTemplate {
        product_id: &bundle.product_id,
        detail: bundle.detail.as_ref(),
    }
    .render()
}

/// Reply for a product whose upstream calls all failed.
pub fn render_unavailable(product_id: &ProductKey) -> askama::Result<String> {
    UnavailableTemplate { product_id }.render()
}
