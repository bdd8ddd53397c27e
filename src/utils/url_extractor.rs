//! AliExpress URL discovery and product id extraction.
//!
//! Chat messages contain URLs in every shape users paste them: full links,
//! `www.` links without a scheme, bare `aliexpress.com/...` paths, and
//! affiliate short links that must be resolved over HTTP before the product
//! id is known.

use regex::Regex;
use std::sync::LazyLock;
use url::Url;

use crate::domain::entities::ProductKey;

static URL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?i)https?://[^\s<>"]+|www\.[^\s<>"]+|\b(?:s\.click\.|a\.)?aliexpress\.(?:com|ru|es|fr|pt|it|pl|nl|co\.kr|co\.jp|com\.br|com\.tr|com\.vn|us|id|th|ar)(?:\.[\w-]+)?/[^\s<>"]*"#,
    )
    .unwrap()
});

static ALIEXPRESS_HOST_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(?:[\w-]+\.)*aliexpress\.(?:com|ru|es|fr|pt|it|pl|nl|co\.kr|co\.jp|com\.br|com\.tr|com\.vn|us|id|th|ar)(?:\.[\w-]+)?$",
    )
    .unwrap()
});

static SHORT_LINK_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^https?://(?:s\.click\.aliexpress\.com/e/|a\.aliexpress\.com/_)[a-zA-Z0-9_-]+/?",
    )
    .unwrap()
});

static ITEM_PATH_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/item/(\d+)\.html").unwrap());

static ALT_ID_REGEXES: LazyLock<[Regex; 2]> = LazyLock::new(|| {
    [
        Regex::new(r"/p/[^/]+/(\d+)\.html").unwrap(),
        Regex::new(r"product/(\d+)").unwrap(),
    ]
});

static SHIP_TO_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"_randl_shipto=[^&]+").unwrap());

const TRAILING_PUNCTUATION: &[char] = &['.', ',', ';', ':', '!', '?', ')', ']', '\''];

/// An AliExpress URL found in a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AliExpressUrl {
    /// Product page with its id already known.
    Product(ProductKey),
    /// Affiliate short link that needs resolving.
    Short(String),
}

/// Finds candidate URLs in free text.
///
/// Scheme-less matches get `https://` prepended when their host is an
/// AliExpress domain; other scheme-less matches are dropped.
pub fn extract_potential_urls(text: &str) -> Vec<String> {
    URL_REGEX
        .find_iter(text)
        .map(|m| m.as_str().trim_end_matches(TRAILING_PUNCTUATION))
        .filter_map(|candidate| {
            let lower = candidate.to_ascii_lowercase();
            if lower.starts_with("http://") || lower.starts_with("https://") {
                return Some(candidate.to_string());
            }

            let prefixed = format!("https://{}", candidate);
            host_of(&prefixed)
                .filter(|host| ALIEXPRESS_HOST_REGEX.is_match(host))
                .map(|_| prefixed)
        })
        .collect()
}

/// True for `s.click.aliexpress.com/e/...` and `a.aliexpress.com/_...` links.
pub fn is_short_link(url: &str) -> bool {
    SHORT_LINK_REGEX.is_match(url)
}

/// True for AliExpress pages other than short-link hosts.
pub fn is_standard_aliexpress_url(url: &str) -> bool {
    match host_of(url) {
        Some(host) => {
            ALIEXPRESS_HOST_REGEX.is_match(&host)
                && !host.starts_with("a.")
                && !host.starts_with("s.click.")
        }
        None => false,
    }
}

/// Maps `.aliexpress.us` hosts onto the `.aliexpress.com` equivalent.
pub fn normalize_us_domain(url: &str) -> String {
    url.replace(".aliexpress.us", ".aliexpress.com")
}

/// Extracts the product id from a standard AliExpress URL.
///
/// Tried in order: the `productIds` query parameter, `/item/<id>.html`,
/// `/p/<slug>/<id>.html`, and `product/<id>`.
pub fn extract_product_id(url: &str) -> Option<ProductKey> {
    let url = normalize_us_domain(url);

    if let Ok(parsed) = Url::parse(&url)
        && let Some(id) = parsed
            .query_pairs()
            .find(|(k, _)| k == "productIds")
            .and_then(|(_, v)| ProductKey::parse(&v))
    {
        return Some(id);
    }

    std::iter::once(&*ITEM_PATH_REGEX)
        .chain(ALT_ID_REGEXES.iter())
        .find_map(|re| re.captures(&url))
        .and_then(|caps| ProductKey::parse(&caps[1]))
}

/// Replaces the `_randl_shipto` value with `country`.
///
/// Returns `None` when the parameter is absent.
pub fn rewrite_ship_to(url: &str, country: &str) -> Option<String> {
    if !SHIP_TO_REGEX.is_match(url) {
        return None;
    }
    let replacement = format!("_randl_shipto={}", country);
    Some(SHIP_TO_REGEX.replace_all(url, replacement.as_str()).into_owned())
}

/// Classifies a candidate URL.
///
/// Returns `None` for non-AliExpress URLs and for standard URLs without a
/// recognizable product id.
pub fn classify(url: &str) -> Option<AliExpressUrl> {
    if is_short_link(url) {
        return Some(AliExpressUrl::Short(url.to_string()));
    }
    if is_standard_aliexpress_url(url) {
        return extract_product_id(url).map(AliExpressUrl::Product);
    }
    None
}

fn host_of(url: &str) -> Option<String> {
    Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_ascii_lowercase))
}
