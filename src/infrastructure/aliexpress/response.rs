//! Response decoding for the affiliate API.
//!
//! Every `/sync` response is either
//!
//! ```json
//! {"error_response": {"code": "...", "msg": "..."}}
//! ```
//!
//! or an envelope named after the method:
//!
//! ```json
//! {"<method>_response": {"resp_result": {"resp_code": 200, "resp_msg": "...", "result": {...}}}}
//! ```

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::domain::UpstreamError;
use crate::domain::entities::{Price, ProductDetail, ProductKey};

pub const DETAIL_RESPONSE_KEY: &str = "aliexpress_affiliate_productdetail_get_response";
pub const LINK_RESPONSE_KEY: &str = "aliexpress_affiliate_link_generate_response";

const RESP_CODE_OK: i64 = 200;

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    code: Option<Value>,
    #[serde(default)]
    msg: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    resp_result: Option<RespResult<T>>,
}

#[derive(Debug, Deserialize)]
struct RespResult<T> {
    #[serde(default)]
    resp_code: Option<i64>,
    #[serde(default)]
    resp_msg: Option<String>,
    result: Option<T>,
}

#[derive(Debug, Deserialize)]
struct ProductResult {
    #[serde(default)]
    products: Option<ProductList>,
}

#[derive(Debug, Default, Deserialize)]
struct ProductList {
    #[serde(default)]
    product: Vec<RawProduct>,
}

#[derive(Debug, Deserialize)]
struct RawProduct {
    product_title: Option<String>,
    product_main_image_url: Option<String>,
    target_sale_price: Option<Value>,
    target_sale_price_currency: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LinkGenerateResult {
    #[serde(default)]
    promotion_links: Option<PromotionLinks>,
}

#[derive(Debug, Default, Deserialize)]
struct PromotionLinks {
    #[serde(default)]
    promotion_link: Vec<PromotionLink>,
}

#[derive(Debug, Deserialize)]
struct PromotionLink {
    source_value: Option<String>,
    promotion_link: Option<String>,
}

/// Unwraps the `resp_result.result` payload of a response envelope.
fn unwrap_result<T: DeserializeOwned>(
    body: &str,
    response_key: &str,
) -> Result<Option<T>, UpstreamError> {
    let mut root: Value =
        serde_json::from_str(body).map_err(|e| UpstreamError::Decode(e.to_string()))?;

    if let Some(error) = root.get_mut("error_response").map(Value::take) {
        let error: ErrorBody =
            serde_json::from_value(error).map_err(|e| UpstreamError::Decode(e.to_string()))?;
        return Err(UpstreamError::Api {
            code: error.code.as_ref().map(value_to_string).unwrap_or_else(|| "N/A".to_string()),
            message: error.msg.unwrap_or_else(|| "Unknown API error".to_string()),
        });
    }

    let envelope = root
        .get_mut(response_key)
        .map(Value::take)
        .ok_or_else(|| UpstreamError::Decode(format!("missing '{}'", response_key)))?;
    let envelope: Envelope<T> =
        serde_json::from_value(envelope).map_err(|e| UpstreamError::Decode(e.to_string()))?;

    let resp_result = envelope
        .resp_result
        .ok_or_else(|| UpstreamError::Decode("missing 'resp_result'".to_string()))?;

    match resp_result.resp_code {
        Some(RESP_CODE_OK) => Ok(resp_result.result),
        code => Err(UpstreamError::Api {
            code: code.map(|c| c.to_string()).unwrap_or_else(|| "N/A".to_string()),
            message: resp_result
                .resp_msg
                .unwrap_or_else(|| "Unknown response message".to_string()),
        }),
    }
}

/// Decodes a `productdetail.get` response into the first product's detail.
pub fn decode_detail(
    body: &str,
    product_id: &ProductKey,
    fallback_currency: &str,
) -> Result<ProductDetail, UpstreamError> {
    let result: Option<ProductResult> = unwrap_result(body, DETAIL_RESPONSE_KEY)?;

    let product = result
        .and_then(|r| r.products)
        .unwrap_or_default()
        .product
        .into_iter()
        .next()
        .ok_or(UpstreamError::NotFound)?;

    let price = product.target_sale_price.as_ref().map(|amount| Price {
        amount: value_to_string(amount),
        currency: product
            .target_sale_price_currency
            .clone()
            .unwrap_or_else(|| fallback_currency.to_string()),
    });

    Ok(ProductDetail::new(
        product
            .product_title
            .unwrap_or_else(|| format!("Product {}", product_id)),
        product.product_main_image_url,
        price,
    ))
}

/// Decodes a `link.generate` response into the promotion link for `source_url`.
///
/// When the API returns a single link without a matching `source_value`,
/// that link is used.
pub fn decode_link(body: &str, source_url: &str) -> Result<String, UpstreamError> {
    let result: Option<LinkGenerateResult> = unwrap_result(body, LINK_RESPONSE_KEY)?;

    let links: Vec<PromotionLink> = result
        .and_then(|r| r.promotion_links)
        .unwrap_or_default()
        .promotion_link
        .into_iter()
        .filter(|l| l.promotion_link.as_deref().is_some_and(|p| !p.is_empty()))
        .collect();

    let single = links.len() == 1;
    links
        .into_iter()
        .find(|l| single || l.source_value.as_deref() == Some(source_url))
        .and_then(|l| l.promotion_link)
        .ok_or(UpstreamError::NotFound)
}

fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn key() -> ProductKey {
        ProductKey::parse("1005001").unwrap()
    }

    fn detail_body(products: Value) -> String {
        json!({
            DETAIL_RESPONSE_KEY: {
                "resp_result": {
                    "resp_code": 200,
                    "resp_msg": "success",
                    "result": {"products": {"product": products}}
                }
            }
        })
        .to_string()
    }

    #[test]
    fn test_decode_detail_full_product() {
        let body = detail_body(json!([{
            "product_title": "Wireless earbuds",
            "product_main_image_url": "https://img/1.jpg",
            "target_sale_price": "9.99",
            "target_sale_price_currency": "EUR"
        }]));

        let detail = decode_detail(&body, &key(), "USD").unwrap();

        assert_eq!(detail.title, "Wireless earbuds");
        assert_eq!(detail.image_url.as_deref(), Some("https://img/1.jpg"));
        assert_eq!(
            detail.price,
            Some(Price {
                amount: "9.99".to_string(),
                currency: "EUR".to_string()
            })
        );
    }

    #[test]
    fn test_decode_detail_fallbacks() {
        let body = detail_body(json!([{"target_sale_price": 12.5}]));

        let detail = decode_detail(&body, &key(), "USD").unwrap();

        assert_eq!(detail.title, "Product 1005001");
        assert_eq!(detail.image_url, None);
        let price = detail.price.unwrap();
        assert_eq!(price.amount, "12.5");
        assert_eq!(price.currency, "USD");
    }

    #[test]
    fn test_decode_detail_empty_list_is_not_found() {
        let body = detail_body(json!([]));
        assert_eq!(decode_detail(&body, &key(), "USD"), Err(UpstreamError::NotFound));
    }

    #[test]
    fn test_error_response_maps_to_api_error() {
        let body = json!({
            "error_response": {"code": "IncompleteSignature", "msg": "bad sign"}
        })
        .to_string();

        assert_eq!(
            decode_detail(&body, &key(), "USD"),
            Err(UpstreamError::Api {
                code: "IncompleteSignature".to_string(),
                message: "bad sign".to_string()
            })
        );
    }

    #[test]
    fn test_non_200_resp_code_maps_to_api_error() {
        let body = json!({
            LINK_RESPONSE_KEY: {"resp_result": {"resp_code": 405, "resp_msg": "rate limited"}}
        })
        .to_string();

        assert_eq!(
            decode_link(&body, "https://x"),
            Err(UpstreamError::Api {
                code: "405".to_string(),
                message: "rate limited".to_string()
            })
        );
    }

    #[test]
    fn test_malformed_body_is_decode_error() {
        assert!(matches!(
            decode_link("<html>", "https://x"),
            Err(UpstreamError::Decode(_))
        ));
        assert!(matches!(
            decode_link("{}", "https://x"),
            Err(UpstreamError::Decode(_))
        ));
    }

    fn link_body(links: Value) -> String {
        json!({
            LINK_RESPONSE_KEY: {
                "resp_result": {
                    "resp_code": 200,
                    "result": {"promotion_links": {"promotion_link": links}}
                }
            }
        })
        .to_string()
    }

    #[test]
    fn test_decode_link_matches_source_value() {
        let body = link_body(json!([
            {"source_value": "https://a", "promotion_link": "https://s.click/a"},
            {"source_value": "https://b", "promotion_link": "https://s.click/b"}
        ]));

        assert_eq!(decode_link(&body, "https://b").unwrap(), "https://s.click/b");
        assert_eq!(decode_link(&body, "https://c"), Err(UpstreamError::NotFound));
    }

    #[test]
    fn test_decode_link_single_result_without_match() {
        let body = link_body(json!([
            {"source_value": "https://normalized", "promotion_link": "https://s.click/only"}
        ]));

        assert_eq!(decode_link(&body, "https://raw").unwrap(), "https://s.click/only");
    }

    #[test]
    fn test_decode_link_empty_is_not_found() {
        let body = link_body(json!([]));
        assert_eq!(decode_link(&body, "https://a"), Err(UpstreamError::NotFound));
    }
}
