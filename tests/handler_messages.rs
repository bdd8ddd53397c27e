mod common;

use aliexpress_deals::api::handlers::messages_handler;
use axum::{Router, routing::post};
use axum_test::TestServer;
use common::{StubResolver, StubUpstream};
use serde_json::json;
use std::sync::Arc;

fn server(upstream: Arc<StubUpstream>, resolver: StubResolver) -> TestServer {
    let state = common::create_test_state(upstream, resolver);
    let app = Router::new()
        .route("/api/messages", post(messages_handler))
        .with_state(state);

    TestServer::new(app).unwrap()
}

#[tokio::test]
async fn test_message_with_product_link() {
    let server = server(Arc::new(StubUpstream::new()), StubResolver::new());

    let response = server
        .post("/api/messages")
        .json(&json!({
            "text": "check this https://www.aliexpress.com/item/1005001.html?spm=abc"
        }))
        .await;

    response.assert_status_ok();

    let json = response.json::<serde_json::Value>();
    assert_eq!(json["summary"]["total"], 1);
    assert_eq!(json["summary"]["successful"], 1);
    assert_eq!(json["summary"]["failed"], 0);

    let items = json["items"].as_array().unwrap();
    assert_eq!(items[0]["product_id"], "1005001");
    assert_eq!(items[0]["status"], "ok");

    let caption = items[0]["caption"].as_str().unwrap();
    assert!(caption.starts_with("<b>Product 1005001</b>"));
    assert!(caption.contains("<b>Price:</b> 9.99 USD"));
    assert!(caption.contains("<b>Available offers:</b>"));

    let links = items[0]["bundle"]["links"].as_array().unwrap();
    let variants: Vec<_> = links.iter().map(|l| l["variant"].as_str().unwrap()).collect();
    assert_eq!(variants, vec!["coin", "super", "bigsave"]);
}

#[tokio::test]
async fn test_message_resolves_short_links_and_dedupes() {
    let upstream = Arc::new(StubUpstream::new());
    let resolver = StubResolver::new().with(
        "https://s.click.aliexpress.com/e/_DdwUZVd",
        "https://www.aliexpress.us/item/777.html",
    );
    let server = server(upstream.clone(), resolver);

    let response = server
        .post("/api/messages")
        .json(&json!({
            "text": "https://s.click.aliexpress.com/e/_DdwUZVd and again https://www.aliexpress.com/item/777.html"
        }))
        .await;

    response.assert_status_ok();

    let json = response.json::<serde_json::Value>();
    assert_eq!(json["summary"]["total"], 1);
    assert_eq!(json["items"][0]["product_id"], "777");
    assert_eq!(upstream.detail_calls(), 1);
}

#[tokio::test]
async fn test_message_reports_unavailable_product() {
    let server = server(
        Arc::new(StubUpstream::new().failing("2")),
        StubResolver::new(),
    );

    let response = server
        .post("/api/messages")
        .json(&json!({
            "text": "https://www.aliexpress.com/item/1.html https://www.aliexpress.com/item/2.html"
        }))
        .await;

    response.assert_status_ok();

    let json = response.json::<serde_json::Value>();
    assert_eq!(json["summary"]["total"], 2);
    assert_eq!(json["summary"]["successful"], 1);
    assert_eq!(json["summary"]["failed"], 1);
    assert_eq!(json["items"][1]["status"], "unavailable");
    assert!(json["items"][1].get("bundle").is_none());
}

#[tokio::test]
async fn test_message_without_links_is_rejected() {
    let server = server(Arc::new(StubUpstream::new()), StubResolver::new());

    let response = server
        .post("/api/messages")
        .json(&json!({ "text": "no links here" }))
        .await;

    response.assert_status_bad_request();

    let json = response.json::<serde_json::Value>();
    assert_eq!(json["error"]["code"], "validation_error");
}

#[tokio::test]
async fn test_message_with_unresolvable_short_link_only() {
    let server = server(Arc::new(StubUpstream::new()), StubResolver::new());

    let response = server
        .post("/api/messages")
        .json(&json!({ "text": "https://a.aliexpress.com/_mKqpLdF" }))
        .await;

    response.assert_status_bad_request();

    let json = response.json::<serde_json::Value>();
    assert_eq!(
        json["error"]["details"]["unresolved"][0],
        "https://a.aliexpress.com/_mKqpLdF"
    );
}

#[tokio::test]
async fn test_empty_message_fails_validation() {
    let server = server(Arc::new(StubUpstream::new()), StubResolver::new());

    let response = server
        .post("/api/messages")
        .json(&json!({ "text": "" }))
        .await;

    response.assert_status_bad_request();

    let json = response.json::<serde_json::Value>();
    assert_eq!(json["error"]["code"], "validation_error");
    assert!(json["error"]["details"]["fields"].get("text").is_some());
}
