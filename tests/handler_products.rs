mod common;

use aliexpress_deals::api::handlers::{
    flush_cache_handler, get_product_handler, invalidate_product_handler,
};
use aliexpress_deals::state::AppState;
use axum::{
    Router,
    http::StatusCode,
    routing::{get, post},
};
use axum_test::TestServer;
use common::{StubResolver, StubUpstream};
use std::sync::Arc;

fn app(state: AppState) -> TestServer {
    let app = Router::new()
        .route(
            "/api/products/{id}",
            get(get_product_handler).delete(invalidate_product_handler),
        )
        .route("/api/cache/flush", post(flush_cache_handler))
        .with_state(state);

    TestServer::new(app).unwrap()
}

#[tokio::test]
async fn test_get_product_with_default_variants() {
    let upstream = Arc::new(StubUpstream::new());
    let server = app(common::create_test_state(upstream.clone(), StubResolver::new()));

    let response = server.get("/api/products/1005001").await;

    response.assert_status_ok();

    let json = response.json::<serde_json::Value>();
    assert_eq!(json["product_id"], "1005001");
    assert_eq!(json["status"], "ok");
    assert_eq!(json["bundle"]["detail"]["title"], "Product 1005001");
    assert_eq!(json["bundle"]["links"].as_array().unwrap().len(), 3);
    assert_eq!(upstream.link_calls(), 3);
}

#[tokio::test]
async fn test_get_product_with_subset_uses_cache() {
    let upstream = Arc::new(StubUpstream::new());
    let server = app(common::create_test_state(upstream.clone(), StubResolver::new()));

    server.get("/api/products/55").await.assert_status_ok();

    let response = server
        .get("/api/products/55")
        .add_query_param("variants", "bigsave,coin")
        .await;

    response.assert_status_ok();

    let json = response.json::<serde_json::Value>();
    let links = json["bundle"]["links"].as_array().unwrap();
    assert_eq!(links.len(), 2);
    assert_eq!(links[0]["variant"], "coin");
    assert_eq!(links[1]["variant"], "bigsave");
    assert_eq!(upstream.detail_calls(), 1);
}

#[tokio::test]
async fn test_get_product_rejects_non_numeric_id() {
    let server = app(common::create_test_state(
        Arc::new(StubUpstream::new()),
        StubResolver::new(),
    ));

    let response = server.get("/api/products/abc123").await;

    response.assert_status_bad_request();

    let json = response.json::<serde_json::Value>();
    assert_eq!(json["error"]["code"], "validation_error");
    assert_eq!(json["error"]["details"]["product_id"], "abc123");
}

#[tokio::test]
async fn test_get_product_rejects_unknown_variant() {
    let server = app(common::create_test_state(
        Arc::new(StubUpstream::new()),
        StubResolver::new(),
    ));

    let response = server
        .get("/api/products/1")
        .add_query_param("variants", "coin,mystery")
        .await;

    response.assert_status_bad_request();

    let json = response.json::<serde_json::Value>();
    assert!(json["error"]["message"].as_str().unwrap().contains("mystery"));
    assert_eq!(json["error"]["details"]["allowed"].as_array().unwrap().len(), 6);
}

#[tokio::test]
async fn test_get_product_upstream_down_returns_503() {
    let server = app(common::create_test_state(
        Arc::new(StubUpstream::new().failing("9")),
        StubResolver::new(),
    ));

    let response = server.get("/api/products/9").await;

    response.assert_status(StatusCode::SERVICE_UNAVAILABLE);

    let json = response.json::<serde_json::Value>();
    assert_eq!(json["error"]["code"], "service_unavailable");
    assert_eq!(json["error"]["details"]["product_id"], "9");
}

#[tokio::test]
async fn test_get_product_without_links_reports_no_offers() {
    let server = app(common::create_test_state(
        Arc::new(StubUpstream::new().without_links("8")),
        StubResolver::new(),
    ));

    let response = server.get("/api/products/8").await;

    response.assert_status_ok();

    let json = response.json::<serde_json::Value>();
    assert_eq!(json["status"], "no_offers");
    assert_eq!(json["bundle"]["links"][0]["status"], "failed");
}

#[tokio::test]
async fn test_invalidate_product() {
    let upstream = Arc::new(StubUpstream::new());
    let state = common::create_test_state(upstream.clone(), StubResolver::new());
    let server = app(state.clone());

    server.get("/api/products/7").await.assert_status_ok();
    assert!(state.cache().contains(&common::key("7")));

    let response = server.delete("/api/products/7").await;

    response.assert_status_ok();
    let json = response.json::<serde_json::Value>();
    assert_eq!(json["product_id"], "7");
    assert_eq!(json["invalidated"], true);
    assert!(!state.cache().contains(&common::key("7")));

    server.get("/api/products/7").await.assert_status_ok();
    assert_eq!(upstream.detail_calls(), 2);
}

#[tokio::test]
async fn test_invalidate_missing_product_returns_404() {
    let server = app(common::create_test_state(
        Arc::new(StubUpstream::new()),
        StubResolver::new(),
    ));

    let response = server.delete("/api/products/404").await;

    response.assert_status_not_found();

    let json = response.json::<serde_json::Value>();
    assert_eq!(json["error"]["code"], "not_found");
}

#[tokio::test]
async fn test_flush_cache() {
    let state = common::create_test_state(Arc::new(StubUpstream::new()), StubResolver::new());
    state
        .resolved_urls
        .insert("https://a.aliexpress.com/_x", "https://www.aliexpress.com/item/1.html");
    let server = app(state.clone());

    server.get("/api/products/1").await.assert_status_ok();
    server.get("/api/products/2").await.assert_status_ok();

    let response = server.post("/api/cache/flush").await;

    response.assert_status_ok();
    let json = response.json::<serde_json::Value>();
    assert_eq!(json["flushed"], 2);
    assert_eq!(json["resolved_urls_flushed"], 1);
    assert_eq!(state.cache().stats().entries, 0);
}
