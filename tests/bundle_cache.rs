mod common;

use aliexpress_deals::domain::BundleError;
use aliexpress_deals::domain::entities::{LinkVariant, VariantSet};
use common::StubUpstream;
use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;

#[tokio::test(start_paused = true)]
async fn test_concurrent_requests_share_one_build() {
    let upstream = Arc::new(StubUpstream::new().with_detail_delay(Duration::from_millis(500)));
    let cache = common::create_test_cache(upstream.clone(), common::TTL);
    let id = common::key("1005001");
    let variants = common::default_variants();

    let results = join_all((0..50).map(|_| cache.get_or_build(&id, &variants))).await;

    assert!(results.iter().all(|r| r.is_ok()));
    let first = results[0].as_ref().unwrap();
    assert!(results.iter().all(|r| r.as_ref().unwrap() == first));

    assert_eq!(upstream.detail_calls(), 1);
    assert_eq!(upstream.link_calls(), variants.len());
    assert_eq!(cache.in_flight_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_concurrent_failure_is_shared_and_not_cached() {
    let upstream = Arc::new(
        StubUpstream::new()
            .failing("13")
            .with_detail_delay(Duration::from_millis(200)),
    );
    let cache = common::create_test_cache(upstream.clone(), common::TTL);
    let id = common::key("13");
    let variants = common::default_variants();

    let results = join_all((0..10).map(|_| cache.get_or_build(&id, &variants))).await;

    assert!(
        results
            .iter()
            .all(|r| matches!(r, Err(BundleError::UpstreamUnavailable { .. })))
    );
    assert_eq!(upstream.detail_calls(), 1);
    assert!(!cache.contains(&id));

    let _ = cache.get_or_build(&id, &variants).await;
    assert_eq!(upstream.detail_calls(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_entry_expires_after_ttl() {
    let upstream = Arc::new(StubUpstream::new());
    let cache = common::create_test_cache(upstream.clone(), Duration::from_secs(2));
    let id = common::key("21");
    let variants = common::default_variants();

    cache.get_or_build(&id, &variants).await.unwrap();

    tokio::time::advance(Duration::from_millis(1999)).await;
    cache.get_or_build(&id, &variants).await.unwrap();
    assert_eq!(upstream.detail_calls(), 1);

    tokio::time::advance(Duration::from_millis(1)).await;
    cache.get_or_build(&id, &variants).await.unwrap();
    assert_eq!(upstream.detail_calls(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_links_keep_canonical_order_when_completing_out_of_order() {
    let upstream = Arc::new(
        StubUpstream::new()
            .with_link_delay(LinkVariant::CoinOffer, Duration::from_millis(300))
            .with_link_delay(LinkVariant::SuperDeal, Duration::from_millis(100))
            .with_link_delay(LinkVariant::LimitedOffer, Duration::from_millis(10)),
    );
    let cache = common::create_test_cache(upstream, common::TTL);
    let variants: VariantSet = [
        LinkVariant::LimitedOffer,
        LinkVariant::CoinOffer,
        LinkVariant::SuperDeal,
    ]
    .into_iter()
    .collect();

    let bundle = cache
        .get_or_build(&common::key("3"), &variants)
        .await
        .unwrap();

    let order: Vec<_> = bundle.links.iter().map(|l| l.variant).collect();
    assert_eq!(
        order,
        vec![
            LinkVariant::CoinOffer,
            LinkVariant::SuperDeal,
            LinkVariant::LimitedOffer
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn test_slow_link_call_times_out_individually() {
    let upstream = Arc::new(
        StubUpstream::new().with_link_delay(LinkVariant::BigSave, common::CALL_TIMEOUT * 2),
    );
    let cache = common::create_test_cache(upstream, common::TTL);

    let bundle = cache
        .get_or_build(&common::key("4"), &common::default_variants())
        .await
        .unwrap();

    assert_eq!(bundle.resolved_count(), 2);
    let big_save = bundle
        .links
        .iter()
        .find(|l| l.variant == LinkVariant::BigSave)
        .unwrap();
    assert!(!big_save.is_resolved());
}

#[tokio::test(start_paused = true)]
async fn test_distinct_products_build_independently() {
    let upstream = Arc::new(StubUpstream::new().with_detail_delay(Duration::from_millis(100)));
    let cache = common::create_test_cache(upstream.clone(), common::TTL);
    let variants = common::default_variants();
    let ids: Vec<_> = ["1", "2", "3", "1", "2", "3"]
        .into_iter()
        .map(common::key)
        .collect();

    let results = join_all(ids.iter().map(|id| cache.get_or_build(id, &variants))).await;

    assert!(results.iter().all(|r| r.is_ok()));
    assert_eq!(upstream.detail_calls(), 3);
    assert_eq!(cache.stats().entries, 3);
}
