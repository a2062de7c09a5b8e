// Integration tests for `TimeRangeStore` using wiremock.
#![allow(clippy::unwrap_used)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use serde_json::json;
use tokio_test::{assert_err, assert_ok};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use hunter_api::{
    ApiClient, Endpoints, Notification, NotificationLevel, Notifier, RequestError,
    StaticCredential,
};
use hunter_core::{ManualClock, TimeRange, TimeRangeStore};

const MAX_AGE: Duration = Duration::from_secs(6 * 60 * 60);
const T0: u64 = 1_704_067_200_000;

// ── Helpers ─────────────────────────────────────────────────────────

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn range_body(start: &str, end: &str) -> serde_json::Value {
    json!({
        "code": 10000,
        "msg": "请求成功",
        "data": {
            "startDate": start,
            "endDate": end,
            "startDateRaw": start.replace('-', ""),
            "endDateRaw": end.replace('-', "")
        }
    })
}

async fn setup() -> (MockServer, TimeRangeStore, Arc<ManualClock>) {
    let server = MockServer::start().await;
    let endpoints = Endpoints::resolve(Some(&format!("{}/api", server.uri())), None).unwrap();
    let api = ApiClient::with_client(
        reqwest::Client::new(),
        endpoints,
        Arc::new(StaticCredential::none()),
    );
    let clock = Arc::new(ManualClock::new(T0));
    let store = TimeRangeStore::with_clock(Arc::new(api), MAX_AGE, clock.clone());
    (server, store, clock)
}

#[derive(Default)]
struct RecordingNotifier(Mutex<Vec<Notification>>);

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        self.0.lock().unwrap().push(notification);
    }
}

async fn mount_range(server: &MockServer, start: &str, end: &str, calls: u64) {
    Mock::given(method("GET"))
        .and(path("/api/word-graph/time-range"))
        .respond_with(ResponseTemplate::new(200).set_body_json(range_body(start, end)))
        .up_to_n_times(calls)
        .expect(calls)
        .mount(server)
        .await;
}

// ── Scenarios ───────────────────────────────────────────────────────

#[tokio::test]
async fn test_empty_cache_fetches_then_derives_buckets() {
    let (server, store, _) = setup().await;
    mount_range(&server, "2024-01-01", "2024-01-31", 1).await;

    assert!(!store.is_valid());
    assert_eq!(store.fetched_at(), 0);
    assert_eq!(store.weekly_buckets().count(), 0);

    let range = assert_ok!(store.get_or_fetch(false).await);

    assert_eq!(range.start_date, Some(date(2024, 1, 1)));
    assert_eq!(range.end_date, Some(date(2024, 1, 31)));
    assert_eq!(range.start_date_raw.as_deref(), Some("20240101"));
    assert!(store.is_valid());
    assert_eq!(store.fetched_at(), T0);

    let buckets: Vec<_> = store.weekly_buckets().collect();
    assert_eq!(buckets.len(), 5);
    assert_eq!(buckets[0].label, "2024-01-01 ~ 2024-01-07");
}

#[tokio::test]
async fn test_fresh_cache_makes_no_request_stale_cache_makes_one() {
    let (server, store, clock) = setup().await;
    mount_range(&server, "2024-01-01", "2024-01-14", 1).await;

    store.get_or_fetch(false).await.unwrap();
    clock.advance(Duration::from_secs(60));
    store.get_or_fetch(false).await.unwrap();
    clock.advance(MAX_AGE - Duration::from_secs(61));
    store.get_or_fetch(false).await.unwrap();
    server.verify().await;

    // Exactly at max age the entry is stale.
    server.reset().await;
    mount_range(&server, "2024-01-08", "2024-01-21", 1).await;
    clock.advance(Duration::from_secs(1));
    assert!(!store.is_valid());

    let refreshed = store.get_or_fetch(false).await.unwrap();
    assert_eq!(refreshed.start_date, Some(date(2024, 1, 8)));
    assert_eq!(store.fetched_at(), T0 + 6 * 60 * 60 * 1000);
}

#[tokio::test]
async fn test_force_refresh_bypasses_valid_cache() {
    let (server, store, _) = setup().await;
    mount_range(&server, "2024-01-01", "2024-01-14", 2).await;

    store.get_or_fetch(false).await.unwrap();
    assert!(store.is_valid());
    store.get_or_fetch(true).await.unwrap();
}

#[tokio::test]
async fn test_failed_fetch_leaves_cache_untouched() {
    let (server, store, clock) = setup().await;
    mount_range(&server, "2024-01-01", "2024-01-14", 1).await;
    let before = store.get_or_fetch(false).await.unwrap();

    Mock::given(method("GET"))
        .and(path("/api/word-graph/time-range"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 10102,
            "msg": "没有可用的Cookie",
            "data": null
        })))
        .mount(&server)
        .await;

    clock.advance(MAX_AGE);
    let err = assert_err!(store.get_or_fetch(false).await);

    assert!(matches!(err, RequestError::Application { code: 10102, .. }));
    assert_eq!(store.time_range(), before);
    assert_eq!(store.fetched_at(), T0);
    assert_eq!(store.last_error().as_deref(), Some("application error 10102: 没有可用的Cookie"));
    assert!(!store.is_loading());

    // Expired but present: buckets still come from the old range.
    assert!(!store.is_valid());
    assert_eq!(store.weekly_buckets().count(), 2);
}

#[tokio::test]
async fn test_transport_failure_on_empty_cache_keeps_it_empty() {
    let (server, store, _) = setup().await;
    Mock::given(method("GET"))
        .and(path("/api/word-graph/time-range"))
        .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
        .mount(&server)
        .await;

    let err = assert_err!(store.get_or_fetch(false).await);

    assert!(matches!(err, RequestError::Transport(_)));
    assert!(err.is_transient());
    assert_eq!(store.time_range(), TimeRange::default());
    assert_eq!(store.fetched_at(), 0);
}

#[tokio::test]
async fn test_incomplete_range_is_never_valid() {
    let (server, store, _) = setup().await;
    Mock::given(method("GET"))
        .and(path("/api/word-graph/time-range"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 10000,
            "msg": "ok",
            "data": { "startDate": "2024-01-01", "endDate": null }
        })))
        .expect(2)
        .mount(&server)
        .await;

    let range = assert_ok!(store.get_or_fetch(false).await);
    assert_eq!(range.end_date, None);
    assert!(!store.is_valid());
    assert_eq!(store.weekly_buckets().count(), 0);

    store.get_or_fetch(false).await.unwrap();
}

#[tokio::test]
async fn test_invalidate_forces_next_fetch() {
    let (server, store, _) = setup().await;
    mount_range(&server, "2024-01-01", "2024-01-14", 2).await;

    store.get_or_fetch(false).await.unwrap();
    store.invalidate();

    assert_eq!(store.time_range(), TimeRange::default());
    assert_eq!(store.fetched_at(), 0);
    assert!(!store.is_valid());
    assert_eq!(store.weekly_buckets().count(), 0);

    store.get_or_fetch(false).await.unwrap();
    assert!(store.is_valid());
}

#[tokio::test]
async fn test_concurrent_fetches_share_one_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/word-graph/time-range"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(range_body("2024-01-01", "2024-01-31"))
                .set_delay(Duration::from_millis(200)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let endpoints = Endpoints::resolve(Some(&format!("{}/api", server.uri())), None).unwrap();
    let api = ApiClient::with_client(
        reqwest::Client::new(),
        endpoints,
        Arc::new(StaticCredential::none()),
    );
    let store = Arc::new(TimeRangeStore::with_clock(
        Arc::new(api),
        MAX_AGE,
        Arc::new(ManualClock::new(T0)),
    ));

    let (a, b, c) = tokio::join!(
        store.get_or_fetch(false),
        store.get_or_fetch(false),
        store.get_or_fetch(false),
    );

    let a = a.unwrap();
    assert_eq!(a, b.unwrap());
    assert_eq!(a, c.unwrap());
    assert_eq!(a.end_date, Some(date(2024, 1, 31)));
}

#[tokio::test]
async fn test_unauthorized_refetch_keeps_cache_and_warns_once() {
    let server = MockServer::start().await;
    mount_range(&server, "2024-01-01", "2024-01-14", 1).await;

    let endpoints = Endpoints::resolve(Some(&format!("{}/api", server.uri())), None).unwrap();
    let notifier = Arc::new(RecordingNotifier::default());
    let api = ApiClient::with_client(
        reqwest::Client::new(),
        endpoints,
        Arc::new(StaticCredential::new("stale-key")),
    )
    .with_notifier(notifier.clone());
    let clock = Arc::new(ManualClock::new(T0));
    let store = TimeRangeStore::with_clock(Arc::new(api), MAX_AGE, clock.clone());

    let before = assert_ok!(store.get_or_fetch(false).await);

    Mock::given(method("GET"))
        .and(path("/api/word-graph/time-range"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "code": 10401,
            "msg": "API Key 无效",
            "data": null
        })))
        .mount(&server)
        .await;

    clock.advance(MAX_AGE);
    let err = assert_err!(store.get_or_fetch(false).await);

    assert!(matches!(err, RequestError::Auth { status: 401, .. }));
    assert_eq!(store.time_range(), before);
    assert_eq!(store.fetched_at(), T0);

    let seen = notifier.0.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].level, NotificationLevel::Warning);
}
