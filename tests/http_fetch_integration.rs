//! The HTTP page source against a local stand-in for `buglist.cgi`.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::Router;
use bugdash::config::UpstreamConfig;
use bugdash::errors::{Error, ErrorClass};
use bugdash::fetch::{HttpPageSource, PageSource};
use bugdash::scheduler::run_cycle;
use bugdash::testkit::{csv_page, record};
use bugdash::Record;
use parking_lot::Mutex;
use pretty_assertions::assert_eq;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

const CEILING: usize = 3;

#[derive(Clone)]
struct Upstream {
    records: Arc<Vec<Record>>,
    seen: Arc<Mutex<Vec<HashMap<String, String>>>>,
}

async fn buglist(
    State(upstream): State<Upstream>,
    Query(params): Query<HashMap<String, String>>,
) -> String {
    let after: u64 = params
        .get("v2")
        .and_then(|v| v.parse().ok())
        .unwrap_or(0);
    upstream.seen.lock().push(params);
    let page: Vec<Record> = upstream
        .records
        .iter()
        .filter(|r| r.id > after)
        .take(CEILING)
        .cloned()
        .collect();
    csv_page(&page)
}

async fn broken() -> (StatusCode, &'static str) {
    (StatusCode::INTERNAL_SERVER_ERROR, "database is down")
}

async fn slow() -> String {
    tokio::time::sleep(Duration::from_secs(10)).await;
    csv_page(&[])
}

async fn start_upstream(records: Vec<Record>) -> (SocketAddr, Upstream) {
    let upstream = Upstream {
        records: Arc::new(records),
        seen: Arc::default(),
    };
    let app = Router::new()
        .route("/buglist.cgi", get(buglist))
        .route("/broken.cgi", get(broken))
        .route("/slow.cgi", get(slow))
        .with_state(upstream.clone());
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (addr, upstream)
}

fn source_for(url: String, timeout_secs: u64) -> HttpPageSource {
    HttpPageSource::new(&UpstreamConfig {
        base_url: url,
        request_timeout_secs: timeout_secs,
        ..UpstreamConfig::default()
    })
    .unwrap()
}

#[tokio::test]
async fn test_cycle_over_http_walks_all_pages() {
    let records: Vec<Record> = (1..=7)
        .map(|id| record(id * 10, if id < 4 { "M5" } else { "M6" }, "Core", "NEW"))
        .collect();
    let (addr, upstream) = start_upstream(records).await;
    let source = source_for(format!("http://{addr}/buglist.cgi?ctype=csv&human=1"), 5);

    let aggregate = run_cycle(&source, CEILING, |_, _| {}).await.unwrap();

    assert_eq!(aggregate.record_count(), 7);
    assert_eq!(aggregate.milestone.get("M5"), 3);
    assert_eq!(aggregate.milestone.get("M6"), 4);

    let seen = upstream.seen.lock();
    let cursors: Vec<&str> = seen.iter().map(|p| p["v2"].as_str()).collect();
    assert_eq!(cursors, vec!["0", "30", "60"]);
    assert!(seen.iter().all(|p| p["f2"] == "bug_id" && p["o2"] == "greaterthan"));
    assert!(seen.iter().all(|p| p["ctype"] == "csv"));
}

#[tokio::test]
async fn test_error_status_is_network_failure() {
    let (addr, _) = start_upstream(Vec::new()).await;
    let source = source_for(format!("http://{addr}/broken.cgi?ctype=csv"), 5);

    let err = source.fetch_page(0).await.unwrap_err();
    assert!(matches!(err, Error::UpstreamStatus { status: 500, .. }));
    assert_eq!(err.class(), ErrorClass::Network);
}

#[tokio::test]
async fn test_slow_upstream_times_out() {
    let (addr, _) = start_upstream(Vec::new()).await;
    let source = source_for(format!("http://{addr}/slow.cgi"), 1);

    let err = source.fetch_page(0).await.unwrap_err();
    assert!(err.is_timeout(), "unexpected error: {err}");
    assert_eq!(err.class(), ErrorClass::Network);
}

#[tokio::test]
async fn test_unreachable_upstream_is_network_failure() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let source = source_for(format!("http://{addr}/buglist.cgi"), 2);

    let err = source.fetch_page(0).await.unwrap_err();
    assert!(matches!(err, Error::Transport { .. }));
    assert_eq!(err.class(), ErrorClass::Network);
}
