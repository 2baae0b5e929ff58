//! Tests for page fetching and the item stream

use super::*;
use crate::decode::Page;
use crate::error::{Error, Result};
use async_trait::async_trait;
use futures::{StreamExt, TryStreamExt};
use pretty_assertions::assert_eq;
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use test_case::test_case;
use tokio_util::sync::CancellationToken;

// ============================================================================
// Scripted Transport
// ============================================================================

/// Serves canned bodies per request path and records every request
#[derive(Default)]
struct ScriptedTransport {
    responses: HashMap<String, std::result::Result<String, u16>>,
    requests: Mutex<Vec<String>>,
}

impl ScriptedTransport {
    fn new() -> Self {
        Self::default()
    }

    fn respond(mut self, path: &str, body: Value) -> Self {
        self.responses.insert(path.to_string(), Ok(body.to_string()));
        self
    }

    fn respond_raw(mut self, path: &str, body: &str) -> Self {
        self.responses.insert(path.to_string(), Ok(body.to_string()));
        self
    }

    fn fail(mut self, path: &str, status: u16) -> Self {
        self.responses.insert(path.to_string(), Err(status));
        self
    }

    fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn get(&self, endpoint: &str, cancel: &CancellationToken) -> Result<String> {
        self.requests.lock().unwrap().push(endpoint.to_string());
        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }
        match self.responses.get(endpoint) {
            Some(Ok(body)) => Ok(body.clone()),
            Some(Err(status)) => Err(Error::http_status(*status, "scripted failure")),
            None => Err(Error::http_status(404, endpoint)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
struct Item {
    id: String,
}

fn page(ids: &[&str], cursor: Option<&str>) -> Value {
    let items: Vec<Value> = ids.iter().map(|id| json!({ "id": id })).collect();
    json!({ "code": "Success", "data": { "items": items, "next_cursor": cursor } })
}

fn ids(items: &[Item]) -> Vec<&str> {
    items.iter().map(|item| item.id.as_str()).collect()
}

fn fetcher(transport: &Arc<ScriptedTransport>) -> PaginatedFetcher {
    PaginatedFetcher::new(Arc::clone(transport) as Arc<dyn Transport>)
}

/// Let spawned page tasks run
async fn settle() {
    tokio::time::sleep(Duration::from_millis(20)).await;
}

// ============================================================================
// Request Shape Tests
// ============================================================================

#[test_case("/items", None, "/items?limit=100" ; "first page")]
#[test_case("/items", Some("c1"), "/items?limit=100&cursor=c1" ; "with cursor")]
#[test_case("/items", Some("  "), "/items?limit=100" ; "blank cursor")]
#[test_case("/items", Some("a b/c+="), "/items?limit=100&cursor=a+b%2Fc%2B%3D" ; "encoded cursor")]
#[test_case("/items?schema=x", Some("c1"), "/items?schema=x&limit=100&cursor=c1" ; "existing query")]
fn test_paginated_endpoint(endpoint: &str, cursor: Option<&str>, expected: &str) {
    assert_eq!(paginated_endpoint(endpoint, PAGE_SIZE, cursor), expected);
}

#[tokio::test]
async fn test_fetch_single_page() {
    let transport = Arc::new(
        ScriptedTransport::new().respond("/items?limit=100&cursor=c9", page(&["x"], Some("c10"))),
    );
    let pages = PageFetcher::new(Arc::clone(&transport) as Arc<dyn Transport>);

    let result: Page<Item> = pages
        .fetch_page("/items", Some("c9"), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(ids(&result.items), vec!["x"]);
    assert_eq!(result.next_cursor, Some("c10".to_string()));
}

// ============================================================================
// Item Stream Tests
// ============================================================================

#[tokio::test]
async fn test_two_page_chain_in_order() {
    let transport = Arc::new(
        ScriptedTransport::new()
            .respond("/items?limit=100", page(&["A", "B"], Some("c1")))
            .respond("/items?limit=100&cursor=c1", page(&["C"], None)),
    );

    let items: Vec<Item> = fetcher(&transport)
        .fetch_all("/items", &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(ids(&items), vec!["A", "B", "C"]);
    assert_eq!(
        transport.requests(),
        vec!["/items?limit=100", "/items?limit=100&cursor=c1"]
    );
}

#[tokio::test]
async fn test_many_pages_yield_every_item_once() {
    let transport = Arc::new(
        ScriptedTransport::new()
            .respond("/items?limit=100", page(&["1", "2", "3"], Some("p2")))
            .respond("/items?limit=100&cursor=p2", page(&[], Some("p3")))
            .respond("/items?limit=100&cursor=p3", page(&["4", "5"], Some("p4")))
            .respond("/items?limit=100&cursor=p4", page(&["6", "7", "8", "9", "10"], Some(""))),
    );

    let items: Vec<Item> = fetcher(&transport)
        .fetch_all("/items", &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(
        ids(&items),
        vec!["1", "2", "3", "4", "5", "6", "7", "8", "9", "10"]
    );
    assert_eq!(transport.requests().len(), 4);
}

#[tokio::test]
async fn test_stream_reports_endpoint_and_page_count() {
    let transport = Arc::new(
        ScriptedTransport::new()
            .respond("/items?limit=100", page(&["a"], Some("c1")))
            .respond("/items?limit=100&cursor=c1", page(&["b"], None)),
    );
    let fetcher = fetcher(&transport);
    let mut stream = fetcher.fetch_items::<Item>("/items", &CancellationToken::new());

    assert_eq!(stream.endpoint(), "/items");
    assert_eq!(stream.pages_received(), 0);

    stream.next().await.unwrap().unwrap();
    assert_eq!(stream.pages_received(), 1);

    let rest: Vec<Item> = (&mut stream).try_collect().await.unwrap();
    assert_eq!(ids(&rest), vec!["b"]);
    assert_eq!(stream.pages_received(), 2);

    // The page fetcher behind the stream resumes from any cursor on its own.
    let resumed: Page<Item> = fetcher
        .pages()
        .fetch_page("/items", Some("c1"), &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(ids(&resumed.items), vec!["b"]);
    assert!(!resumed.has_next());
}

#[tokio::test]
async fn test_single_page_one_request() {
    let transport =
        Arc::new(ScriptedTransport::new().respond("/items?limit=100", page(&["only"], None)));

    let items: Vec<Item> = fetcher(&transport)
        .fetch_all("/items", &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(ids(&items), vec!["only"]);
    assert_eq!(transport.requests().len(), 1);
}

#[tokio::test]
async fn test_absent_payload_is_empty() {
    let bodies = [
        "null",
        r#"{"data": null}"#,
        r#"{"data": {"items": null, "next_cursor": null}}"#,
    ];

    for body in bodies {
        let transport = Arc::new(ScriptedTransport::new().respond_raw("/items?limit=100", body));

        let items: Vec<Item> = fetcher(&transport)
            .fetch_all("/items", &CancellationToken::new())
            .await
            .unwrap();

        assert!(items.is_empty(), "expected no items for {body}");
        assert_eq!(transport.requests().len(), 1);
    }
}

#[tokio::test]
async fn test_first_page_requested_before_polling() {
    let transport =
        Arc::new(ScriptedTransport::new().respond("/items?limit=100", page(&["A"], None)));

    let stream = fetcher(&transport).fetch_items::<Item>("/items", &CancellationToken::new());
    settle().await;

    assert_eq!(transport.requests(), vec!["/items?limit=100"]);
    assert_eq!(stream.pages_received(), 0);
}

#[tokio::test]
async fn test_next_page_requested_before_current_is_consumed() {
    let transport = Arc::new(
        ScriptedTransport::new()
            .respond("/items?limit=100", page(&["A", "B"], Some("c1")))
            .respond("/items?limit=100&cursor=c1", page(&["C"], Some("c2")))
            .respond("/items?limit=100&cursor=c2", page(&["D"], None)),
    );

    let mut stream = fetcher(&transport).fetch_items::<Item>("/items", &CancellationToken::new());

    let first = stream.next().await.unwrap().unwrap();
    assert_eq!(first.id, "A");
    settle().await;

    // Page 2 is in flight while page 1 still has "B" pending, page 3 is not.
    assert_eq!(
        transport.requests(),
        vec!["/items?limit=100", "/items?limit=100&cursor=c1"]
    );

    let rest: Vec<Item> = stream.try_collect().await.unwrap();
    assert_eq!(ids(&rest), vec!["B", "C", "D"]);
    assert_eq!(transport.requests().len(), 3);
}

#[tokio::test]
async fn test_each_call_restarts_the_chain() {
    let transport = Arc::new(
        ScriptedTransport::new()
            .respond("/items?limit=100", page(&["A"], Some("c1")))
            .respond("/items?limit=100&cursor=c1", page(&["B"], None)),
    );
    let fetcher = fetcher(&transport);
    let cancel = CancellationToken::new();

    let first: Vec<Item> = fetcher.fetch_all("/items", &cancel).await.unwrap();
    let second: Vec<Item> = fetcher.fetch_all("/items", &cancel).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(transport.requests().len(), 4);
}

// ============================================================================
// Cancellation Tests
// ============================================================================

#[tokio::test]
async fn test_cancel_mid_page_stops_yielding() {
    let transport = Arc::new(
        ScriptedTransport::new()
            .respond("/items?limit=100", page(&["A", "B", "C"], Some("c1")))
            .respond("/items?limit=100&cursor=c1", page(&["D"], None)),
    );
    let cancel = CancellationToken::new();
    let mut stream = fetcher(&transport).fetch_items::<Item>("/items", &cancel);

    let mut delivered = Vec::new();
    delivered.push(stream.next().await.unwrap().unwrap());
    delivered.push(stream.next().await.unwrap().unwrap());
    cancel.cancel();

    let err = stream.next().await.unwrap().unwrap_err();
    assert!(err.is_cancelled());
    assert!(stream.next().await.is_none());
    assert_eq!(ids(&delivered), vec!["A", "B"]);
}

#[tokio::test]
async fn test_cancel_before_first_item() {
    let transport =
        Arc::new(ScriptedTransport::new().respond("/items?limit=100", page(&["A"], None)));
    let cancel = CancellationToken::new();
    cancel.cancel();

    let mut stream = fetcher(&transport).fetch_items::<Item>("/items", &cancel);

    assert!(stream.next().await.unwrap().unwrap_err().is_cancelled());
    assert!(stream.next().await.is_none());
}

#[tokio::test]
async fn test_cancel_between_pages() {
    let transport = Arc::new(
        ScriptedTransport::new()
            .respond("/items?limit=100", page(&["A"], Some("c1")))
            .respond("/items?limit=100&cursor=c1", page(&["B"], None)),
    );
    let cancel = CancellationToken::new();
    let mut stream = fetcher(&transport).fetch_items::<Item>("/items", &cancel);

    assert_eq!(stream.next().await.unwrap().unwrap().id, "A");
    cancel.cancel();

    let results: Vec<Result<Item>> = stream.collect().await;
    assert_eq!(results.len(), 1);
    assert!(matches!(results[0], Err(Error::Cancelled)));
}

// ============================================================================
// Failure Tests
// ============================================================================

#[tokio::test]
async fn test_failed_page_ends_stream_after_delivered_items() {
    let transport = Arc::new(
        ScriptedTransport::new()
            .respond("/items?limit=100", page(&["A", "B"], Some("c1")))
            .fail("/items?limit=100&cursor=c1", 500),
    );

    let results: Vec<Result<Item>> = fetcher(&transport)
        .fetch_items("/items", &CancellationToken::new())
        .collect()
        .await;

    assert_eq!(results.len(), 3);
    assert_eq!(results[0].as_ref().unwrap().id, "A");
    assert_eq!(results[1].as_ref().unwrap().id, "B");
    assert!(matches!(
        results[2],
        Err(Error::HttpStatus { status: 500, .. })
    ));
}

#[tokio::test]
async fn test_first_page_failure() {
    let transport = Arc::new(ScriptedTransport::new().fail("/items?limit=100", 401));

    let err = fetcher(&transport)
        .fetch_all::<Item>("/items", &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, Error::HttpStatus { status: 401, .. }));
}

#[tokio::test]
async fn test_decode_failure_on_later_page() {
    let transport = Arc::new(
        ScriptedTransport::new()
            .respond("/items?limit=100", page(&["A"], Some("c1")))
            .respond_raw("/items?limit=100&cursor=c1", "<html>gateway</html>"),
    );

    let results: Vec<Result<Item>> = fetcher(&transport)
        .fetch_items("/items", &CancellationToken::new())
        .collect()
        .await;

    assert_eq!(results.len(), 2);
    assert!(results[0].is_ok());
    assert!(results[1].as_ref().unwrap_err().is_decode());
}

// ============================================================================
// Non-Paginated Fetch Tests
// ============================================================================

#[tokio::test]
async fn test_non_paginated_fetch() {
    let transport = Arc::new(
        ScriptedTransport::new().respond("/items/x", json!({ "data": { "id": "x" } })),
    );
    let single = NonPaginatedFetcher::new(Arc::clone(&transport) as Arc<dyn Transport>);

    let item: Option<Item> = single
        .fetch("/items/x", &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(item, Some(Item { id: "x".to_string() }));
    assert_eq!(transport.requests(), vec!["/items/x"]);
}

#[tokio::test]
async fn test_non_paginated_fetch_absent_data() {
    let transport =
        Arc::new(ScriptedTransport::new().respond("/items/x", json!({ "data": null })));
    let single = NonPaginatedFetcher::new(Arc::clone(&transport) as Arc<dyn Transport>);

    let item: Option<Item> = single
        .fetch("/items/x", &CancellationToken::new())
        .await
        .unwrap();

    assert!(item.is_none());
}
