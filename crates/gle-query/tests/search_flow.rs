//! End-to-end query runs against a scripted transport.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use gle_query::{
    ClientConfig, Completion, HttpResponse, LogCatalogResolver, LogSearch, MessageWriter,
    QueryError, ResultRetriever, SearchRequest, Transport,
};
use serde_json::{Value, json};
use tokio::time::Instant;

// ==================== Helpers ====================

#[derive(Debug, Clone)]
struct Seen {
    method: &'static str,
    url: String,
    at: Instant,
}

/// Replays responses in order and records what was asked.
#[derive(Debug, Default)]
struct ScriptedTransport {
    script: Mutex<VecDeque<HttpResponse>>,
    seen: Mutex<Vec<Seen>>,
}

impl ScriptedTransport {
    fn new() -> Self {
        Self::default()
    }

    fn then(self, status: u16, body: Value) -> Self {
        self.script
            .lock()
            .expect("lock")
            .push_back(HttpResponse::new(status, body.to_string()));
        self
    }

    fn seen(&self) -> Vec<Seen> {
        self.seen.lock().expect("lock").clone()
    }

    fn answer(&self, method: &'static str, url: &str) -> gle_query::Result<HttpResponse> {
        self.seen.lock().expect("lock").push(Seen {
            method,
            url: url.to_string(),
            at: Instant::now(),
        });
        self.script
            .lock()
            .expect("lock")
            .pop_front()
            .ok_or_else(|| QueryError::transport("script exhausted"))
    }
}

impl Transport for ScriptedTransport {
    async fn get(&self, url: &str) -> gle_query::Result<HttpResponse> {
        self.answer("GET", url)
    }

    async fn post_json(&self, url: &str, _body: Vec<u8>) -> gle_query::Result<HttpResponse> {
        self.answer("POST", url)
    }
}

fn catalog() -> Value {
    json!({"logs": [{"id": "1", "name": "app"}, {"id": "2", "name": "db"}]})
}

fn events(messages: &[&str]) -> Vec<Value> {
    messages
        .iter()
        .map(|m| json!({"log_id": "2", "message": m, "timestamp": 1_570_665_600_000_i64, "sequence_number": 1, "labels": []}))
        .collect()
}

fn link(href: &str) -> Value {
    json!([{"href": href, "rel": "Self"}])
}

fn search(start: &str) -> SearchRequest {
    SearchRequest::new("db", "where(status=500)", start, "2019-10-11 00:00:00")
}

fn lines(buf: Vec<u8>) -> Vec<String> {
    String::from_utf8(buf)
        .expect("utf8")
        .lines()
        .map(str::to_string)
        .collect()
}

// ==================== Catalog ====================

#[tokio::test]
async fn test_resolve_picks_matching_id() {
    let transport = ScriptedTransport::new().then(200, catalog());
    let config = ClientConfig::default();

    let entry = LogCatalogResolver::new(&transport, &config)
        .resolve("db")
        .await
        .expect("should resolve");

    assert_eq!(entry.id, "2");
}

#[tokio::test]
async fn test_missing_log_issues_no_query() {
    let transport = ScriptedTransport::new().then(200, catalog());
    let config = ClientConfig::default();
    let mut out = MessageWriter::new(Vec::new());

    let err = LogSearch::new(&transport, &config)
        .run(
            &SearchRequest::new("missing", "", "2019-10-10 00:00:00", "2019-10-11 00:00:00"),
            &mut out,
        )
        .await
        .expect_err("should fail");

    assert!(matches!(err, QueryError::LogNotFound { .. }));
    assert!(transport.seen().iter().all(|s| s.method != "POST"));
}

// ==================== Full runs ====================

#[tokio::test(start_paused = true)]
async fn test_immediate_results_print_every_message() {
    let transport = ScriptedTransport::new()
        .then(200, catalog())
        .then(200, json!({"events": events(&["one", "two", "three"]), "links": []}));
    let config = ClientConfig::default();
    let mut out = MessageWriter::new(Vec::new());

    let report = LogSearch::new(&transport, &config)
        .run(&search("2019-10-10 00:00:00"), &mut out)
        .await
        .expect("should run");

    assert_eq!(lines(out.into_inner()), ["one", "two", "three"]);
    assert_eq!(report.requests, 0);
    assert!(report.is_complete());
}

#[tokio::test(start_paused = true)]
async fn test_async_job_is_polled_until_ready() {
    let transport = ScriptedTransport::new()
        .then(200, catalog())
        .then(202, json!({"id": "job-1", "links": link("https://svc/query/job-1")}))
        .then(202, json!({"id": "job-1", "progress": 50, "links": link("https://svc/query/job-1")}))
        .then(200, json!({"events": events(&["late", "later"]), "links": []}));
    let config = ClientConfig::default();
    let mut out = MessageWriter::new(Vec::new());

    let report = LogSearch::new(&transport, &config)
        .run(&search("2019-10-10 00:00:00"), &mut out)
        .await
        .expect("should run");

    assert_eq!(lines(out.into_inner()), ["late", "later"]);
    assert_eq!(report.requests, 2);

    let seen = transport.seen();
    assert_eq!(seen.len(), 4);
    assert_eq!(seen[2].url, "https://svc/query/job-1");
    // Submission to first poll: no delay. Between polls: one interval.
    assert!(seen[2].at - seen[1].at < Duration::from_millis(1000));
    assert!(seen[3].at - seen[2].at >= Duration::from_millis(1000));
}

#[tokio::test(start_paused = true)]
async fn test_paginated_results_keep_service_order() {
    let transport = ScriptedTransport::new()
        .then(200, catalog())
        .then(200, json!({"events": events(&["p1-a", "p1-b"]), "links": link("https://svc/page/2")}))
        .then(200, json!({"events": events(&["p2-a"]), "links": link("https://svc/page/3")}))
        .then(200, json!({"events": events(&["p3-a", "p3-b"]), "links": []}));
    let config = ClientConfig::default();
    let mut out = MessageWriter::new(Vec::new());

    let report = LogSearch::new(&transport, &config)
        .run(&search("2019-10-10 00:00:00"), &mut out)
        .await
        .expect("should run");

    assert_eq!(
        lines(out.into_inner()),
        ["p1-a", "p1-b", "p2-a", "p3-a", "p3-b"]
    );
    assert_eq!(report.events, 5);
    assert_eq!(report.requests, 2);
}

#[tokio::test(start_paused = true)]
async fn test_poll_server_error_ends_quietly() {
    let transport = ScriptedTransport::new()
        .then(200, catalog())
        .then(202, json!({"id": "job-1", "links": link("https://svc/query/job-1")}))
        .then(500, json!({"message": "internal"}));
    let config = ClientConfig::default();
    let mut out = MessageWriter::new(Vec::new());

    let report = LogSearch::new(&transport, &config)
        .run(&search("2019-10-10 00:00:00"), &mut out)
        .await
        .expect("no error is surfaced");

    assert!(out.into_inner().is_empty());
    assert_eq!(report.completion, Completion::UnexpectedStatus(500));
    assert!(!report.is_complete());
}

#[tokio::test(start_paused = true)]
async fn test_rejected_submission_ends_quietly() {
    let transport = ScriptedTransport::new()
        .then(200, catalog())
        .then(400, json!({"message": "bad statement"}));
    let config = ClientConfig::default();
    let mut out = MessageWriter::new(Vec::new());

    let report = LogSearch::new(&transport, &config)
        .run(&search("2019-10-10 00:00:00"), &mut out)
        .await
        .expect("no error is surfaced");

    assert_eq!(report.completion, Completion::UnexpectedStatus(400));
    assert_eq!(transport.seen().len(), 2);
}

#[tokio::test]
async fn test_malformed_date_fails_before_network() {
    let transport = ScriptedTransport::new().then(200, catalog());
    let config = ClientConfig::default();
    let mut out = MessageWriter::new(Vec::new());

    let err = LogSearch::new(&transport, &config)
        .run(&search("2019/10/10"), &mut out)
        .await
        .expect_err("should fail");

    assert!(matches!(err, QueryError::InvalidDateFormat { .. }));
    assert!(transport.seen().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_endless_links_are_cut_off() {
    let mut transport = ScriptedTransport::new();
    for _ in 0..10 {
        transport = transport.then(202, json!({"id": "job", "links": link("https://svc/query/job")}));
    }
    let config = ClientConfig::default().with_max_polls(5);
    let mut out = MessageWriter::new(Vec::new());

    let err = ResultRetriever::new(&transport, &config)
        .retrieve_from("https://svc/query/job", &mut out)
        .await
        .expect_err("should stop");

    assert!(matches!(err, QueryError::PollLimitExceeded { limit: 5 }));
    assert_eq!(transport.seen().len(), 5);
}
