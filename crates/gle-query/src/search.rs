//! One complete query run: parse the window, resolve the log, submit, and
//! retrieve.

use tracing::{debug, info};

use crate::catalog::LogCatalogResolver;
use crate::config::ClientConfig;
use crate::error::Result;
use crate::model::QueryRequest;
use crate::query::QuerySubmitter;
use crate::retriever::{EventSink, ResultRetriever, RetrievalReport};
use crate::time_range::TimeRange;
use crate::transport::Transport;

/// Inputs of a query run, as given by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    /// Human-readable log name.
    pub log_name: String,
    /// LEQL statement.
    pub statement: String,
    /// Window start, `YYYY-MM-DD HH:MM:SS` (UTC).
    pub start_date: String,
    /// Window end, `YYYY-MM-DD HH:MM:SS` (UTC).
    pub end_date: String,
}

impl SearchRequest {
    /// Creates a request.
    #[must_use]
    pub fn new(
        log_name: impl Into<String>,
        statement: impl Into<String>,
        start_date: impl Into<String>,
        end_date: impl Into<String>,
    ) -> Self {
        Self {
            log_name: log_name.into(),
            statement: statement.into(),
            start_date: start_date.into(),
            end_date: end_date.into(),
        }
    }
}

/// Runs searches against one account.
#[derive(Debug)]
pub struct LogSearch<'a, T> {
    transport: &'a T,
    config: &'a ClientConfig,
}

impl<'a, T: Transport> LogSearch<'a, T> {
    /// Creates a search over the given transport.
    #[must_use]
    pub const fn new(transport: &'a T, config: &'a ClientConfig) -> Self {
        Self { transport, config }
    }

    /// Run a search, streaming matching events into `sink`.
    ///
    /// The date window is parsed before any request is made, and the query
    /// is only submitted once the log name has resolved.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by any step. Nothing is retried.
    pub async fn run<S>(&self, request: &SearchRequest, sink: &mut S) -> Result<RetrievalReport>
    where
        S: EventSink + ?Sized,
    {
        let range = TimeRange::parse(&request.start_date, &request.end_date)?;
        debug!(log = %request.log_name, from = range.from, to = range.to, "Starting search");

        let entry = LogCatalogResolver::new(self.transport, self.config)
            .resolve(&request.log_name)
            .await?;

        let query = QueryRequest::new(entry.id, request.statement.clone(), range);
        let initial = QuerySubmitter::new(self.transport, self.config)
            .submit(&query)
            .await?;

        let report = ResultRetriever::new(self.transport, self.config)
            .retrieve(initial, sink)
            .await?;

        info!(
            events = report.events,
            requests = report.requests,
            complete = report.is_complete(),
            "Search finished"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::QueryError;
    use crate::model::Event;
    use crate::retriever::Completion;
    use crate::transport::FakeTransport;
    use serde_json::json;

    fn request(log: &str, start: &str) -> SearchRequest {
        SearchRequest::new(log, "where(level=ERROR)", start, "2019-10-11 00:00:00")
    }

    fn catalog() -> serde_json::Value {
        json!({"logs": [{"id": "1", "name": "app"}, {"id": "2", "name": "db"}]})
    }

    #[tokio::test(start_paused = true)]
    async fn runs_all_steps_in_order() {
        let fake = FakeTransport::new()
            .respond(200, catalog())
            .respond(
                202,
                json!({"id": "job", "links": [{"href": "https://rest.logentries.com/query/job", "rel": "Self"}]}),
            )
            .respond(200, json!({"events": [{"message": "boom"}], "links": []}));
        let config = ClientConfig::default();
        let mut sink: Vec<Event> = Vec::new();

        let report = LogSearch::new(&fake, &config)
            .run(&request("db", "2019-10-10 00:00:00"), &mut sink)
            .await
            .expect("should run");

        assert_eq!(sink.len(), 1);
        assert_eq!(sink[0].message, "boom");
        assert_eq!(report.completion, Completion::Exhausted);

        let methods: Vec<&str> = fake.requests().iter().map(|r| r.method).collect();
        assert_eq!(methods, ["GET", "POST", "GET"]);

        let posted: serde_json::Value = serde_json::from_slice(
            fake.requests()[1].body.as_deref().expect("post body"),
        )
        .expect("json");
        assert_eq!(posted["logs"], json!(["2"]));
        assert_eq!(posted["leql"]["during"]["from"], json!(1_570_665_600_000_i64));
    }

    #[tokio::test]
    async fn bad_date_fails_before_any_request() {
        let fake = FakeTransport::new().respond(200, catalog());
        let config = ClientConfig::default();
        let mut sink: Vec<Event> = Vec::new();

        let err = LogSearch::new(&fake, &config)
            .run(&request("app", "2019/10/10"), &mut sink)
            .await
            .expect_err("should fail");

        assert!(matches!(err, QueryError::InvalidDateFormat { .. }));
        assert!(fake.requests().is_empty());
    }

    #[tokio::test]
    async fn unknown_log_never_submits() {
        let fake = FakeTransport::new().respond(200, catalog());
        let config = ClientConfig::default();
        let mut sink: Vec<Event> = Vec::new();

        let err = LogSearch::new(&fake, &config)
            .run(&request("missing", "2019-10-10 00:00:00"), &mut sink)
            .await
            .expect_err("should fail");

        assert!(matches!(err, QueryError::LogNotFound { .. }));
        assert_eq!(fake.count("POST"), 0);
    }
}
