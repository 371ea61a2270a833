//! Result retrieval: the polling state machine that follows continuation
//! links until the service stops advertising them.
//!
//! ```text
//!   submission response
//!          │
//!          ▼
//!   ┌─────────────┐  200/202 + link  ┌──────────────┐
//!   │   absorb    │─────────────────►│ Polling(url) │◄──┐
//!   └─────────────┘                  └──────┬───────┘   │ sleep(poll_interval)
//!          │ no link / other status         │ GET url   │ 200/202 + link
//!          ▼                                ▼           │
//!   ┌─────────────┐  no link / other ┌──────────────┐   │
//!   │    Done     │◄─────────────────│   absorb     │───┘
//!   └─────────────┘                  └──────────────┘
//! ```
//!
//! The delay is applied before every continuation request except the first,
//! for job polling and pagination alike. The number of continuation requests
//! is capped by [`ClientConfig::max_polls`].

use std::io::Write;

use serde::Serialize;
use tracing::{debug, info, trace, warn};

use crate::config::ClientConfig;
use crate::error::{QueryError, Result};
use crate::model::{Event, QueryResponse};
use crate::transport::Transport;

/// Destination for retrieved events.
pub trait EventSink {
    /// Receive one event, in service order.
    ///
    /// # Errors
    ///
    /// Returns an error if the event cannot be written.
    fn emit(&mut self, event: &Event) -> Result<()>;
}

impl<S: EventSink + ?Sized> EventSink for &mut S {
    fn emit(&mut self, event: &Event) -> Result<()> {
        (**self).emit(event)
    }
}

/// Collects events in memory.
impl EventSink for Vec<Event> {
    fn emit(&mut self, event: &Event) -> Result<()> {
        self.push(event.clone());
        Ok(())
    }
}

/// Writes the raw message of each event on its own line.
#[derive(Debug)]
pub struct MessageWriter<W> {
    writer: W,
}

impl<W: Write> MessageWriter<W> {
    /// Wraps a writer.
    #[must_use]
    pub const fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Returns the wrapped writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> EventSink for MessageWriter<W> {
    fn emit(&mut self, event: &Event) -> Result<()> {
        writeln!(self.writer, "{}", event.message)?;
        Ok(())
    }
}

/// How a retrieval run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "status", rename_all = "snake_case")]
pub enum Completion {
    /// The last response carried no continuation link.
    Exhausted,
    /// A response arrived with a status other than 200 or 202.
    ///
    /// The service gave no indication whether more data existed.
    UnexpectedStatus(u16),
}

/// Summary of a retrieval run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RetrievalReport {
    /// Continuation requests issued.
    pub requests: u32,
    /// Events handed to the sink.
    pub events: u64,
    /// Why the run stopped.
    pub completion: Completion,
}

impl RetrievalReport {
    const fn new() -> Self {
        Self {
            requests: 0,
            events: 0,
            completion: Completion::Exhausted,
        }
    }

    /// Returns `true` if the service signalled the end of the results.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        matches!(self.completion, Completion::Exhausted)
    }
}

enum PollState {
    Polling(String),
    Done(Completion),
}

/// Drives a query from its first response to completion.
#[derive(Debug)]
pub struct ResultRetriever<'a, T> {
    transport: &'a T,
    config: &'a ClientConfig,
}

impl<'a, T: Transport> ResultRetriever<'a, T> {
    /// Creates a retriever over the given transport.
    #[must_use]
    pub const fn new(transport: &'a T, config: &'a ClientConfig) -> Self {
        Self { transport, config }
    }

    /// Consume a submission response and every page that follows it.
    ///
    /// Events already present in `initial` are emitted first. The first
    /// continuation request, if any, is issued without delay.
    ///
    /// # Errors
    ///
    /// Returns an error if a request fails, a body cannot be decoded, the
    /// sink fails, or the poll limit is reached while links keep coming.
    /// A status other than 200 or 202 is not an error; it is reported as
    /// [`Completion::UnexpectedStatus`].
    pub async fn retrieve<S>(&self, initial: QueryResponse, sink: &mut S) -> Result<RetrievalReport>
    where
        S: EventSink + ?Sized,
    {
        let mut report = RetrievalReport::new();
        let state = Self::absorb(&initial, sink, &mut report)?;
        self.run(state, sink, report).await
    }

    /// Poll starting from a continuation link.
    ///
    /// # Errors
    ///
    /// See [`Self::retrieve`].
    pub async fn retrieve_from<S>(&self, url: &str, sink: &mut S) -> Result<RetrievalReport>
    where
        S: EventSink + ?Sized,
    {
        self.run(PollState::Polling(url.to_string()), sink, RetrievalReport::new())
            .await
    }

    async fn run<S>(
        &self,
        mut state: PollState,
        sink: &mut S,
        mut report: RetrievalReport,
    ) -> Result<RetrievalReport>
    where
        S: EventSink + ?Sized,
    {
        loop {
            let url = match state {
                PollState::Done(completion) => {
                    report.completion = completion;
                    break;
                }
                PollState::Polling(url) => url,
            };

            if let Some(limit) = self
                .config
                .poll_limit()
                .filter(|&limit| report.requests >= limit)
            {
                warn!(limit, url = %url, "Poll limit reached with results outstanding");
                return Err(QueryError::PollLimitExceeded { limit });
            }

            if report.requests > 0 {
                trace!(delay_ms = self.config.poll_interval.as_millis(), "Waiting before next poll");
                tokio::time::sleep(self.config.poll_interval).await;
            }

            debug!(url = %url, request = report.requests + 1, "Polling");
            let response = self.transport.get(&url).await?;
            report.requests += 1;

            let classified = QueryResponse::decode(response.status, &response.body)?;
            state = Self::absorb(&classified, sink, &mut report)?;
        }

        match report.completion {
            Completion::Exhausted => info!(
                requests = report.requests,
                events = report.events,
                "Retrieval complete"
            ),
            Completion::UnexpectedStatus(status) => warn!(
                status,
                requests = report.requests,
                events = report.events,
                "Retrieval stopped on unexpected status; results may be incomplete"
            ),
        }
        Ok(report)
    }

    fn absorb<S>(response: &QueryResponse, sink: &mut S, report: &mut RetrievalReport) -> Result<PollState>
    where
        S: EventSink + ?Sized,
    {
        for event in response.events() {
            sink.emit(event)?;
            report.events += 1;
        }

        if let QueryResponse::Accepted(job) = response {
            debug!(job = %job.id, progress = ?job.progress, "Query still running");
        }

        let next = match (response.continuation(), response) {
            (Some(link), _) => PollState::Polling(link.to_string()),
            (None, QueryResponse::Completed { status }) => {
                PollState::Done(Completion::UnexpectedStatus(*status))
            }
            (None, _) => PollState::Done(Completion::Exhausted),
        };
        Ok(next)
    }
}
