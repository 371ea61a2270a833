//! # gle-query
//!
//! Client for the Logentries query API.
//!
//! A run resolves a log name against the account catalog, posts a LEQL
//! query over a time window and then follows the service's continuation
//! links until it stops returning them:
//!
//! ```text
//! ┌─────────────────┐  log id   ┌────────────────┐  response  ┌─────────────────┐
//! │ CatalogResolver │──────────►│ QuerySubmitter │───────────►│ ResultRetriever │──► EventSink
//! └─────────────────┘           └────────────────┘            └────────┬────────┘
//!                                       ▲                           ▲     │
//!                               ┌───────┴───────┐                   └─────┘
//!                               │   TimeRange   │              GET link (+ delay)
//!                               └───────────────┘
//! ```
//!
//! All HTTP goes through a [`Transport`], so every component can be driven
//! by a fake in tests.
//!
//! # Example
//!
//! ```rust,no_run
//! use gle_query::{ClientConfig, LogSearch, MessageWriter, ReqwestTransport, SearchRequest};
//!
//! # async fn example() -> Result<(), gle_query::QueryError> {
//! let config = ClientConfig::default();
//! let transport = ReqwestTransport::new("my-api-key", &config)?;
//! let request = SearchRequest::new("app", "where(ERROR)", "2019-10-10 00:00:00", "2019-10-11 00:00:00");
//!
//! let mut out = MessageWriter::new(std::io::stdout().lock());
//! let report = LogSearch::new(&transport, &config).run(&request, &mut out).await?;
//! println!("{} events", report.events);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod catalog;
pub mod config;
pub mod error;
pub mod model;
pub mod query;
pub mod retriever;
pub mod search;
pub mod time_range;
pub mod transport;

pub use catalog::LogCatalogResolver;
pub use config::ClientConfig;
pub use error::{QueryError, Result};
pub use model::{Event, LogCatalog, LogCatalogEntry, QueryRequest, QueryResponse};
pub use query::QuerySubmitter;
pub use retriever::{Completion, EventSink, MessageWriter, ResultRetriever, RetrievalReport};
pub use search::{LogSearch, SearchRequest};
pub use time_range::{TimeRange, parse_timestamp};
pub use transport::{HttpResponse, ReqwestTransport, Transport};
