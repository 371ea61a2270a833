//! Wire types for the Logentries management and query APIs.
//!
//! Response documents are decoded leniently: fields the client does not act
//! on default to empty when the service omits them or sends `null`.

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{QueryError, Result};
use crate::time_range::TimeRange;

/// HTTP status for a completed, synchronous answer.
pub const STATUS_OK: u16 = 200;

/// HTTP status for an accepted, still-running query job.
pub const STATUS_ACCEPTED: u16 = 202;

/// Reads an absent or `null` field as `T::default()`.
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// ============================================================================
// Log catalog
// ============================================================================

/// A hypermedia link attached to service documents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    /// Target URL.
    pub href: String,
    /// Relation name (`Self`, `Next`, ...).
    #[serde(default, deserialize_with = "null_as_default")]
    pub rel: String,
}

/// Log set membership of a catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogSetInfo {
    /// Log set identifier.
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    /// Log set name.
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    /// Related links.
    #[serde(default, deserialize_with = "null_as_default")]
    pub links: Vec<Link>,
}

/// Agent settings attached to a log.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserData {
    /// File followed by the agent.
    #[serde(default, deserialize_with = "null_as_default")]
    pub le_agent_filename: String,
    /// Whether the agent follows the file.
    #[serde(default, deserialize_with = "null_as_default")]
    pub le_agent_follow: String,
}

/// One log configured in the account.
///
/// Only `id` and `name` drive the query; the rest is carried for callers
/// that want to show it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogCatalogEntry {
    /// Service identifier used in queries.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Log sets this log belongs to.
    #[serde(default, deserialize_with = "null_as_default")]
    pub logsets_info: Vec<LogSetInfo>,
    /// Agent settings.
    #[serde(default)]
    pub user_data: Option<UserData>,
    /// Ingestion tokens.
    #[serde(default, deserialize_with = "null_as_default")]
    pub tokens: Vec<String>,
    /// How events reach the log (`token`, `agent`, ...).
    #[serde(default)]
    pub source_type: Option<String>,
    /// Token seed, shape defined by the service.
    #[serde(default)]
    pub token_seed: Option<serde_json::Value>,
    /// Structure identifiers applied to the log.
    #[serde(default, deserialize_with = "null_as_default")]
    pub structures: Vec<String>,
    /// Retention period as reported by the service.
    #[serde(default)]
    pub retention_period: Option<String>,
    /// Related links.
    #[serde(default, deserialize_with = "null_as_default")]
    pub links: Vec<Link>,
}

/// Body of `GET /management/logs`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LogCatalog {
    /// Every log in the account, in service order.
    #[serde(default, deserialize_with = "null_as_default")]
    pub logs: Vec<LogCatalogEntry>,
}

impl LogCatalog {
    /// Returns the first entry whose name equals `name` exactly.
    ///
    /// Matching is case-sensitive and duplicate names are not collapsed.
    #[must_use]
    pub fn find_by_name(&self, name: &str) -> Option<&LogCatalogEntry> {
        self.logs.iter().find(|entry| entry.name == name)
    }

    /// Number of logs in the catalog.
    #[must_use]
    pub fn len(&self) -> usize {
        self.logs.len()
    }

    /// Returns `true` if the account has no logs.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.logs.is_empty()
    }
}

// ============================================================================
// Query request
// ============================================================================

/// Time bounds of a LEQL query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct During {
    /// Start, epoch milliseconds.
    pub from: i64,
    /// End, epoch milliseconds.
    pub to: i64,
}

impl From<TimeRange> for During {
    fn from(range: TimeRange) -> Self {
        Self {
            from: range.from,
            to: range.to,
        }
    }
}

/// A LEQL statement and its time window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Leql {
    /// Filter statement.
    pub statement: String,
    /// Window to search.
    pub during: During,
}

/// Body of `POST /query/logs/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryRequest {
    /// Identifiers of the logs to search. Always exactly one here.
    pub logs: Vec<String>,
    /// Statement and window.
    pub leql: Leql,
}

impl QueryRequest {
    /// Builds a query over a single log.
    #[must_use]
    pub fn new(log_id: impl Into<String>, statement: impl Into<String>, range: TimeRange) -> Self {
        Self {
            logs: vec![log_id.into()],
            leql: Leql {
                statement: statement.into(),
                during: range.into(),
            },
        }
    }

    /// The statement being run.
    #[must_use]
    pub fn statement(&self) -> &str {
        &self.leql.statement
    }
}

// ============================================================================
// Query responses
// ============================================================================

/// A single matching log event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Log the event came from.
    #[serde(default, deserialize_with = "null_as_default")]
    pub log_id: String,
    /// Raw message text.
    #[serde(default, deserialize_with = "null_as_default")]
    pub message: String,
    /// Event time, epoch milliseconds.
    #[serde(default, deserialize_with = "null_as_default")]
    pub timestamp: i64,
    /// Position of the event within its log.
    #[serde(default, deserialize_with = "null_as_default")]
    pub sequence_number: i64,
    /// Labels attached by the service; opaque to the client.
    #[serde(default, deserialize_with = "null_as_default")]
    pub labels: Vec<serde_json::Value>,
    /// Context links for the event.
    #[serde(default, deserialize_with = "null_as_default")]
    pub links: Vec<Link>,
}

/// A page of results (status 200).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultPage {
    /// Events on this page, in service order.
    #[serde(default, deserialize_with = "null_as_default")]
    pub events: Vec<Event>,
    /// Continuation links; the first one, if any, is followed.
    #[serde(default, deserialize_with = "null_as_default")]
    pub links: Vec<Link>,
    /// Echo of the statement that produced the page.
    #[serde(default)]
    pub leql: Option<Leql>,
    /// Logs covered by the page.
    #[serde(default, deserialize_with = "null_as_default")]
    pub logs: Vec<String>,
}

/// A running query job (status 202).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryJob {
    /// Job identifier.
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    /// Completion percentage reported by the service.
    #[serde(default)]
    pub progress: Option<i32>,
    /// Status links; the first one, if any, is polled.
    #[serde(default, deserialize_with = "null_as_default")]
    pub links: Vec<Link>,
    /// Echo of the submitted statement.
    #[serde(default)]
    pub leql: Option<Leql>,
    /// Logs covered by the job.
    #[serde(default, deserialize_with = "null_as_default")]
    pub logs: Vec<String>,
}

/// A query response, classified by the HTTP status it arrived with.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryResponse {
    /// Results are available now (200).
    Immediate(ResultPage),
    /// The query is still running (202).
    Accepted(QueryJob),
    /// Any other status: the service has nothing more to give.
    Completed {
        /// The status that ended the exchange.
        status: u16,
    },
}

impl QueryResponse {
    /// Classifies a response by status and decodes its body once.
    ///
    /// Bodies of statuses other than 200 and 202 are not read.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::Decode`] if a 200 or 202 body is not valid JSON
    /// of the expected shape.
    pub fn decode(status: u16, body: &[u8]) -> Result<Self> {
        match status {
            STATUS_OK => serde_json::from_slice(body)
                .map(Self::Immediate)
                .map_err(|e| QueryError::decode("result page", e.to_string())),
            STATUS_ACCEPTED => serde_json::from_slice(body)
                .map(Self::Accepted)
                .map_err(|e| QueryError::decode("query job", e.to_string())),
            status => Ok(Self::Completed { status }),
        }
    }

    /// The link to follow next, if the service advertised one.
    #[must_use]
    pub fn continuation(&self) -> Option<&str> {
        let links = match self {
            Self::Immediate(page) => &page.links,
            Self::Accepted(job) => &job.links,
            Self::Completed { .. } => return None,
        };
        links.first().map(|link| link.href.as_str())
    }

    /// Events carried by this response.
    #[must_use]
    pub fn events(&self) -> &[Event] {
        match self {
            Self::Immediate(page) => &page.events,
            Self::Accepted(_) | Self::Completed { .. } => &[],
        }
    }

    /// Short name of the variant, for logging.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Immediate(_) => "immediate",
            Self::Accepted(_) => "accepted",
            Self::Completed { .. } => "completed",
        }
    }
}
