//! Submission of LEQL queries.

use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::error::{QueryError, Result};
use crate::model::{QueryRequest, QueryResponse};
use crate::time_range::TimeRange;
use crate::transport::Transport;

/// Posts queries and classifies the service's first answer.
#[derive(Debug)]
pub struct QuerySubmitter<'a, T> {
    transport: &'a T,
    config: &'a ClientConfig,
}

impl<'a, T: Transport> QuerySubmitter<'a, T> {
    /// Creates a submitter over the given transport.
    #[must_use]
    pub const fn new(transport: &'a T, config: &'a ClientConfig) -> Self {
        Self { transport, config }
    }

    /// Submit a query.
    ///
    /// The response status alone selects the variant: 200 is
    /// [`QueryResponse::Immediate`], 202 is [`QueryResponse::Accepted`] and
    /// anything else is [`QueryResponse::Completed`] with no data.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or a 200/202 body cannot be
    /// decoded.
    pub async fn submit(&self, request: &QueryRequest) -> Result<QueryResponse> {
        let url = self.config.query_url();
        let body = serde_json::to_vec(request)
            .map_err(|e| QueryError::Encode {
                context: "query request".to_string(),
                message: e.to_string(),
            })?;

        debug!(
            url = %url,
            logs = ?request.logs,
            statement = %request.statement(),
            from = request.leql.during.from,
            to = request.leql.during.to,
            "Submitting query"
        );

        let response = self.transport.post_json(&url, body).await?;
        let classified = QueryResponse::decode(response.status, &response.body)?;

        match &classified {
            QueryResponse::Completed { status } => {
                warn!(status, "Query submission returned no usable status; nothing to retrieve");
            }
            other => debug!(kind = other.kind(), events = other.events().len(), "Query submitted"),
        }
        Ok(classified)
    }

    /// Build and submit a query over one log.
    ///
    /// # Errors
    ///
    /// See [`Self::submit`].
    pub async fn submit_for(
        &self,
        log_id: &str,
        statement: &str,
        range: TimeRange,
    ) -> Result<QueryResponse> {
        self.submit(&QueryRequest::new(log_id, statement, range)).await
    }
}
