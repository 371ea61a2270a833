//! Resolution of human log names to service identifiers.

use tracing::{debug, info};

use crate::config::ClientConfig;
use crate::error::{QueryError, Result};
use crate::model::{LogCatalog, LogCatalogEntry, STATUS_OK};
use crate::transport::Transport;

/// Looks logs up in the account catalog.
///
/// The catalog is fetched fresh on every call; nothing is cached.
#[derive(Debug)]
pub struct LogCatalogResolver<'a, T> {
    transport: &'a T,
    config: &'a ClientConfig,
}

impl<'a, T: Transport> LogCatalogResolver<'a, T> {
    /// Creates a resolver over the given transport.
    #[must_use]
    pub const fn new(transport: &'a T, config: &'a ClientConfig) -> Self {
        Self { transport, config }
    }

    /// Fetch every log configured in the account.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the service answers with a
    /// status other than 200, or the body is not a catalog.
    pub async fn fetch_catalog(&self) -> Result<LogCatalog> {
        let url = self.config.catalog_url();
        debug!(url = %url, "Fetching log catalog");

        let response = self.transport.get(&url).await?;
        if response.status != STATUS_OK {
            return Err(QueryError::unexpected_status(
                "fetch log catalog",
                response.status,
            ));
        }

        let catalog: LogCatalog = serde_json::from_slice(&response.body)
            .map_err(|e| QueryError::decode("log catalog", e.to_string()))?;

        debug!(logs = catalog.len(), "Fetched log catalog");
        Ok(catalog)
    }

    /// Resolve a log name to its catalog entry.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::LogNotFound`] if no log has exactly this name,
    /// or any error from [`Self::fetch_catalog`].
    pub async fn resolve(&self, name: &str) -> Result<LogCatalogEntry> {
        let catalog = self.fetch_catalog().await?;
        let entry = catalog
            .find_by_name(name)
            .cloned()
            .ok_or_else(|| QueryError::log_not_found(name))?;

        info!(name = %name, id = %entry.id, "Resolved log");
        Ok(entry)
    }
}
