//! The donor and ledger clients over one shared store.

use std::sync::Arc;

use tracing::info;

use crate::config::StoreConfig;
use crate::core::DocumentStore;
use crate::error::{StorageResult, ValidationError};
use crate::schemas::{DonorClient, LedgerClient};

/// Both collection clients of the application.
#[derive(Debug, Clone)]
pub struct BlasterClients {
    /// Donor (primary) collection client.
    pub donors: Arc<DonorClient>,
    /// Ledger collection client.
    pub ledger: Arc<LedgerClient>,
}

impl BlasterClients {
    /// Opens both clients over `store`, starting their bootstraps in the
    /// background. Must be called from within a tokio runtime.
    pub fn open(store: Arc<dyn DocumentStore>, config: &StoreConfig) -> StorageResult<Self> {
        config
            .validate()
            .map_err(|errors| ValidationError::InvalidConfiguration { errors })?;

        info!(
            backend = store.backend_name(),
            donors = %config.donor_collection,
            ledger = %config.ledger_collection,
            "Opening collection clients"
        );

        Ok(Self {
            donors: DonorClient::open(Arc::clone(&store), config.donor_collection.clone()),
            ledger: LedgerClient::open(store, config.ledger_collection.clone()),
        })
    }

    /// Builds a Cloudant store from `config` and opens both clients over it.
    #[cfg(feature = "cloudant")]
    pub fn from_config(config: &StoreConfig) -> StorageResult<Self> {
        use crate::backends::cloudant::CloudantClient;

        if config.uses_placeholder_credentials() {
            tracing::warn!(
                account = %config.account,
                "CLOUDANT_ID or CLOUDANT_IAM_APIKEY is unset, authentication will use placeholders"
            );
        }

        let store = CloudantClient::new(config)?;
        Self::open(Arc::new(store), config)
    }

    /// Waits until both bootstraps have finished. Fails with the first
    /// bootstrap error.
    pub async fn ready(&self) -> StorageResult<()> {
        let (donors, ledger) = tokio::join!(self.donors.ready(), self.ledger.ready());
        donors?;
        ledger?;
        Ok(())
    }
}
