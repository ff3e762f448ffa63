// src/api/mod.rs
pub mod health;
pub mod snapshot;
pub mod wallet;

use std::sync::Arc;

use crate::{
    chain::WalletProvider,
    config::Config,
    error::{AppError, Result},
    models::Snapshot,
    services::PollingScheduler,
};

/// Presentation-facing state: the scheduler that owns the snapshot plus the
/// wallet capability used by `connect`.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub scheduler: Arc<PollingScheduler>,
    pub wallet: Option<Arc<dyn WalletProvider>>,
}

impl AppState {
    pub fn new(
        config: Config,
        scheduler: Arc<PollingScheduler>,
        wallet: Option<Arc<dyn WalletProvider>>,
    ) -> Self {
        Self {
            config,
            scheduler,
            wallet,
        }
    }

    /// Asks the wallet for account access and starts polling the first account.
    ///
    /// On any wallet failure the scheduler is left untouched.
    pub async fn connect(&self) -> Result<String> {
        let wallet = self.wallet.as_ref().ok_or(AppError::ProviderAbsent)?;
        let accounts = wallet.request_accounts().await.map_err(|e| {
            tracing::warn!("Wallet connection failed: {}", e);
            e
        })?;
        let account = accounts
            .into_iter()
            .next()
            .ok_or_else(|| AppError::UserRejected("wallet returned no accounts".to_string()))?;

        tracing::info!("Connected wallet address: {}", account);
        self.scheduler.connect(account.clone());
        Ok(account)
    }

    pub fn disconnect(&self) {
        self.scheduler.disconnect();
    }

    pub fn connected(&self) -> bool {
        self.scheduler.is_polling()
    }

    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.scheduler.current()
    }
}
