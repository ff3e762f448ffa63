use async_trait::async_trait;
use ethers::providers::{Http, Provider, ProviderError, RpcError as _};

use crate::{
    config::parse_address,
    constants::EIP1193_USER_REJECTED,
    error::{AppError, Result},
};

/// Wallet capability that hands out the accounts the user agreed to expose.
#[async_trait]
pub trait WalletProvider: Send + Sync {
    async fn request_accounts(&self) -> Result<Vec<String>>;
}

/// EIP-1193 wallet reachable over JSON-RPC (`eth_requestAccounts`).
pub struct JsonRpcWallet {
    provider: Provider<Http>,
}

impl JsonRpcWallet {
    pub fn new(url: &str) -> Result<Self> {
        let provider = Provider::<Http>::try_from(url)
            .map_err(|e| AppError::Internal(format!("Invalid wallet RPC URL: {}", e)))?;
        Ok(Self { provider })
    }
}

#[async_trait]
impl WalletProvider for JsonRpcWallet {
    async fn request_accounts(&self) -> Result<Vec<String>> {
        let accounts: Vec<String> = self
            .provider
            .request("eth_requestAccounts", ())
            .await
            .map_err(map_wallet_error)?;
        normalize_accounts(accounts)
    }
}

// Internal helper that classifies wallet JSON-RPC failures.
fn map_wallet_error(error: ProviderError) -> AppError {
    if let Some(response) = error.as_error_response() {
        if response.code == EIP1193_USER_REJECTED {
            return AppError::UserRejected(response.message.clone());
        }
        return AppError::rpc(format!("wallet: {}", response.message));
    }
    if error.as_serde_error().is_some() {
        return AppError::Decode(format!("wallet response: {}", error));
    }
    tracing::warn!("Wallet provider unreachable: {}", error);
    AppError::ProviderAbsent
}

/// Validates returned account identifiers and lower-cases them.
pub fn normalize_accounts(accounts: Vec<String>) -> Result<Vec<String>> {
    if accounts.is_empty() {
        return Err(AppError::UserRejected(
            "wallet returned no accounts".to_string(),
        ));
    }
    accounts
        .into_iter()
        .map(|account| {
            parse_address(&account)
                .map(|_| account.trim().to_ascii_lowercase())
                .map_err(AppError::Decode)
        })
        .collect()
}
