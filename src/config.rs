use ethers::types::Address;
use serde::Deserialize;
use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::constants::{
    DEFAULT_POLL_INTERVAL_SECS, DEFAULT_RPC_CALL_TIMEOUT_SECS, DEFAULT_VALUE_DECIMALS,
    MAX_VALUE_DECIMALS, TOKEN_CLAIM, TOKEN_PROSPECT, TOKEN_SKALE, TOKEN_USDC,
};

/// An auxiliary balance-bearing token contract paired with its display name.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct TokenContractConfig {
    pub name: String,
    pub address: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    // Server
    pub host: String,
    pub port: u16,
    pub environment: String,

    // Blockchain
    pub evm_rpc_url: String,
    pub wallet_rpc_url: Option<String>,

    // Contract Addresses
    pub miner_contract_address: String,
    pub token_contracts: Vec<TokenContractConfig>,

    // Aggregation
    pub value_decimals: u32,
    pub poll_interval_secs: u64,
    pub rpc_call_timeout_secs: u64,

    // CORS
    pub cors_allowed_origins: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv::dotenv().ok();

        let token_contracts = vec![
            TokenContractConfig {
                name: TOKEN_PROSPECT.to_string(),
                address: env::var("PROSPECT_TOKEN_ADDRESS")?,
            },
            TokenContractConfig {
                name: TOKEN_CLAIM.to_string(),
                address: env::var("CLAIM_TOKEN_ADDRESS")?,
            },
            TokenContractConfig {
                name: TOKEN_USDC.to_string(),
                address: env::var("USDC_TOKEN_ADDRESS")?,
            },
            TokenContractConfig {
                name: TOKEN_SKALE.to_string(),
                address: env::var("SKALE_TOKEN_ADDRESS")?,
            },
        ];

        Ok(Config {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()?,
            environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),

            evm_rpc_url: env::var("EVM_RPC_URL")?,
            wallet_rpc_url: env::var("WALLET_RPC_URL")
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty()),

            miner_contract_address: env::var("MINER_CONTRACT_ADDRESS")?,
            token_contracts,

            value_decimals: env::var("VALUE_DECIMALS")
                .unwrap_or_else(|_| DEFAULT_VALUE_DECIMALS.to_string())
                .parse()?,
            poll_interval_secs: env::var("POLL_INTERVAL_SECS")
                .unwrap_or_else(|_| DEFAULT_POLL_INTERVAL_SECS.to_string())
                .parse()?,
            rpc_call_timeout_secs: env::var("RPC_CALL_TIMEOUT_SECS")
                .unwrap_or_else(|_| DEFAULT_RPC_CALL_TIMEOUT_SECS.to_string())
                .parse()?,

            cors_allowed_origins: env::var("CORS_ALLOWED_ORIGINS")
                .unwrap_or_else(|_| "*".to_string()),
        })
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.evm_rpc_url.trim().is_empty() {
            anyhow::bail!("EVM_RPC_URL is empty");
        }
        url::Url::parse(&self.evm_rpc_url)
            .map_err(|e| anyhow::anyhow!("EVM_RPC_URL is not a valid URL: {}", e))?;
        if let Some(wallet_url) = &self.wallet_rpc_url {
            url::Url::parse(wallet_url)
                .map_err(|e| anyhow::anyhow!("WALLET_RPC_URL is not a valid URL: {}", e))?;
        } else {
            tracing::warn!("WALLET_RPC_URL not set; wallet connections will report no provider");
        }

        parse_address(&self.miner_contract_address)
            .map_err(|e| anyhow::anyhow!("MINER_CONTRACT_ADDRESS: {}", e))?;
        if self.miner_contract_address.starts_with("0x0000") {
            tracing::warn!("Using placeholder miner contract address");
        }

        for token in &self.token_contracts {
            parse_address(&token.address)
                .map_err(|e| anyhow::anyhow!("{} token address: {}", token.name, e))?;
            if token.address.starts_with("0x0000") {
                tracing::warn!("Using placeholder {} token address", token.name);
            }
        }

        if self.value_decimals > MAX_VALUE_DECIMALS {
            anyhow::bail!(
                "VALUE_DECIMALS must be <= {}, got {}",
                MAX_VALUE_DECIMALS,
                self.value_decimals
            );
        }

        if self.poll_interval_secs == 0 {
            anyhow::bail!("POLL_INTERVAL_SECS must be > 0");
        }
        if self.rpc_call_timeout_secs == 0 {
            anyhow::bail!("RPC_CALL_TIMEOUT_SECS must be > 0");
        }
        if self.rpc_call_timeout_secs >= self.poll_interval_secs {
            tracing::warn!(
                "RPC call timeout ({}s) is not shorter than the poll interval ({}s)",
                self.rpc_call_timeout_secs,
                self.poll_interval_secs
            );
        }

        if self.cors_allowed_origins.trim().is_empty() {
            tracing::warn!("CORS_ALLOWED_ORIGINS is empty; requests may be blocked");
        }

        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn rpc_call_timeout(&self) -> Duration {
        Duration::from_secs(self.rpc_call_timeout_secs)
    }
}

/// Parses a `0x`-prefixed 20-byte hex address.
pub fn parse_address(value: &str) -> std::result::Result<Address, String> {
    let trimmed = value.trim();
    if !trimmed.starts_with("0x") || trimmed.len() != 42 {
        return Err(format!("expected 0x-prefixed 20-byte hex address, got '{}'", trimmed));
    }
    Address::from_str(trimmed).map_err(|e| format!("invalid hex address '{}': {}", trimmed, e))
}

#[cfg(test)]
pub(crate) fn test_config() -> Config {
    Config {
        host: "127.0.0.1".to_string(),
        port: 3000,
        environment: "development".to_string(),
        evm_rpc_url: "http://localhost:8545".to_string(),
        wallet_rpc_url: None,
        miner_contract_address: "0x1000000000000000000000000000000000000001".to_string(),
        token_contracts: vec![
            TokenContractConfig {
                name: TOKEN_PROSPECT.to_string(),
                address: "0x2000000000000000000000000000000000000001".to_string(),
            },
            TokenContractConfig {
                name: TOKEN_CLAIM.to_string(),
                address: "0x2000000000000000000000000000000000000002".to_string(),
            },
            TokenContractConfig {
                name: TOKEN_USDC.to_string(),
                address: "0x2000000000000000000000000000000000000003".to_string(),
            },
            TokenContractConfig {
                name: TOKEN_SKALE.to_string(),
                address: "0x2000000000000000000000000000000000000004".to_string(),
            },
        ],
        value_decimals: DEFAULT_VALUE_DECIMALS,
        poll_interval_secs: DEFAULT_POLL_INTERVAL_SECS,
        rpc_call_timeout_secs: DEFAULT_RPC_CALL_TIMEOUT_SECS,
        cors_allowed_origins: "*".to_string(),
    }
}
