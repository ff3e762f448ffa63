use chrono::Utc;
use ethers::{
    abi::Token,
    types::{Address, U256},
};
use futures_util::future::join_all;
use std::sync::Arc;

use crate::{
    chain::{ContractAbis, ContractCaller, ContractReader},
    config::{parse_address, Config},
    constants::{BALANCE_SENTINEL, METHOD_BALANCE_OF, METHOD_GLOBAL_STATS, METHOD_MINER_STATS},
    error::{AppError, Result},
    models::{AssetStats, GlobalStats, Snapshot, SnapshotStatus, TokenBalances},
    services::AssetDiscovery,
    utils::{normalize_u256, u256_to_string},
};

// skale() -> (minersHashing, totalHashrate, totalPowerConsumption, totalRewardsPaid)
type GlobalStatsOutput = (U256, U256, U256, U256);

// miners(uint256) -> (token, tokenId, name, hashrate, hashMeasured, powerConsumption,
//                     rewardPerBlock, lastUpdateBlock, imageURI)
type MinerOutput = (Address, U256, String, U256, String, U256, U256, U256, String);

#[derive(Debug, Clone)]
struct TokenContract {
    name: String,
    address: Address,
}

/// Stats Aggregator - Builds one normalized snapshot per polling cycle
pub struct StatsAggregator {
    reader: ContractReader,
    discovery: AssetDiscovery,
    abis: Arc<ContractAbis>,
    miner_contract: Address,
    tokens: Vec<TokenContract>,
    decimals: u32,
}

impl StatsAggregator {
    pub fn from_config(config: &Config, caller: Arc<dyn ContractCaller>) -> Result<Self> {
        let abis = Arc::new(ContractAbis::load()?);
        let reader = ContractReader::new(caller, config.rpc_call_timeout());
        let miner_contract =
            parse_address(&config.miner_contract_address).map_err(AppError::Internal)?;
        let tokens = config
            .token_contracts
            .iter()
            .map(|token| {
                parse_address(&token.address)
                    .map(|address| TokenContract {
                        name: token.name.clone(),
                        address,
                    })
                    .map_err(AppError::Internal)
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            discovery: AssetDiscovery::new(reader.clone(), abis.clone(), miner_contract),
            reader,
            abis,
            miner_contract,
            tokens,
            decimals: config.value_decimals,
        })
    }

    /// Runs one full cycle for `account`.
    ///
    /// Never fails: every sub-fetch is isolated and a failure only degrades
    /// its own part of the snapshot plus the cycle status. `previous` global
    /// stats are kept when the global read fails.
    pub async fn collect(&self, account: Option<&str>, previous: Option<&GlobalStats>) -> Snapshot {
        let Some(account) = account.filter(|a| !a.trim().is_empty()) else {
            return Snapshot::unavailable();
        };
        let owner = match parse_address(account) {
            Ok(owner) => owner,
            Err(e) => {
                tracing::warn!("Skipping cycle for malformed account {}: {}", account, e);
                return Snapshot::unavailable();
            }
        };

        let mut status = SnapshotStatus::Ok;

        let global_stats = match self.fetch_global_stats().await {
            Ok(stats) => stats,
            Err(e) => {
                tracing::warn!("Global stats fetch failed: {}", e);
                status = status.degrade();
                previous.cloned().unwrap_or_default()
            }
        };

        let asset_ids = match self.discovery.list_owned_assets(account).await {
            Ok(ids) => ids,
            Err(e) => {
                tracing::warn!("Miner discovery failed for {}: {}", account, e);
                status = status.degrade();
                Vec::new()
            }
        };

        // join_all keeps results in discovery order
        let asset_results =
            join_all(asset_ids.iter().map(|id| self.fetch_asset_stats(id))).await;
        let mut asset_stats = Vec::with_capacity(asset_results.len());
        for (id, result) in asset_ids.iter().zip(asset_results) {
            match result {
                Ok(stats) => {
                    log_asset_stats(&stats);
                    asset_stats.push(stats);
                }
                Err(e) => {
                    tracing::warn!("Skipping miner {}: {}", id, e);
                    status = status.degrade();
                }
            }
        }

        let balance_results = join_all(
            self.tokens
                .iter()
                .map(|token| self.fetch_token_balance(token, owner)),
        )
        .await;
        let mut token_balances = TokenBalances::new();
        for (token, result) in self.tokens.iter().zip(balance_results) {
            match result {
                Ok(balance) => token_balances.insert(token.name.clone(), balance),
                Err(e) => {
                    tracing::warn!("{} balance fetch failed: {}", token.name, e);
                    status = status.degrade();
                    token_balances.insert(token.name.clone(), BALANCE_SENTINEL);
                }
            }
        }

        tracing::info!(
            "Cycle for {} finished: status={:?} miners={} tokens={}",
            account,
            status,
            asset_stats.len(),
            token_balances.len()
        );

        Snapshot {
            account: Some(account.to_string()),
            global_stats,
            asset_stats,
            token_balances,
            status,
            fetched_at: Some(Utc::now()),
        }
    }

    async fn fetch_global_stats(&self) -> Result<GlobalStats> {
        let (miners, hashrate, power, rewards): GlobalStatsOutput = self
            .reader
            .call_typed(
                self.miner_contract,
                &self.abis.miner,
                METHOD_GLOBAL_STATS,
                vec![],
            )
            .await?;

        if miners > U256::from(u64::MAX) {
            return Err(AppError::Conversion(format!(
                "active miner count {} exceeds u64",
                miners
            )));
        }

        let stats = GlobalStats {
            active_miner_count: miners.as_u64(),
            total_hashrate: u256_to_string(hashrate),
            total_power_consumption: u256_to_string(power),
            total_rewards_paid: normalize_u256(rewards, self.decimals)?,
        };
        tracing::debug!("Fetched global stats: {:?}", stats);
        Ok(stats)
    }

    async fn fetch_asset_stats(&self, asset_id: &str) -> Result<AssetStats> {
        let id = U256::from_dec_str(asset_id)
            .map_err(|e| AppError::Conversion(format!("miner id {}: {}", asset_id, e)))?;

        let (owner_token, token_id, name, hashrate, unit, power, reward, last_block, image): MinerOutput =
            self.reader
                .call_typed(
                    self.miner_contract,
                    &self.abis.miner,
                    METHOD_MINER_STATS,
                    vec![Token::Uint(id)],
                )
                .await?;

        if token_id != id {
            tracing::warn!(
                "Miner record for {} reports token id {}; keeping requested id",
                asset_id,
                token_id
            );
        }

        Ok(AssetStats {
            asset_id: asset_id.to_string(),
            owner_token: format!("{:#x}", owner_token),
            name,
            hashrate: u256_to_string(hashrate),
            hashrate_unit: unit,
            power_consumption: u256_to_string(power),
            reward_per_block: u256_to_string(reward),
            last_update_block: u256_to_string(last_block),
            image_ref: image,
        })
    }

    async fn fetch_token_balance(&self, token: &TokenContract, owner: Address) -> Result<String> {
        let raw: U256 = self
            .reader
            .call_typed(
                token.address,
                &self.abis.erc20,
                METHOD_BALANCE_OF,
                vec![Token::Address(owner)],
            )
            .await?;
        normalize_u256(raw, self.decimals)
    }
}

// Internal helper that dumps every miner field at debug level.
fn log_asset_stats(stats: &AssetStats) {
    tracing::debug!(
        asset_id = %stats.asset_id,
        owner_token = %stats.owner_token,
        name = %stats.name,
        hashrate = %stats.hashrate,
        hashrate_unit = %stats.hashrate_unit,
        power_consumption = %stats.power_consumption,
        reward_per_block = %stats.reward_per_block,
        last_update_block = %stats.last_update_block,
        image_ref = %stats.image_ref,
        "User miner stats"
    );
}
