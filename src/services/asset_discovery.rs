use ethers::{
    abi::Token,
    types::{Address, U256},
};
use std::sync::Arc;

use crate::{
    chain::{ContractAbis, ContractReader},
    config::parse_address,
    constants::METHOD_OWNED_MINERS,
    error::{AppError, Result},
    utils::u256_to_string,
};

/// Asset Discovery - Lists the miner token ids owned by an account
pub struct AssetDiscovery {
    reader: ContractReader,
    abis: Arc<ContractAbis>,
    miner_contract: Address,
}

impl AssetDiscovery {
    pub fn new(reader: ContractReader, abis: Arc<ContractAbis>, miner_contract: Address) -> Self {
        Self {
            reader,
            abis,
            miner_contract,
        }
    }

    /// Returns the owned asset ids in the order the contract reports them.
    ///
    /// Every failure, including a malformed account, is reported as
    /// `AppError::Discovery`.
    pub async fn list_owned_assets(&self, account: &str) -> Result<Vec<String>> {
        if account.trim().is_empty() {
            return Err(AppError::Discovery("account is empty".to_string()));
        }
        let owner = parse_address(account).map_err(AppError::Discovery)?;

        let ids: Vec<U256> = self
            .reader
            .call_typed(
                self.miner_contract,
                &self.abis.miner,
                METHOD_OWNED_MINERS,
                vec![Token::Address(owner)],
            )
            .await
            .map_err(|e| AppError::Discovery(e.to_string()))?;

        Ok(ids.into_iter().map(u256_to_string).collect())
    }
}
