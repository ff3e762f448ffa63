use ethers::abi::{parse_abi, Abi};

use crate::{
    constants::{ERC20_SIGNATURES, MINER_CONTRACT_SIGNATURES},
    error::{AppError, Result},
};

/// Parsed ABI descriptors for the primary miner contract and the ERC-20 tokens.
#[derive(Debug, Clone)]
pub struct ContractAbis {
    pub miner: Abi,
    pub erc20: Abi,
}

impl ContractAbis {
    pub fn load() -> Result<Self> {
        let miner = parse_abi(MINER_CONTRACT_SIGNATURES)
            .map_err(|e| AppError::Internal(format!("Invalid miner contract ABI: {}", e)))?;
        let erc20 = parse_abi(ERC20_SIGNATURES)
            .map_err(|e| AppError::Internal(format!("Invalid ERC20 ABI: {}", e)))?;
        Ok(Self { miner, erc20 })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{
        METHOD_BALANCE_OF, METHOD_GLOBAL_STATS, METHOD_MINER_STATS, METHOD_OWNED_MINERS,
    };

    #[test]
    fn miner_abi_exposes_read_methods() {
        let abis = ContractAbis::load().expect("abi should parse");
        let global = abis.miner.function(METHOD_GLOBAL_STATS).unwrap();
        assert_eq!(global.outputs.len(), 4);
        let miner = abis.miner.function(METHOD_MINER_STATS).unwrap();
        assert_eq!(miner.inputs.len(), 1);
        assert_eq!(miner.outputs.len(), 9);
        assert!(abis.miner.function(METHOD_OWNED_MINERS).is_ok());
    }

    #[test]
    fn erc20_abi_has_balance_of() {
        let abis = ContractAbis::load().expect("abi should parse");
        let balance_of = abis.erc20.function(METHOD_BALANCE_OF).unwrap();
        assert_eq!(balance_of.inputs.len(), 1);
        assert_eq!(balance_of.outputs.len(), 1);
    }
}
