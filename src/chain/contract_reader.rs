use async_trait::async_trait;
use ethers::{
    abi::{Abi, Detokenize, Token},
    providers::{Http, Middleware, Provider},
    types::{transaction::eip2718::TypedTransaction, Address, TransactionRequest},
};
use std::sync::Arc;
use std::time::Duration;

use crate::{
    config::Config,
    error::{AppError, Result},
};

/// Read-only contract invocation capability.
#[async_trait]
pub trait ContractCaller: Send + Sync {
    async fn invoke(
        &self,
        address: Address,
        abi: &Abi,
        method: &str,
        args: Vec<Token>,
    ) -> Result<Vec<Token>>;
}

/// `eth_call` against the latest block through an ethers HTTP provider.
pub struct EthersContractCaller {
    provider: Arc<Provider<Http>>,
}

impl EthersContractCaller {
    pub fn from_config(config: &Config) -> Result<Self> {
        let provider = Provider::<Http>::try_from(config.evm_rpc_url.as_str())
            .map_err(|e| AppError::Internal(format!("Invalid EVM RPC URL: {}", e)))?;
        Ok(Self {
            provider: Arc::new(provider),
        })
    }
}

#[async_trait]
impl ContractCaller for EthersContractCaller {
    async fn invoke(
        &self,
        address: Address,
        abi: &Abi,
        method: &str,
        args: Vec<Token>,
    ) -> Result<Vec<Token>> {
        let function = abi
            .function(method)
            .map_err(|e| AppError::Decode(format!("{}: {}", method, e)))?;
        let calldata = function
            .encode_input(&args)
            .map_err(|e| AppError::Decode(format!("{} arguments: {}", method, e)))?;

        let tx: TypedTransaction = TransactionRequest::new().to(address).data(calldata).into();
        let output = self
            .provider
            .call(&tx, None)
            .await
            .map_err(|e| AppError::rpc(format!("{} on {:#x}: {}", method, address, e)))?;

        function
            .decode_output(&output)
            .map_err(|e| AppError::Decode(format!("{} output: {}", method, e)))
    }
}

/// Stateless reader shared by the primary contract and every token contract.
///
/// Each call is bounded by `timeout`; no retry is attempted here.
#[derive(Clone)]
pub struct ContractReader {
    caller: Arc<dyn ContractCaller>,
    timeout: Duration,
}

impl ContractReader {
    pub fn new(caller: Arc<dyn ContractCaller>, timeout: Duration) -> Self {
        Self { caller, timeout }
    }

    pub async fn call(
        &self,
        address: Address,
        abi: &Abi,
        method: &str,
        args: Vec<Token>,
    ) -> Result<Vec<Token>> {
        match tokio::time::timeout(self.timeout, self.caller.invoke(address, abi, method, args))
            .await
        {
            Ok(result) => result,
            Err(_) => Err(AppError::rpc(format!(
                "{} call timed out after {}s",
                method,
                self.timeout.as_secs()
            ))),
        }
    }

    /// Calls `method` and decodes its outputs into the expected Rust shape.
    pub async fn call_typed<T: Detokenize>(
        &self,
        address: Address,
        abi: &Abi,
        method: &str,
        args: Vec<Token>,
    ) -> Result<T> {
        let tokens = self.call(address, abi, method, args).await?;
        T::from_tokens(tokens).map_err(|e| AppError::Decode(format!("{} output: {}", method, e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::ContractAbis;
    use ethers::types::U256;

    struct FixedCaller {
        delay: Duration,
        output: Vec<Token>,
    }

    #[async_trait]
    impl ContractCaller for FixedCaller {
        async fn invoke(
            &self,
            _address: Address,
            _abi: &Abi,
            _method: &str,
            _args: Vec<Token>,
        ) -> Result<Vec<Token>> {
            tokio::time::sleep(self.delay).await;
            Ok(self.output.clone())
        }
    }

    fn reader(delay: Duration, output: Vec<Token>) -> ContractReader {
        ContractReader::new(Arc::new(FixedCaller { delay, output }), Duration::from_secs(5))
    }

    #[tokio::test(start_paused = true)]
    async fn call_times_out_as_rpc_error() {
        let abis = ContractAbis::load().unwrap();
        let reader = reader(Duration::from_secs(30), vec![]);
        let result = reader
            .call(Address::zero(), &abis.erc20, "balanceOf", vec![])
            .await;
        match result {
            Err(AppError::Rpc { reason }) => assert!(reason.contains("timed out")),
            other => panic!("expected rpc timeout, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn call_typed_decodes_single_uint() {
        let abis = ContractAbis::load().unwrap();
        let reader = reader(Duration::ZERO, vec![Token::Uint(U256::from(42u64))]);
        let value: U256 = reader
            .call_typed(Address::zero(), &abis.erc20, "balanceOf", vec![])
            .await
            .expect("decode should succeed");
        assert_eq!(value, U256::from(42u64));
    }

    #[tokio::test]
    async fn call_typed_reports_shape_mismatch_as_decode_error() {
        let abis = ContractAbis::load().unwrap();
        let reader = reader(Duration::ZERO, vec![Token::String("oops".into())]);
        let result: Result<U256> = reader
            .call_typed(Address::zero(), &abis.erc20, "balanceOf", vec![])
            .await;
        assert!(matches!(result, Err(AppError::Decode(_))));
    }
}
