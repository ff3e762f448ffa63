// Scripted collaborators for exercising the aggregation engine without a node.

use async_trait::async_trait;
use ethers::{
    abi::{Abi, Token},
    types::{Address, U256},
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::{
    chain::{ContractCaller, WalletProvider},
    config::{parse_address, Config},
    constants::{METHOD_BALANCE_OF, METHOD_GLOBAL_STATS, METHOD_MINER_STATS, METHOD_OWNED_MINERS},
    error::{AppError, Result},
};

pub(crate) const ACCOUNT_A: &str = "0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";
pub(crate) const ACCOUNT_B: &str = "0xbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb";

// Internal helper that renders the first call argument into a lookup key.
fn arg_key(args: &[Token]) -> String {
    match args.first() {
        Some(Token::Address(address)) => format!("{:#x}", address),
        Some(Token::Uint(value)) => value.to_string(),
        Some(other) => format!("{:?}", other),
        None => String::new(),
    }
}

fn key(address: Address, method: &str, arg: &str) -> String {
    format!("{:#x}/{}/{}", address, method, arg)
}

fn uint(raw: &str) -> Token {
    Token::Uint(U256::from_dec_str(raw).expect("scripted value must be decimal"))
}

/// In-memory `ContractCaller` answering from a table of scripted responses.
pub(crate) struct ScriptedCaller {
    miner_contract: Address,
    tokens: Vec<(String, Address)>,
    responses: Mutex<HashMap<String, Result<Vec<Token>>>>,
    calls: Mutex<HashMap<String, usize>>,
}

impl ScriptedCaller {
    pub fn new(config: &Config) -> Self {
        Self {
            miner_contract: parse_address(&config.miner_contract_address).unwrap(),
            tokens: config
                .token_contracts
                .iter()
                .map(|t| (t.name.clone(), parse_address(&t.address).unwrap()))
                .collect(),
            responses: Mutex::new(HashMap::new()),
            calls: Mutex::new(HashMap::new()),
        }
    }

    fn script(&self, address: Address, method: &str, arg: &str, response: Result<Vec<Token>>) {
        self.responses
            .lock()
            .unwrap()
            .insert(key(address, method, arg), response);
    }

    fn token_address(&self, name: &str) -> Address {
        self.tokens
            .iter()
            .find(|(token, _)| token == name)
            .map(|(_, address)| *address)
            .expect("unknown scripted token")
    }

    pub fn with_global_stats(
        self,
        miners: u64,
        hashrate: u64,
        power: u64,
        rewards_raw: &str,
    ) -> Self {
        let tokens = vec![
            Token::Uint(U256::from(miners)),
            Token::Uint(U256::from(hashrate)),
            Token::Uint(U256::from(power)),
            uint(rewards_raw),
        ];
        self.script(self.miner_contract, METHOD_GLOBAL_STATS, "", Ok(tokens));
        self
    }

    pub fn fail_global_stats(self) -> Self {
        self.set_global_stats_failing();
        self
    }

    /// Makes every later global stats read fail, for callers already shared.
    pub fn set_global_stats_failing(&self) {
        self.script(
            self.miner_contract,
            METHOD_GLOBAL_STATS,
            "",
            Err(AppError::rpc("node unavailable")),
        );
    }

    pub fn with_owned(self, account: &str, ids: &[&str]) -> Self {
        let ids = ids.iter().map(|id| uint(id)).collect();
        self.script(
            self.miner_contract,
            METHOD_OWNED_MINERS,
            account,
            Ok(vec![Token::Array(ids)]),
        );
        self
    }

    pub fn fail_owned(self, account: &str) -> Self {
        self.script(
            self.miner_contract,
            METHOD_OWNED_MINERS,
            account,
            Err(AppError::rpc("execution reverted")),
        );
        self
    }

    pub fn with_miner(self, id: &str, name: &str) -> Self {
        let tokens = vec![
            Token::Address(Address::repeat_byte(0x11)),
            uint(id),
            Token::String(name.to_string()),
            uint("1500"),
            Token::String("VH/s".to_string()),
            uint("350"),
            uint("2500000000000000000"),
            uint("987654321"),
            Token::String(format!("ipfs://miner/{}", id)),
        ];
        self.script(self.miner_contract, METHOD_MINER_STATS, id, Ok(tokens));
        self
    }

    pub fn fail_miner(self, id: &str) -> Self {
        self.script(
            self.miner_contract,
            METHOD_MINER_STATS,
            id,
            Err(AppError::rpc("timeout")),
        );
        self
    }

    pub fn malformed_miner(self, id: &str) -> Self {
        self.script(
            self.miner_contract,
            METHOD_MINER_STATS,
            id,
            Ok(vec![Token::Bool(true)]),
        );
        self
    }

    pub fn with_balance(self, token: &str, account: &str, raw: &str) -> Self {
        let address = self.token_address(token);
        self.script(address, METHOD_BALANCE_OF, account, Ok(vec![uint(raw)]));
        self
    }

    pub fn fail_balance(self, token: &str, account: &str) -> Self {
        let address = self.token_address(token);
        self.script(
            address,
            METHOD_BALANCE_OF,
            account,
            Err(AppError::rpc("connection reset")),
        );
        self
    }

    /// Scripts every configured token balance for `account` to `raw`.
    pub fn with_all_balances(self, account: &str, raw: &str) -> Self {
        let names: Vec<String> = self.tokens.iter().map(|(name, _)| name.clone()).collect();
        names
            .iter()
            .fold(self, |caller, name| caller.with_balance(name, account, raw))
    }

    pub fn calls(&self, method: &str) -> usize {
        self.calls.lock().unwrap().get(method).copied().unwrap_or(0)
    }
}

#[async_trait]
impl ContractCaller for ScriptedCaller {
    async fn invoke(
        &self,
        address: Address,
        abi: &Abi,
        method: &str,
        args: Vec<Token>,
    ) -> Result<Vec<Token>> {
        abi.function(method)
            .map_err(|e| AppError::Decode(format!("{}: {}", method, e)))?;
        *self
            .calls
            .lock()
            .unwrap()
            .entry(method.to_string())
            .or_insert(0) += 1;

        self.responses
            .lock()
            .unwrap()
            .get(&key(address, method, &arg_key(&args)))
            .cloned()
            .unwrap_or_else(|| Err(AppError::rpc(format!("no scripted response for {}", method))))
    }
}

/// Delays every call by `delay` before handing it to the scripted caller.
pub(crate) struct SlowCaller {
    pub inner: Arc<ScriptedCaller>,
    pub delay: Duration,
}

#[async_trait]
impl ContractCaller for SlowCaller {
    async fn invoke(
        &self,
        address: Address,
        abi: &Abi,
        method: &str,
        args: Vec<Token>,
    ) -> Result<Vec<Token>> {
        tokio::time::sleep(self.delay).await;
        self.inner.invoke(address, abi, method, args).await
    }
}

/// Wallet that always answers with a fixed outcome.
pub(crate) struct ScriptedWallet {
    pub outcome: Result<Vec<String>>,
}

#[async_trait]
impl WalletProvider for ScriptedWallet {
    async fn request_accounts(&self) -> Result<Vec<String>> {
        self.outcome.clone()
    }
}
