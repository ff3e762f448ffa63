pub mod abi;
pub mod contract_reader;
pub mod wallet;

pub use abi::ContractAbis;
pub use contract_reader::{ContractCaller, ContractReader, EthersContractCaller};
pub use wallet::{JsonRpcWallet, WalletProvider};
