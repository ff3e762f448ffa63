/// Application constants

// Display names of the auxiliary token contracts, in configured order
pub const TOKEN_PROSPECT: &str = "Prospect";
pub const TOKEN_CLAIM: &str = "Claim";
pub const TOKEN_USDC: &str = "USDC";
pub const TOKEN_SKALE: &str = "Skale";

// Primary miner contract methods
pub const METHOD_GLOBAL_STATS: &str = "skale";
pub const METHOD_MINER_STATS: &str = "miners";
pub const METHOD_OWNED_MINERS: &str = "checkIfUserHasMiner";

// ERC-20 methods
pub const METHOD_BALANCE_OF: &str = "balanceOf";

pub const MINER_CONTRACT_SIGNATURES: &[&str] = &[
    "function skale() view returns (uint256 minersHashing, uint256 totalHashrate, uint256 totalPowerConsumption, uint256 totalRewardsPaid)",
    "function miners(uint256) view returns (address token, uint256 tokenId, string name, uint256 hashrate, string hashMeasured, uint256 powerConsumption, uint256 rewardPerBlock, uint256 lastUpdateBlock, string imageURI)",
    "function checkIfUserHasMiner(address) view returns (uint256[])",
];

pub const ERC20_SIGNATURES: &[&str] = &["function balanceOf(address) view returns (uint256)"];

// Unit conversion (wei -> ether)
pub const DEFAULT_VALUE_DECIMALS: u32 = 18;
// uint256 max has 78 digits
pub const MAX_VALUE_DECIMALS: u32 = 77;

// Sentinel stored for a token whose balance could not be read
pub const BALANCE_SENTINEL: &str = "0";

// Background service intervals
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 60;
pub const DEFAULT_RPC_CALL_TIMEOUT_SECS: u64 = 10;

// EIP-1193 "user rejected request"
pub const EIP1193_USER_REJECTED: i64 = 4001;

// API version
pub const API_VERSION: &str = "v1";
