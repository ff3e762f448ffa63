use chrono::{DateTime, Utc};
use serde::{
    de::{MapAccess, Visitor},
    ser::SerializeMap,
    Deserialize, Deserializer, Serialize, Serializer,
};
use std::fmt;

/// System-wide state read from the primary contract in a single call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalStats {
    pub active_miner_count: u64,
    pub total_hashrate: String,
    pub total_power_consumption: String,
    pub total_rewards_paid: String,
}

impl Default for GlobalStats {
    fn default() -> Self {
        Self {
            active_miner_count: 0,
            total_hashrate: "0".to_string(),
            total_power_consumption: "0".to_string(),
            total_rewards_paid: "0".to_string(),
        }
    }
}

/// Stats of one miner owned by the connected account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetStats {
    pub asset_id: String,
    pub owner_token: String,
    pub name: String,
    pub hashrate: String,
    pub hashrate_unit: String,
    pub power_consumption: String,
    pub reward_per_block: String,
    pub last_update_block: String,
    pub image_ref: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenBalance {
    pub name: String,
    pub balance: String,
}

/// Balances keyed by token display name, kept in configured token order.
///
/// Serializes as a JSON object (`{"Prospect": "1.5", ...}`) whose keys follow
/// insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenBalances(Vec<TokenBalance>);

impl TokenBalances {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, balance: impl Into<String>) {
        let name = name.into();
        let balance = balance.into();
        match self.0.iter_mut().find(|entry| entry.name == name) {
            Some(entry) => entry.balance = balance,
            None => self.0.push(TokenBalance { name, balance }),
        }
    }

    #[cfg(test)]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|entry| entry.name == name)
            .map(|entry| entry.balance.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &TokenBalance> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for TokenBalances {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for entry in self.iter() {
            map.serialize_entry(&entry.name, &entry.balance)?;
        }
        map.end()
    }
}

struct TokenBalancesVisitor;

impl<'de> Visitor<'de> for TokenBalancesVisitor {
    type Value = TokenBalances;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a map of token name to balance")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut balances = TokenBalances::new();
        while let Some((name, balance)) = access.next_entry::<String, String>()? {
            balances.insert(name, balance);
        }
        Ok(balances)
    }
}

impl<'de> Deserialize<'de> for TokenBalances {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(TokenBalancesVisitor)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SnapshotStatus {
    Ok,
    Partial,
    Unavailable,
}

impl SnapshotStatus {
    /// Folds a sub-fetch outcome into the cycle status.
    pub fn degrade(self) -> Self {
        match self {
            SnapshotStatus::Ok => SnapshotStatus::Partial,
            other => other,
        }
    }
}

/// One complete, immutable view of on-chain state for a polling cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub account: Option<String>,
    pub global_stats: GlobalStats,
    pub asset_stats: Vec<AssetStats>,
    pub token_balances: TokenBalances,
    pub status: SnapshotStatus,
    pub fetched_at: Option<DateTime<Utc>>,
}

impl Snapshot {
    /// Snapshot published while no account is connected.
    pub fn unavailable() -> Self {
        Self {
            account: None,
            global_stats: GlobalStats::default(),
            asset_stats: Vec::new(),
            token_balances: TokenBalances::new(),
            status: SnapshotStatus::Unavailable,
            fetched_at: None,
        }
    }
}

impl Default for Snapshot {
    fn default() -> Self {
        Self::unavailable()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unavailable_snapshot_is_empty() {
        let snapshot = Snapshot::unavailable();
        assert_eq!(snapshot.status, SnapshotStatus::Unavailable);
        assert!(snapshot.asset_stats.is_empty());
        assert!(snapshot.token_balances.is_empty());
        assert_eq!(snapshot.global_stats.total_rewards_paid, "0");
    }

    #[test]
    fn degrade_only_downgrades_ok() {
        assert_eq!(SnapshotStatus::Ok.degrade(), SnapshotStatus::Partial);
        assert_eq!(SnapshotStatus::Partial.degrade(), SnapshotStatus::Partial);
        assert_eq!(
            SnapshotStatus::Unavailable.degrade(),
            SnapshotStatus::Unavailable
        );
    }

    #[test]
    fn token_balances_keep_insertion_order() {
        let mut balances = TokenBalances::new();
        balances.insert("Prospect", "1");
        balances.insert("Claim", "2");
        balances.insert("Prospect", "3");
        let names: Vec<&str> = balances.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, vec!["Prospect", "Claim"]);
        assert_eq!(balances.get("Prospect"), Some("3"));
    }

    #[test]
    fn snapshot_serializes_camel_case_and_lowercase_status() {
        let json = serde_json::to_value(Snapshot::unavailable()).unwrap();
        assert_eq!(json["status"], "unavailable");
        assert_eq!(json["globalStats"]["activeMinerCount"], 0);
        assert!(json["tokenBalances"].as_object().unwrap().is_empty());
    }

    #[test]
    fn token_balances_serialize_as_name_keyed_object() {
        let mut balances = TokenBalances::new();
        balances.insert("Prospect", "1.5");
        balances.insert("Claim", "0");
        balances.insert("USDC", "2");

        let json = serde_json::to_string(&balances).unwrap();
        assert_eq!(json, r#"{"Prospect":"1.5","Claim":"0","USDC":"2"}"#);

        let parsed: TokenBalances = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, balances);
    }
}
