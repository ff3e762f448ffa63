// src/models/mod.rs
pub mod response;
pub mod snapshot;

pub use response::ApiResponse;
pub use snapshot::{AssetStats, GlobalStats, Snapshot, SnapshotStatus, TokenBalances};
