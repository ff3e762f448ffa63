// All service modules
pub mod asset_discovery;
pub mod polling_scheduler;
pub mod stats_aggregator;

#[cfg(test)]
pub(crate) mod testing;

// Re-export for convenience
pub use asset_discovery::AssetDiscovery;
pub use polling_scheduler::PollingScheduler;
pub use stats_aggregator::StatsAggregator;
