//! Aggregation of parsed log lines into per-label best records.

pub mod aggregator;

pub use aggregator::*;
