//! Analysis modules.
//!
//! Aggregation of store rows, managed-range resolution and the prefix
//! consistency classifier.

pub mod aggregator;
pub mod classifier;
pub mod managed;

pub use aggregator::*;
pub use classifier::classify;
pub use managed::ManagedRangeResolver;
