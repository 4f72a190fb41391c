//! Managed-range resolution.

use crate::error::StoreError;
use crate::prefix::Prefix;
use crate::store::RouteStore;
use tracing::debug;

/// Answers whether a prefix lies in authoritatively managed address space.
pub struct ManagedRangeResolver<'a, S: RouteStore + ?Sized> {
    store: &'a S,
}

impl<'a, S: RouteStore + ?Sized> ManagedRangeResolver<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Any covering managed range makes the prefix managed.
    pub fn is_managed(&self, prefix: &Prefix) -> Result<bool, StoreError> {
        let ranges = self.store.query_managed_prefix(prefix)?;
        debug!("Managed ranges for {}: {:?}", prefix, ranges);
        Ok(!ranges.is_empty())
    }
}
